use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod errors;
mod linker;
mod models;

use crate::api::github::GitHubClient;
use crate::api::linear::LinearClient;
use crate::config::settings::Settings;
use crate::errors::LinkerError;
use crate::linker::identifier::BotIdentity;
use crate::linker::{Linker, Outcome};
use crate::models::event::Event;

#[derive(Parser)]
#[command(name = "preview-linker")]
#[command(version)]
#[command(about = "Attach a pull request's preview deployment to its Linear ticket", long_about = None)]
struct Cli {
    /// Log request details
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with settings; environment variables take precedence
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle the event that triggered this workflow run (default)
    Run {
        /// (e.g., issue_comment, deployment_status)
        #[arg(long, env = "GITHUB_EVENT_NAME")]
        event_name: Option<String>,

        /// Path to the webhook payload JSON
        #[arg(long, env = "GITHUB_EVENT_PATH")]
        event_path: Option<PathBuf>,
    },

    /// Show the ticket and preview a pull request would be linked with
    Inspect {
        /// Pull request number
        pr_number: u64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display the effective configuration (with masked secrets)
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_file = cli.config.as_deref();
    let command = cli.command.unwrap_or(Commands::Run {
        event_name: std::env::var("GITHUB_EVENT_NAME").ok(),
        event_path: std::env::var_os("GITHUB_EVENT_PATH").map(PathBuf::from),
    });

    let result = match command {
        Commands::Run {
            event_name,
            event_path,
        } => handle_run(config_file, event_name, event_path).await,

        Commands::Inspect { pr_number } => handle_inspect(config_file, pr_number).await,

        Commands::Config {
            action: ConfigAction::Show,
        } => handle_config_show(config_file),
    };

    if let Err(e) = result {
        match e.downcast_ref::<LinkerError>() {
            Some(linker_error) => eprintln!("\n{}", linker_error),
            None => eprintln!("\n{} {:#}", "Error:".red().bold(), e),
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn build_linker(settings: &Settings) -> Linker {
    let github = GitHubClient::new(
        settings.github.api_url.clone(),
        settings.github.owner.clone(),
        settings.github.repo.clone(),
        settings.github.token.clone(),
    );
    let linear = LinearClient::new(
        settings.linear.api_url.clone(),
        settings.linear.api_key.clone(),
    );

    Linker::new(
        Arc::new(github),
        Arc::new(linear),
        BotIdentity::new(settings.preferences.bot_login.clone()),
        settings.preferences.title_template.clone(),
    )
}

fn load_event(name: Option<String>, path: Option<PathBuf>) -> anyhow::Result<Event> {
    let name = name.ok_or_else(|| {
        LinkerError::EventUnreadable("GITHUB_EVENT_NAME is not set".to_string())
    })?;
    let path = path.ok_or_else(|| {
        LinkerError::EventUnreadable("GITHUB_EVENT_PATH is not set".to_string())
    })?;

    let payload = std::fs::read_to_string(&path).map_err(|e| {
        LinkerError::EventUnreadable(format!("{}: {}", path.display(), e))
    })?;

    let event = Event::from_json(&name, &payload).map_err(|e| {
        LinkerError::EventUnreadable(format!("invalid {} payload: {}", name, e))
    })?;
    Ok(event)
}

async fn handle_run(
    config_file: Option<&Path>,
    event_name: Option<String>,
    event_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let settings = Settings::load(config_file)?;
    let event = load_event(event_name, event_path)?;
    tracing::debug!(?event, "loaded event");

    let linker = build_linker(&settings);

    match linker.run(&event).await? {
        Outcome::Linked {
            identifier,
            attachment,
        } => {
            println!("{}", "Preview linked!".green().bold());
            println!("  {} {}", "Ticket:".bold(), identifier.to_string().bright_white());
            println!("  {} {}", "Title:".bold(), attachment.title);
            println!("  {} {}", "URL:".bold(), attachment.url.bright_cyan());
        }
        Outcome::Skipped(reason) => {
            println!("{}", format!("Skipping: {}", reason.describe()).yellow());
        }
    }

    Ok(())
}

async fn handle_inspect(config_file: Option<&Path>, pr_number: u64) -> anyhow::Result<()> {
    let settings = Settings::load(config_file)?;
    let linker = build_linker(&settings);

    println!(
        "{}",
        format!("Inspecting PR #{}...", pr_number).cyan().bold()
    );
    println!();

    let inspection = linker.inspect(pr_number).await?;

    match &inspection.identifier {
        Some(identifier) => println!("  {} {}", "Ticket:".bold(), identifier.to_string().bright_white()),
        None => println!("  {} {}", "Ticket:".bold(), "not found".yellow()),
    }
    match &inspection.preview {
        Some(preview) => {
            println!("  {} {}", "Preview:".bold(), preview.url.bright_cyan());
            if let Some(avatar) = &preview.avatar_url {
                println!("  {} {}", "Icon:".bold(), avatar.dimmed());
            }
        }
        None => println!("  {} {}", "Preview:".bold(), "not found".yellow()),
    }
    println!("  {} {}", "Title:".bold(), inspection.title);

    Ok(())
}

fn handle_config_show(config_file: Option<&Path>) -> anyhow::Result<()> {
    let settings = Settings::load(config_file)?;

    println!("{}", "Current configuration".cyan().bold());
    println!();
    println!("{}", settings);

    Ok(())
}
