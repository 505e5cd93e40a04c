use crate::errors::LinkerError;
use anyhow::{Context, Result};
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

pub const DEFAULT_TITLE_TEMPLATE: &str = "Preview of PR #{PR_NUMBER}";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_LINEAR_API_URL: &str = "https://api.linear.app/graphql";
pub const DEFAULT_BOT_LOGIN: &str = "linear[bot]";

/// Environment variables read by the action, keyed by setting name.
const ENV_KEYS: &[(&str, &str)] = &[
    ("github_token", "GITHUB_TOKEN"),
    ("linear_api_key", "LINEAR_API_KEY"),
    ("repository", "GITHUB_REPOSITORY"),
    ("title", "INPUT_TITLE"),
    ("github_api_url", "GITHUB_API_URL"),
    ("linear_api_url", "LINEAR_API_URL"),
    ("bot_login", "INPUT_BOT_LOGIN"),
];

#[derive(Debug, Clone)]
pub struct Settings {
    pub github: GitHubConfig,
    pub linear: LinearConfig,
    pub preferences: Preferences,
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    pub token: String,
    pub owner: String,
    pub repo: String,
}

#[derive(Debug, Clone)]
pub struct LinearConfig {
    pub api_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct Preferences {
    pub title_template: String,
    pub bot_login: String,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    github_token: Option<String>,
    linear_api_key: Option<String>,
    repository: Option<String>,
    title: Option<String>,
    github_api_url: String,
    linear_api_url: String,
    bot_login: String,
}

impl Settings {
    /// Loads settings from the process environment, layered over an optional
    /// TOML file.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::from_sources(config_file, |key| std::env::var(key).ok())
    }

    pub fn from_sources<F>(config_file: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder()
            .set_default("github_api_url", DEFAULT_GITHUB_API_URL)?
            .set_default("linear_api_url", DEFAULT_LINEAR_API_URL)?
            .set_default("bot_login", DEFAULT_BOT_LOGIN)?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        // Actions passes unset inputs as empty strings
        for &(key, var) in ENV_KEYS {
            let value = env(var).filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(key, value)?;
        }

        let raw: RawSettings = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        Self::validate(raw)
    }

    fn validate(raw: RawSettings) -> Result<Self> {
        let token = raw
            .github_token
            .ok_or_else(|| LinkerError::ConfigMissing("GITHUB_TOKEN".to_string()))?;
        let api_key = raw
            .linear_api_key
            .ok_or_else(|| LinkerError::ConfigMissing("LINEAR_API_KEY".to_string()))?;
        let repository = raw
            .repository
            .ok_or_else(|| LinkerError::ConfigMissing("GITHUB_REPOSITORY".to_string()))?;

        let (owner, repo) = split_repository(&repository)?;

        Ok(Settings {
            github: GitHubConfig {
                api_url: raw.github_api_url.trim_end_matches('/').to_string(),
                token,
                owner,
                repo,
            },
            linear: LinearConfig {
                api_url: raw.linear_api_url,
                api_key,
            },
            preferences: Preferences {
                title_template: raw
                    .title
                    .unwrap_or_else(|| DEFAULT_TITLE_TEMPLATE.to_string()),
                bot_login: raw.bot_login,
            },
        })
    }
}

fn split_repository(repository: &str) -> Result<(String, String)> {
    match repository.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(LinkerError::ConfigInvalid(format!(
            "GITHUB_REPOSITORY must look like 'owner/repo', got '{}'",
            repository
        ))
        .into()),
    }
}

fn mask(secret: &str) -> String {
    if secret.chars().count() <= 4 {
        return "****".to_string();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{}****", visible)
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[github]")?;
        writeln!(f, "  api_url    = {}", self.github.api_url)?;
        writeln!(f, "  repository = {}/{}", self.github.owner, self.github.repo)?;
        writeln!(f, "  token      = {}", mask(&self.github.token))?;
        writeln!(f, "[linear]")?;
        writeln!(f, "  api_url    = {}", self.linear.api_url)?;
        writeln!(f, "  api_key    = {}", mask(&self.linear.api_key))?;
        writeln!(f, "[preferences]")?;
        writeln!(f, "  title      = {}", self.preferences.title_template)?;
        write!(f, "  bot_login  = {}", self.preferences.bot_login)
    }
}
