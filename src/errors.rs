use colored::*;
use std::fmt;

#[derive(Debug)]
pub enum LinkerError {
    // Configuration errors
    ConfigMissing(String),
    ConfigInvalid(String),

    // Event errors
    EventUnreadable(String),

    // GitHub errors
    GitHubAuthFailed(u16),
    GitHubApiError(u16, String),

    // Linear errors
    LinearApiError(String),
    TicketNotFound(String),
    AttachmentFailed(String),

    // Network errors
    NetworkError(String),
}

impl fmt::Display for LinkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Configuration errors
            LinkerError::ConfigMissing(key) => {
                write!(f, "{}\n", format!("Missing configuration: {}", key).red().bold())?;
                write!(f, "   {}\n\n", "A required setting was not provided".dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Export it in the workflow step's env block\n")?;
                write!(f, "   2. Or set it in the file passed with {}", "--config".green())
            }
            LinkerError::ConfigInvalid(msg) => {
                write!(f, "{}\n", "Invalid configuration".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   Inspect the effective settings: {}", "preview-linker config show".green())
            }

            // Event errors
            LinkerError::EventUnreadable(msg) => {
                write!(f, "{}\n", "Could not read the triggering event".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Run inside a GitHub Actions job (GITHUB_EVENT_PATH is set there)\n")?;
                write!(f, "   2. Or pass {} and {}", "--event-name".green(), "--event-path".green())
            }

            // GitHub errors
            LinkerError::GitHubAuthFailed(status) => {
                write!(f, "{}\n", format!("GitHub authentication failed ({})", status).red().bold())?;
                write!(f, "   {}\n\n", "The GITHUB_TOKEN is invalid or lacks permissions".dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Grant the job 'pull-requests: read' and 'deployments: read'\n")?;
                write!(f, "   2. Pass the token: {}", "GITHUB_TOKEN: ${{ secrets.GITHUB_TOKEN }}".green())
            }
            LinkerError::GitHubApiError(status, msg) => {
                write!(f, "{}\n", format!("GitHub API error ({})", status).red().bold())?;
                write!(f, "   {}", msg.dimmed())
            }

            // Linear errors
            LinkerError::LinearApiError(msg) => {
                write!(f, "{}\n", "Linear API error".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   Check that LINEAR_API_KEY is a valid personal or app key")
            }
            LinkerError::TicketNotFound(identifier) => {
                write!(f, "{}\n", format!("Ticket '{}' not found", identifier).red().bold())?;
                write!(f, "   {}\n\n", "The ticket doesn't exist or the API key can't access it".dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check the link posted by linear[bot] on the pull request\n")?;
                write!(f, "   2. Verify the API key belongs to the ticket's workspace")
            }
            LinkerError::AttachmentFailed(msg) => {
                write!(f, "{}\n", "Failed to create attachment".red().bold())?;
                write!(f, "   {}", msg.dimmed())
            }

            // Network errors
            LinkerError::NetworkError(msg) => {
                write!(f, "{}\n", "Network error".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Verify the runner can reach the API endpoints\n")?;
                write!(f, "   2. Re-run the job")
            }
        }
    }
}

impl std::error::Error for LinkerError {}

impl From<reqwest::Error> for LinkerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            LinkerError::NetworkError(err.to_string())
        } else if let Some(status) = err.status() {
            if status == 401 || status == 403 {
                LinkerError::GitHubAuthFailed(status.as_u16())
            } else {
                LinkerError::GitHubApiError(status.as_u16(), err.to_string())
            }
        } else {
            LinkerError::NetworkError(err.to_string())
        }
    }
}
