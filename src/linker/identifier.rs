//! Finds the Linear ticket a pull request is linked to.
//!
//! The Linear GitHub integration posts a comment on every linked pull request
//! whose body carries a link of the form
//!
//! ```text
//! https://linear.app/<team>/issue/<identifier>/<slug>[/...]
//! ```
//!
//! The `<identifier>` segment (`PRE-7`) is what the tracker looks issues up by.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, error};

use crate::models::comment::Comment;
use crate::models::ticket::TicketIdentifier;

pub const LINK_PREFIX: &str = "https://linear.app/";

/// Slug of the Linear GitHub App, for comments performed via the app.
pub const LINEAR_APP_SLUG: &str = "linear";

lazy_static! {
    static ref LINK_RE: Regex = Regex::new(r#"https://linear\.app/[^"]+"#).unwrap();
}

/// Who counts as the tracker's bot on the pull request.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub login: String,
    pub app_slug: String,
}

impl BotIdentity {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            app_slug: LINEAR_APP_SLUG.to_string(),
        }
    }

    pub fn matches(&self, comment: &Comment) -> bool {
        comment.author == self.login || comment.app.as_deref() == Some(self.app_slug.as_str())
    }
}

/// Returns the identifier linked by the first bot comment, if any.
///
/// Later bot comments are never inspected, even when the first one carries
/// no link.
pub fn extract_identifier(comments: &[Comment], bot: &BotIdentity) -> Option<TicketIdentifier> {
    let Some(comment) = comments.iter().find(|c| bot.matches(c)) else {
        error!(bot = %bot.login, "No linear identifier found: no bot comment on the pull request");
        return None;
    };

    let Some(link) = LINK_RE.find(&comment.body) else {
        error!("No link found in the bot comment");
        return None;
    };

    debug!(link = link.as_str(), "found tracker link");
    let identifier = parse_ticket_link(link.as_str());
    if identifier.is_none() {
        error!(link = link.as_str(), "Tracker link has no identifier segment");
    }
    identifier
}

/// Parses `https://linear.app/<team>/issue/<identifier>/<slug>` into its
/// identifier. Anything after the slug is ignored.
pub fn parse_ticket_link(link: &str) -> Option<TicketIdentifier> {
    let path = link.strip_prefix(LINK_PREFIX)?;
    let identifier = path.split('/').nth(2)?;

    if identifier.is_empty() {
        return None;
    }
    Some(TicketIdentifier::new(identifier))
}
