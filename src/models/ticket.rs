use serde::{Deserialize, Serialize};
use std::fmt;

/// A `TEAM-NUMBER` key such as `PRE-7`.
///
/// Only produced by parsing a tracker link; see `linker::identifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketIdentifier(String);

impl TicketIdentifier {
    pub(crate) fn new(raw: &str) -> Self {
        Self(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TrackerIssue {
    pub id: String,
    pub identifier: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewAttachment {
    pub issue_id: String,
    pub title: String,
    pub subtitle: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CreatedAttachment {
    pub id: String,
    pub url: String,
    pub title: String,
}
