use serde::Deserialize;

/// The webhook event that triggered the run, as delivered by GitHub Actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    IssueComment(IssueCommentPayload),
    DeploymentStatus(DeploymentStatusPayload),
    Other(String),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IssueCommentPayload {
    pub issue: EventIssue,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EventIssue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    /// Present only when the issue is a pull request.
    #[serde(default)]
    pub pull_request: Option<PullRequestLink>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PullRequestLink {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DeploymentStatusPayload {
    pub deployment: EventDeployment,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EventDeployment {
    #[serde(default)]
    pub pull_requests: Vec<PullRequestRef>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PullRequestRef {
    pub number: u64,
}

/// The pull request a run works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub issue_number: u64,
    /// Known up front for comment events; deployment events leave it to be
    /// read from the pull request.
    pub title: Option<String>,
}

impl Event {
    pub fn from_json(name: &str, payload: &str) -> serde_json::Result<Self> {
        match name {
            "issue_comment" => Ok(Event::IssueComment(serde_json::from_str(payload)?)),
            "deployment_status" => Ok(Event::DeploymentStatus(serde_json::from_str(payload)?)),
            other => Ok(Event::Other(other.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Event::IssueComment(_) => "issue_comment",
            Event::DeploymentStatus(_) => "deployment_status",
            Event::Other(name) => name,
        }
    }
}
