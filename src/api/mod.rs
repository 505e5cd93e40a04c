pub mod github;
pub mod linear;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::comment::Comment;
use crate::models::deployment::{Deployment, DeploymentStatus};
use crate::models::pull_request::PullRequest;
use crate::models::ticket::{CreatedAttachment, NewAttachment, TrackerIssue};

/// Read access to the repository hosting the pull requests.
#[async_trait]
pub trait SourceControl: Send + Sync {
    async fn list_comments(&self, issue_number: u64) -> Result<Vec<Comment>>;
    async fn get_pull_request(&self, number: u64) -> Result<PullRequest>;
    async fn list_deployments(&self, git_ref: &str) -> Result<Vec<Deployment>>;
    /// Newest first, as the provider returns them.
    async fn list_deployment_statuses(&self, deployment_id: u64) -> Result<Vec<DeploymentStatus>>;
}

#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fails with `LinkerError::TicketNotFound` when no issue has this key.
    async fn find_issue(&self, identifier: &str) -> Result<TrackerIssue>;
    async fn create_attachment(&self, attachment: &NewAttachment) -> Result<CreatedAttachment>;
}
