//! In-memory GitHub and Linear doubles that record every call.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::api::{IssueTracker, SourceControl};
use crate::errors::LinkerError;
use crate::models::comment::Comment;
use crate::models::deployment::{Deployment, DeploymentStatus};
use crate::models::pull_request::PullRequest;
use crate::models::ticket::{CreatedAttachment, NewAttachment, TrackerIssue};

#[derive(Default)]
pub struct FakeGitHub {
    comments: Vec<Comment>,
    pull_request: Option<PullRequest>,
    deployments: Vec<Deployment>,
    statuses: HashMap<u64, Vec<DeploymentStatus>>,
    calls: Mutex<Vec<String>>,
}

impl FakeGitHub {
    pub fn with_comment(mut self, comment: Comment) -> Self {
        self.comments.push(comment);
        self
    }

    pub fn with_pull_request(mut self, pull_request: PullRequest) -> Self {
        self.pull_request = Some(pull_request);
        self
    }

    pub fn with_deployment(mut self, git_ref: &str, id: u64) -> Self {
        self.deployments.push(Deployment {
            id,
            git_ref: git_ref.to_string(),
        });
        self
    }

    pub fn with_statuses(mut self, id: u64, statuses: Vec<DeploymentStatus>) -> Self {
        self.statuses.insert(id, statuses);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SourceControl for FakeGitHub {
    async fn list_comments(&self, issue_number: u64) -> Result<Vec<Comment>> {
        self.record(format!("comments {}", issue_number));
        Ok(self.comments.clone())
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        self.record(format!("pull {}", number));
        self.pull_request
            .clone()
            .ok_or_else(|| LinkerError::GitHubApiError(404, "Not Found".to_string()).into())
    }

    async fn list_deployments(&self, git_ref: &str) -> Result<Vec<Deployment>> {
        self.record(format!("deployments {}", git_ref));
        Ok(self
            .deployments
            .iter()
            .filter(|d| d.git_ref == git_ref)
            .cloned()
            .collect())
    }

    async fn list_deployment_statuses(&self, deployment_id: u64) -> Result<Vec<DeploymentStatus>> {
        self.record(format!("statuses {}", deployment_id));
        Ok(self.statuses.get(&deployment_id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeLinear {
    issues: HashMap<String, String>,
    fail_creation: bool,
    lookups: Mutex<Vec<String>>,
    created: Mutex<Vec<NewAttachment>>,
}

impl FakeLinear {
    pub fn with_issue(identifier: &str, id: &str) -> Self {
        let mut fake = Self::default();
        fake.issues.insert(identifier.to_string(), id.to_string());
        fake
    }

    pub fn failing_creation(mut self) -> Self {
        self.fail_creation = true;
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<NewAttachment> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueTracker for FakeLinear {
    async fn find_issue(&self, identifier: &str) -> Result<TrackerIssue> {
        self.lookups.lock().unwrap().push(identifier.to_string());
        let id = self
            .issues
            .get(identifier)
            .ok_or_else(|| LinkerError::TicketNotFound(identifier.to_string()))?;
        Ok(TrackerIssue {
            id: id.clone(),
            identifier: identifier.to_string(),
            title: format!("Ticket {}", identifier),
        })
    }

    async fn create_attachment(&self, attachment: &NewAttachment) -> Result<CreatedAttachment> {
        if self.fail_creation {
            return Err(LinkerError::AttachmentFailed("Linear reported success=false".to_string()).into());
        }
        self.created.lock().unwrap().push(attachment.clone());
        Ok(CreatedAttachment {
            id: format!("att-{}", self.created.lock().unwrap().len()),
            url: attachment.url.clone(),
            title: attachment.title.clone(),
        })
    }
}
