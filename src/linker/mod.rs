pub mod deployment;
pub mod event;
pub mod identifier;
pub mod publisher;

#[cfg(test)]
pub(crate) mod testing;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::api::{IssueTracker, SourceControl};
use crate::models::deployment::PreviewDeployment;
use crate::models::event::Event;
use crate::models::ticket::{CreatedAttachment, TicketIdentifier};
use identifier::BotIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotApplicable,
    NoTicketIdentifier,
    NoPreviewDeployment,
}

impl SkipReason {
    pub fn describe(&self) -> &'static str {
        match self {
            SkipReason::NotApplicable => "event is not about a pull request",
            SkipReason::NoTicketIdentifier => "linear identifier not found",
            SkipReason::NoPreviewDeployment => "preview data not found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Linked {
        identifier: TicketIdentifier,
        attachment: CreatedAttachment,
    },
    Skipped(SkipReason),
}

/// What `inspect` found for a pull request, without writing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub identifier: Option<TicketIdentifier>,
    pub preview: Option<PreviewDeployment>,
    pub title: String,
}

/// Everything one run needs, built once in `main`.
#[derive(Clone)]
pub struct Linker {
    pub github: Arc<dyn SourceControl>,
    pub linear: Arc<dyn IssueTracker>,
    pub bot: BotIdentity,
    pub title_template: String,
}

impl Linker {
    pub fn new(
        github: Arc<dyn SourceControl>,
        linear: Arc<dyn IssueTracker>,
        bot: BotIdentity,
        title_template: String,
    ) -> Self {
        Self {
            github,
            linear,
            bot,
            title_template,
        }
    }

    pub async fn run(&self, event: &Event) -> Result<Outcome> {
        info!(event = event.name(), "Starting");

        let Some(work) = event::classify(event) else {
            return Ok(Outcome::Skipped(SkipReason::NotApplicable));
        };
        let pr_number = work.issue_number;

        let comments = self.github.list_comments(pr_number).await?;
        let Some(identifier) = identifier::extract_identifier(&comments, &self.bot) else {
            info!("Skipping: {}", SkipReason::NoTicketIdentifier.describe());
            return Ok(Outcome::Skipped(SkipReason::NoTicketIdentifier));
        };

        let pull_request = self.github.get_pull_request(pr_number).await?;
        let Some(preview) = deployment::resolve_deployment(self.github.as_ref(), &pull_request).await? else {
            info!("Skipping: {}", SkipReason::NoPreviewDeployment.describe());
            return Ok(Outcome::Skipped(SkipReason::NoPreviewDeployment));
        };

        let subtitle = work.title.unwrap_or(pull_request.title);
        let attachment = publisher::publish(
            self.linear.as_ref(),
            &self.title_template,
            &identifier,
            &preview,
            pr_number,
            &subtitle,
        )
        .await?;

        info!("Done running");
        Ok(Outcome::Linked {
            identifier,
            attachment,
        })
    }

    pub async fn inspect(&self, pr_number: u64) -> Result<Inspection> {
        let comments = self.github.list_comments(pr_number).await?;
        let identifier = identifier::extract_identifier(&comments, &self.bot);

        let pull_request = self.github.get_pull_request(pr_number).await?;
        let preview = deployment::resolve_deployment(self.github.as_ref(), &pull_request).await?;

        Ok(Inspection {
            identifier,
            preview,
            title: publisher::attachment_title(&self.title_template, pr_number),
        })
    }
}
