use anyhow::{Context, Result};
use tracing::{error, info};

use crate::api::IssueTracker;
use crate::models::deployment::PreviewDeployment;
use crate::models::ticket::{CreatedAttachment, NewAttachment, TicketIdentifier};

pub const PR_NUMBER_PLACEHOLDER: &str = "{PR_NUMBER}";

pub fn attachment_title(template: &str, pr_number: u64) -> String {
    template.replace(PR_NUMBER_PLACEHOLDER, &pr_number.to_string())
}

/// Attaches the preview to the ticket. Every failure here is fatal.
pub async fn publish(
    linear: &dyn IssueTracker,
    title_template: &str,
    identifier: &TicketIdentifier,
    preview: &PreviewDeployment,
    pr_number: u64,
    subtitle: &str,
) -> Result<CreatedAttachment> {
    let issue = linear
        .find_issue(identifier.as_str())
        .await
        .inspect_err(|e| error!(%identifier, error = %e, "Failed to resolve ticket"))?;
    info!(%identifier, issue_id = %issue.id, "resolved ticket");

    let attachment = NewAttachment {
        issue_id: issue.id,
        title: attachment_title(title_template, pr_number),
        subtitle: subtitle.to_string(),
        url: preview.url.clone(),
        icon_url: preview.avatar_url.clone(),
    };

    let created = linear
        .create_attachment(&attachment)
        .await
        .inspect_err(|e| error!(%identifier, error = %e, "Failed to create attachment"))
        .with_context(|| format!("Attaching {} to {}", preview.url, identifier))?;
    info!(attachment_id = %created.id, "Attachment created");

    Ok(created)
}
