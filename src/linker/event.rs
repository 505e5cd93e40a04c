use tracing::{debug, error};

use crate::models::event::{Event, WorkUnit};

/// Picks the pull request an event is about, or `None` when the event has
/// nothing to link.
pub fn classify(event: &Event) -> Option<WorkUnit> {
    match event {
        Event::IssueComment(payload) => {
            let Some(link) = &payload.issue.pull_request else {
                error!(issue = payload.issue.number, "Skipping: comment is not on a pull request");
                return None;
            };
            debug!(url = ?link.url, "comment is on a pull request");
            Some(WorkUnit {
                issue_number: payload.issue.number,
                title: Some(payload.issue.title.clone()),
            })
        }
        Event::DeploymentStatus(payload) => {
            let Some(pr) = payload.deployment.pull_requests.first() else {
                error!("Skipping: deployment has no associated pull requests");
                return None;
            };
            Some(WorkUnit {
                issue_number: pr.number,
                title: None,
            })
        }
        Event::Other(name) => {
            error!(event = %name, "Skipping: unsupported event");
            None
        }
    }
}
