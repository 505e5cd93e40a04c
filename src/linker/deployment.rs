use anyhow::Result;
use tracing::{debug, error, info};

use crate::api::SourceControl;
use crate::models::deployment::{Deployment, DeploymentState, PreviewDeployment};
use crate::models::pull_request::PullRequest;

/// Finds the live preview for a pull request.
///
/// Looks up deployments by head SHA, then by head branch when the SHA has
/// none. `Ok(None)` covers every routine miss; API failures are errors.
pub async fn resolve_deployment(
    github: &dyn SourceControl,
    pull_request: &PullRequest,
) -> Result<Option<PreviewDeployment>> {
    let deployment = match find_deployment(github, &pull_request.head_sha).await? {
        Lookup::Found(deployment) => deployment,
        Lookup::Ambiguous => return Ok(None),
        Lookup::Missing => {
            info!(
                sha = %pull_request.head_sha,
                branch = %pull_request.head_branch,
                "No deployment for the head commit, trying the branch"
            );
            match find_deployment(github, &pull_request.head_branch).await? {
                Lookup::Found(deployment) => deployment,
                Lookup::Ambiguous => return Ok(None),
                Lookup::Missing => {
                    error!(pr = pull_request.number, "No deployment found for the ref");
                    return Ok(None);
                }
            }
        }
    };

    let statuses = github.list_deployment_statuses(deployment.id).await?;
    let Some(status) = statuses.into_iter().next() else {
        error!(deployment_id = deployment.id, "No deployment status found for the deployment");
        return Ok(None);
    };

    if status.state != DeploymentState::Success {
        error!(deployment_id = deployment.id, "Deployment status is not success");
        return Ok(None);
    }

    let Some(url) = status.environment_url else {
        error!(deployment_id = deployment.id, "No environment URL found for the deployment");
        return Ok(None);
    };

    Ok(Some(PreviewDeployment {
        url,
        avatar_url: status.creator_avatar_url,
    }))
}

enum Lookup {
    Found(Deployment),
    Missing,
    Ambiguous,
}

async fn find_deployment(github: &dyn SourceControl, git_ref: &str) -> Result<Lookup> {
    let mut deployments = github.list_deployments(git_ref).await?;

    match deployments.len() {
        0 => Ok(Lookup::Missing),
        1 => {
            let deployment = deployments.remove(0);
            debug!(id = deployment.id, git_ref = %deployment.git_ref, "matched deployment");
            Ok(Lookup::Found(deployment))
        }
        _ => {
            let ids: Vec<u64> = deployments.iter().map(|d| d.id).collect();
            error!(git_ref, ?ids, "Multiple deployments found for the same ref");
            Ok(Lookup::Ambiguous)
        }
    }
}
