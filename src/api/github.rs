use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::SourceControl;
use crate::errors::LinkerError;
use crate::models::comment::Comment;
use crate::models::deployment::{Deployment, DeploymentState, DeploymentStatus};
use crate::models::pull_request::PullRequest;

const PAGE_SIZE: &str = "100";

pub struct GitHubClient {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct IssueComment {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    performed_via_github_app: Option<GitHubApp>,
}

#[derive(Debug, Deserialize)]
struct User {
    login: String,
    #[serde(default)]
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubApp {
    slug: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    number: u64,
    title: String,
    head: Head,
}

#[derive(Debug, Deserialize)]
struct Head {
    sha: String,
    #[serde(rename = "ref")]
    branch: String,
}

#[derive(Debug, Deserialize)]
struct DeploymentResponse {
    id: u64,
    #[serde(rename = "ref")]
    git_ref: String,
}

#[derive(Debug, Deserialize)]
struct DeploymentStatusResponse {
    state: String,
    #[serde(default)]
    environment_url: Option<String>,
    #[serde(default)]
    creator: Option<User>,
}

impl GitHubClient {
    pub fn new(api_url: String, owner: String, repo: String, token: String) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            owner,
            repo,
            token,
        }
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_url, self.owner, self.repo, path)
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "preview-linker")
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(LinkerError::from)
            .with_context(|| format!("Failed to fetch {}", what))?;

        let response = check_status(response).await?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    if status == 401 || status == 403 {
        debug!(%status, body = %text, "GitHub rejected the token");
        return Err(LinkerError::GitHubAuthFailed(status.as_u16()).into());
    }
    Err(LinkerError::GitHubApiError(status.as_u16(), text).into())
}

#[async_trait]
impl SourceControl for GitHubClient {
    async fn list_comments(&self, issue_number: u64) -> Result<Vec<Comment>> {
        let url = self.repo_url(&format!("issues/{}/comments", issue_number));
        let request = self.get(&url).query(&[("per_page", PAGE_SIZE)]);

        let comments: Vec<IssueComment> = self.send_json(request, "issue comments").await?;
        debug!(issue_number, count = comments.len(), "fetched comments");

        Ok(comments
            .into_iter()
            .map(|c| {
                let author = c.user.map(|u| u.login).unwrap_or_default();
                let comment = Comment::new(author, c.body.unwrap_or_default());
                match c.performed_via_github_app {
                    Some(app) => comment.via_app(app.slug),
                    None => comment,
                }
            })
            .collect())
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        let url = self.repo_url(&format!("pulls/{}", number));
        let pr: PullRequestResponse = self.send_json(self.get(&url), "pull request").await?;

        Ok(PullRequest {
            number: pr.number,
            head_sha: pr.head.sha,
            head_branch: pr.head.branch,
            title: pr.title,
        })
    }

    async fn list_deployments(&self, git_ref: &str) -> Result<Vec<Deployment>> {
        let url = self.repo_url("deployments");
        let request = self.get(&url).query(&[("ref", git_ref), ("per_page", PAGE_SIZE)]);

        let deployments: Vec<DeploymentResponse> = self.send_json(request, "deployments").await?;

        Ok(deployments
            .into_iter()
            .map(|d| Deployment {
                id: d.id,
                git_ref: d.git_ref,
            })
            .collect())
    }

    async fn list_deployment_statuses(&self, deployment_id: u64) -> Result<Vec<DeploymentStatus>> {
        let url = self.repo_url(&format!("deployments/{}/statuses", deployment_id));
        let statuses: Vec<DeploymentStatusResponse> =
            self.send_json(self.get(&url), "deployment statuses").await?;

        Ok(statuses
            .into_iter()
            .map(|s| DeploymentStatus {
                state: DeploymentState::from_api(&s.state),
                environment_url: s.environment_url.filter(|u| !u.is_empty()),
                creator_avatar_url: s.creator.and_then(|c| c.avatar_url),
            })
            .collect())
    }
}
