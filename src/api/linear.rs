use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::IssueTracker;
use crate::errors::LinkerError;
use crate::models::ticket::{CreatedAttachment, NewAttachment, TrackerIssue};

const ISSUE_QUERY: &str = r#"query Issue($id: String!) {
  issue(id: $id) {
    id
    identifier
    title
  }
}"#;

const ATTACHMENT_CREATE_MUTATION: &str = r#"mutation AttachmentCreate($input: AttachmentCreateInput!) {
  attachmentCreate(input: $input) {
    success
    attachment {
      id
      url
      title
    }
  }
}"#;

pub struct LinearClient {
    client: Client,
    api_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct IssueData {
    issue: Option<TrackerIssue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentCreateData {
    attachment_create: AttachmentPayload,
}

#[derive(Debug, Deserialize)]
struct AttachmentPayload {
    success: bool,
    attachment: Option<CreatedAttachment>,
}

fn join_messages(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl LinearClient {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }

    async fn execute<V, T>(&self, query: &str, variables: V) -> Result<GraphQlResponse<T>>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", &self.api_key)
            .header("Content-Type", "application/json")
            .header("User-Agent", "preview-linker")
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .map_err(|e| LinkerError::NetworkError(e.to_string()))
            .context("Failed to send request to Linear")?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        // Linear reports query errors as 400 with a GraphQL body, so only
        // bail early when the body isn't one.
        match serde_json::from_str::<GraphQlResponse<T>>(&text) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(LinkerError::LinearApiError(format!(
                "HTTP {}: {}",
                status, text
            ))
            .into()),
            Err(e) => Err(e).context("Failed to parse Linear response"),
        }
    }
}

#[async_trait]
impl IssueTracker for LinearClient {
    async fn find_issue(&self, identifier: &str) -> Result<TrackerIssue> {
        let response: GraphQlResponse<IssueData> = self
            .execute(ISSUE_QUERY, json!({ "id": identifier }))
            .await?;

        if let Some(issue) = response.data.and_then(|d| d.issue) {
            debug!(identifier = %issue.identifier, title = %issue.title, issue_id = %issue.id, "resolved Linear issue");
            return Ok(issue);
        }

        let message = join_messages(&response.errors);
        if response.errors.is_empty() || message.to_lowercase().contains("not found") {
            return Err(LinkerError::TicketNotFound(identifier.to_string()).into());
        }
        Err(LinkerError::LinearApiError(message).into())
    }

    async fn create_attachment(&self, attachment: &NewAttachment) -> Result<CreatedAttachment> {
        let response: GraphQlResponse<AttachmentCreateData> = self
            .execute(ATTACHMENT_CREATE_MUTATION, json!({ "input": attachment }))
            .await?;

        if !response.errors.is_empty() {
            return Err(LinkerError::AttachmentFailed(join_messages(&response.errors)).into());
        }

        let payload = response
            .data
            .map(|d| d.attachment_create)
            .ok_or_else(|| LinkerError::AttachmentFailed("empty response".to_string()))?;

        if !payload.success {
            return Err(LinkerError::AttachmentFailed("Linear reported success=false".to_string()).into());
        }

        payload
            .attachment
            .ok_or_else(|| LinkerError::AttachmentFailed("attachment is null".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> LinearClient {
        LinearClient::new(format!("{}/graphql", server.url()), "lin_api_test".to_string())
    }

    fn attachment() -> NewAttachment {
        NewAttachment {
            issue_id: "issue-uuid".to_string(),
            title: "Preview of PR #12".to_string(),
            subtitle: "Add login page".to_string(),
            url: "https://web-git-login.vercel.app".to_string(),
            icon_url: Some("https://avatars.example/vercel".to_string()),
        }
    }

    #[tokio::test]
    async fn test_find_issue_sends_identifier() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_header("authorization", "lin_api_test")
            .match_body(Matcher::PartialJson(json!({ "variables": { "id": "PRE-7" } })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"issue": {"id": "issue-uuid", "identifier": "PRE-7", "title": "Detect identifiers"}}}"#)
            .create_async()
            .await;

        let issue = client_for(&server).find_issue("PRE-7").await.unwrap();

        mock.assert_async().await;
        assert_eq!(issue.id, "issue-uuid");
        assert_eq!(issue.identifier, "PRE-7");
    }

    #[tokio::test]
    async fn test_find_issue_entity_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": null, "errors": [{"message": "Entity not found: Issue"}]}"#)
            .create_async()
            .await;

        let err = client_for(&server).find_issue("NOPE-1").await.unwrap_err();

        match err.downcast_ref::<LinkerError>() {
            Some(LinkerError::TicketNotFound(id)) => assert_eq!(id, "NOPE-1"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_find_issue_other_graphql_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": null, "errors": [{"message": "Authentication required"}]}"#)
            .create_async()
            .await;

        let err = client_for(&server).find_issue("PRE-7").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LinkerError>(),
            Some(LinkerError::LinearApiError(_))
        ));
    }

    #[tokio::test]
    async fn test_non_graphql_failure_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let err = client_for(&server).find_issue("PRE-7").await.unwrap_err();

        match err.downcast_ref::<LinkerError>() {
            Some(LinkerError::LinearApiError(msg)) => assert!(msg.contains("Bad Gateway")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_attachment_sends_input() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({
                "variables": { "input": {
                    "issueId": "issue-uuid",
                    "title": "Preview of PR #12",
                    "subtitle": "Add login page",
                    "url": "https://web-git-login.vercel.app",
                    "iconUrl": "https://avatars.example/vercel"
                }}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": {"attachmentCreate": {"success": true,
                    "attachment": {"id": "att-1", "url": "https://web-git-login.vercel.app", "title": "Preview of PR #12"}}}}"#,
            )
            .create_async()
            .await;

        let created = client_for(&server)
            .create_attachment(&attachment())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created.id, "att-1");
    }

    #[tokio::test]
    async fn test_create_attachment_unsuccessful() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"attachmentCreate": {"success": false, "attachment": null}}}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .create_attachment(&attachment())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LinkerError>(),
            Some(LinkerError::AttachmentFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_create_attachment_success_without_object() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"attachmentCreate": {"success": true, "attachment": null}}}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .create_attachment(&attachment())
            .await
            .unwrap_err();

        match err.downcast_ref::<LinkerError>() {
            Some(LinkerError::AttachmentFailed(msg)) => assert_eq!(msg, "attachment is null"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
