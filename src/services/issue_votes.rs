//! Jira issue vote operations.

use super::{require, send};
use crate::client::AtlassianClient;
use crate::errors::AtlassianResult;
use crate::request::{Payload, RequestContext};
use crate::response::Response;
use crate::types::IssueVotes;
use reqwest::Method;

/// Service for issue vote operations.
pub struct IssueVoteService<'a> {
    client: &'a AtlassianClient,
}

impl<'a> IssueVoteService<'a> {
    /// Creates a new issue vote service.
    pub fn new(client: &'a AtlassianClient) -> Self {
        Self { client }
    }

    fn path(issue_key_or_id: &str) -> String {
        format!("rest/api/3/issue/{}/votes", issue_key_or_id)
    }

    /// Returns details about the votes on an issue.
    pub async fn get(
        &self,
        ctx: RequestContext,
        issue_key_or_id: &str,
    ) -> AtlassianResult<(IssueVotes, Response)> {
        require("issueKeyOrID", issue_key_or_id)?;

        let response = send(
            self.client,
            ctx,
            Method::GET,
            &Self::path(issue_key_or_id),
            Payload::Empty,
        )
        .await?;

        let votes = response.error_for_status()?.decode()?;
        Ok((votes, response))
    }

    /// Adds the caller's vote to an issue.
    pub async fn add(&self, ctx: RequestContext, issue_key_or_id: &str) -> AtlassianResult<Response> {
        require("issueKeyOrID", issue_key_or_id)?;

        let response = send(
            self.client,
            ctx,
            Method::POST,
            &Self::path(issue_key_or_id),
            Payload::Empty,
        )
        .await?;

        response.error_for_status()?;
        Ok(response)
    }

    /// Removes the caller's vote from an issue.
    pub async fn delete(
        &self,
        ctx: RequestContext,
        issue_key_or_id: &str,
    ) -> AtlassianResult<Response> {
        require("issueKeyOrID", issue_key_or_id)?;

        let response = send(
            self.client,
            ctx,
            Method::DELETE,
            &Self::path(issue_key_or_id),
            Payload::Empty,
        )
        .await?;

        response.error_for_status()?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AtlassianErrorKind;
    use crate::mocks::{MockResponse, MockTransport};
    use reqwest::header::ACCEPT;
    use serde_json::json;
    use std::sync::Arc;

    fn client(mock: &MockTransport) -> AtlassianClient {
        AtlassianClient::builder()
            .base_url("https://example.atlassian.net")
            .basic_auth("user@x.com", "tok")
            .transport(Arc::new(mock.clone()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_votes() {
        let mock = MockTransport::new();
        mock.on_get(
            "/rest/api/3/issue/KP-2/votes",
            MockResponse::ok(&json!({"votes": 2, "hasVoted": false})),
        );

        let client = client(&mock);
        let (votes, response) = client
            .issue_votes()
            .get(RequestContext::background(), "KP-2")
            .await
            .unwrap();

        assert_eq!(votes.votes, 2);
        assert_eq!(response.status_code(), 200);
        assert_eq!(
            mock.last_request().unwrap().headers.get(ACCEPT).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_get_votes_with_invalid_body() {
        let mock = MockTransport::new();
        mock.on_get(
            "/rest/api/3/issue/KP-2/votes",
            MockResponse::new(200).with_body("not json"),
        );

        let error = client(&mock)
            .issue_votes()
            .get(RequestContext::background(), "KP-2")
            .await
            .unwrap_err();

        assert_eq!(error.kind(), AtlassianErrorKind::DecodingError);
    }

    #[tokio::test]
    async fn test_add_vote() {
        let mock = MockTransport::new();
        mock.on_post("/rest/api/3/issue/KP-2/votes", MockResponse::no_content());

        let response = client(&mock)
            .issue_votes()
            .add(RequestContext::background(), "KP-2")
            .await
            .unwrap();

        assert_eq!(response.status_code(), 204);
        assert!(mock.last_request().unwrap().body.is_none());
    }

    #[tokio::test]
    async fn test_delete_vote_rejected() {
        let mock = MockTransport::new();
        mock.on_delete(
            "/rest/api/3/issue/KP-2/votes",
            MockResponse::json(404, &json!({"errorMessages": ["Issue does not exist"]})),
        );

        let error = client(&mock)
            .issue_votes()
            .delete(RequestContext::background(), "KP-2")
            .await
            .unwrap_err();

        assert_eq!(error.kind(), AtlassianErrorKind::UnexpectedStatus);
        assert_eq!(error.status_code(), Some(404));
    }

    #[tokio::test]
    async fn test_rejected_reply_is_kept_on_error() {
        let body = format!(
            "{{\"errorMessages\":[\"{}\"],\"errors\":{{}}}}END",
            "Issue does not exist or you do not have permission to see it. ".repeat(14)
        );
        let mock = MockTransport::new();
        mock.on_delete(
            "/rest/api/3/issue/KP-2/votes",
            MockResponse::new(404)
                .with_body(body.clone())
                .with_header("x-arequestid", "4f2c-11ee"),
        );

        let error = client(&mock)
            .issue_votes()
            .delete(RequestContext::background(), "KP-2")
            .await
            .unwrap_err();

        let response = error.response().unwrap();
        assert_eq!(response.bytes().as_ref(), body.as_bytes());
        assert!(response.text().ends_with("END"));
        assert_eq!(response.headers().get("x-arequestid").unwrap(), "4f2c-11ee");
        assert_eq!(
            response.endpoint().as_str(),
            "https://example.atlassian.net/rest/api/3/issue/KP-2/votes"
        );
    }

    #[tokio::test]
    async fn test_empty_issue_key() {
        let mock = MockTransport::new();

        let error = client(&mock)
            .issue_votes()
            .add(RequestContext::background(), "")
            .await
            .unwrap_err();

        assert_eq!(error.kind(), AtlassianErrorKind::MissingParameter);
        assert!(mock.requests().is_empty());
    }
}
