//! Jira Service Management customer request operations.

use super::{require, send, with_list_param};
use crate::client::AtlassianClient;
use crate::errors::AtlassianResult;
use crate::request::{Payload, RequestContext};
use crate::response::Response;
use crate::types::CustomerRequest;
use reqwest::Method;

/// Service for customer request operations.
pub struct ServiceDeskRequestService<'a> {
    client: &'a AtlassianClient,
}

impl<'a> ServiceDeskRequestService<'a> {
    /// Creates a new customer request service.
    pub fn new(client: &'a AtlassianClient) -> Self {
        Self { client }
    }

    /// Returns a customer request, expanding the given sections
    /// (`serviceDesk`, `requestType`, `participant`, ...).
    pub async fn get(
        &self,
        ctx: RequestContext,
        issue_key_or_id: &str,
        expand: &[&str],
    ) -> AtlassianResult<(CustomerRequest, Response)> {
        require("issueKeyOrID", issue_key_or_id)?;

        let path = with_list_param(
            format!("rest/servicedeskapi/request/{}", issue_key_or_id),
            "expand",
            expand,
        )?;
        let response = send(self.client, ctx, Method::GET, &path, Payload::Empty).await?;

        let request = response.error_for_status()?.decode()?;
        Ok((request, response))
    }
}
