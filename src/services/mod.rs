//! Domain service implementations.
//!
//! Each service validates its own arguments, sends through the client's
//! request pipeline and decodes the reply itself.

mod admin_users;
mod issue_votes;
mod service_desk_requests;

pub use admin_users::AdminUserService;
pub use issue_votes::IssueVoteService;
pub use service_desk_requests::ServiceDeskRequestService;

use crate::client::AtlassianClient;
use crate::errors::{AtlassianError, AtlassianResult};
use crate::request::{Payload, RequestContext, APPLICATION_JSON};
use crate::response::Response;
use reqwest::Method;

/// Fails with a missing-parameter error when `value` is blank.
pub(crate) fn require(name: &str, value: &str) -> AtlassianResult<()> {
    if value.trim().is_empty() {
        return Err(AtlassianError::missing_parameter(name));
    }
    Ok(())
}

/// Sends a JSON-accepting request through the client pipeline.
pub(crate) async fn send(
    client: &AtlassianClient,
    ctx: RequestContext,
    method: Method,
    path: &str,
    payload: Payload<'_>,
) -> AtlassianResult<Response> {
    let request = client
        .new_request(ctx, method, path, payload)?
        .accept(APPLICATION_JSON);
    client.execute(request).await
}

/// Appends a comma-joined list parameter, if any values are given.
pub(crate) fn with_list_param(path: String, name: &str, values: &[&str]) -> AtlassianResult<String> {
    if values.is_empty() {
        return Ok(path);
    }

    let query = serde_urlencoded::to_string([(name, values.join(","))]).map_err(|e| {
        AtlassianError::encoding(format!("Failed to serialize parameters: {}", e)).with_cause(e)
    })?;
    Ok(format!("{}?{}", path, query))
}
