//! Organization admin user management operations.
//!
//! Paths are relative to the admin API base (`https://api.atlassian.com/admin`).

use super::{require, send, with_list_param};
use crate::client::AtlassianClient;
use crate::errors::{AtlassianError, AtlassianErrorKind, AtlassianResult};
use crate::request::{Payload, RequestContext};
use crate::response::Response;
use crate::types::{ManagedUser, UserPermissions};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Serialize)]
struct DisablePayload<'a> {
    message: &'a str,
}

/// Service for managed account operations.
pub struct AdminUserService<'a> {
    client: &'a AtlassianClient,
}

impl<'a> AdminUserService<'a> {
    /// Creates a new admin user service.
    pub fn new(client: &'a AtlassianClient) -> Self {
        Self { client }
    }

    /// Returns the privileges the caller holds over an account, optionally
    /// narrowed to the given privilege names.
    pub async fn permissions(
        &self,
        ctx: RequestContext,
        account_id: &str,
        privileges: &[&str],
    ) -> AtlassianResult<(UserPermissions, Response)> {
        require("accountID", account_id)?;

        let path = with_list_param(
            format!("/users/{}/manage", account_id),
            "privileges",
            privileges,
        )?;
        let response = send(self.client, ctx, Method::GET, &path, Payload::Empty).await?;

        let permissions = response.error_for_status()?.decode()?;
        Ok((permissions, response))
    }

    /// Returns the profile of a managed account.
    pub async fn get(
        &self,
        ctx: RequestContext,
        account_id: &str,
    ) -> AtlassianResult<(ManagedUser, Response)> {
        require("accountID", account_id)?;

        let path = format!("/users/{}/manage/profile", account_id);
        let response = send(self.client, ctx, Method::GET, &path, Payload::Empty).await?;

        let user = response.error_for_status()?.decode()?;
        Ok((user, response))
    }

    /// Updates profile fields of a managed account.
    pub async fn update(
        &self,
        ctx: RequestContext,
        account_id: &str,
        fields: &Map<String, Value>,
    ) -> AtlassianResult<(ManagedUser, Response)> {
        require("accountID", account_id)?;
        if fields.is_empty() {
            return Err(AtlassianError::new(
                AtlassianErrorKind::MissingParameter,
                "please provide a payload map with at least one field",
            ));
        }

        let path = format!("/users/{}/manage/profile", account_id);
        let response = send(self.client, ctx, Method::PATCH, &path, Payload::json(fields)).await?;

        let user = response.error_for_status()?.decode()?;
        Ok((user, response))
    }

    /// Disables a managed account. The optional message is shown to the
    /// user on their next sign-in attempt.
    pub async fn disable(
        &self,
        ctx: RequestContext,
        account_id: &str,
        message: Option<&str>,
    ) -> AtlassianResult<Response> {
        require("accountID", account_id)?;

        let path = format!("/users/{}/manage/lifecycle/disable", account_id);
        let body = message
            .filter(|m| !m.is_empty())
            .map(|message| DisablePayload { message });
        let payload = match body {
            Some(ref body) => Payload::json(body),
            None => Payload::Empty,
        };

        let response = send(self.client, ctx, Method::POST, &path, payload).await?;
        response.error_for_status()?;
        Ok(response)
    }

    /// Enables a managed account.
    pub async fn enable(&self, ctx: RequestContext, account_id: &str) -> AtlassianResult<Response> {
        require("accountID", account_id)?;

        let path = format!("/users/{}/manage/lifecycle/enable", account_id);
        let response = send(self.client, ctx, Method::POST, &path, Payload::Empty).await?;
        response.error_for_status()?;
        Ok(response)
    }
}
