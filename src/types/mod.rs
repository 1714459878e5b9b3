//! Domain types used by the bundled services.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Votes on a Jira issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssueVotes {
    /// Resource URL.
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_url: Option<String>,
    /// Number of votes.
    #[serde(default)]
    pub votes: u32,
    /// Whether the caller has voted.
    #[serde(default)]
    pub has_voted: bool,
    /// Voters visible to the caller.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub voters: Vec<JiraUser>,
}

/// Jira user summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    /// Account ID.
    #[serde(default)]
    pub account_id: String,
    /// Account type (`atlassian`, `app`, `customer`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// E-mail address, when visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    /// Whether the account is active.
    #[serde(default)]
    pub active: bool,
}

/// Managed Atlassian account profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ManagedUser {
    /// Account details.
    pub account: ManagedAccount,
}

/// Account section of a managed profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ManagedAccount {
    /// Account ID.
    pub account_id: String,
    /// Full name.
    #[serde(default)]
    pub name: String,
    /// Nickname.
    #[serde(default)]
    pub nickname: String,
    /// Time zone.
    #[serde(default)]
    pub zoneinfo: String,
    /// Locale.
    #[serde(default)]
    pub locale: String,
    /// E-mail address.
    #[serde(default)]
    pub email: String,
    /// Avatar URL.
    #[serde(default)]
    pub picture: String,
    /// Extended profile.
    #[serde(default)]
    pub extended_profile: ExtendedProfile,
    /// Account type.
    #[serde(default)]
    pub account_type: String,
    /// Account status (`active`, `inactive`, `closed`).
    #[serde(default)]
    pub account_status: String,
    /// Whether the e-mail was verified.
    #[serde(default)]
    pub email_verified: bool,
}

/// Extended profile fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtendedProfile {
    /// Job title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    /// Team type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_type: Option<String>,
}

/// Privileges the caller holds over a managed account, keyed by privilege
/// name (`profile.write`, `lifecycle.enablement`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct UserPermissions(pub BTreeMap<String, serde_json::Value>);

impl UserPermissions {
    /// Returns whether a top-level privilege is allowed.
    pub fn allowed(&self, privilege: &str) -> Option<bool> {
        self.0.get(privilege)?.get("allowed")?.as_bool()
    }

    /// Returns the reason key given for a top-level privilege.
    pub fn reason(&self, privilege: &str) -> Option<&str> {
        self.0.get(privilege)?.get("reason")?.get("key")?.as_str()
    }
}

/// Jira Service Management customer request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    /// Issue ID.
    pub issue_id: String,
    /// Issue key.
    pub issue_key: String,
    /// Request type ID.
    #[serde(default)]
    pub request_type_id: String,
    /// Service desk ID.
    #[serde(default)]
    pub service_desk_id: String,
    /// Reporter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<JiraUser>,
    /// Current status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_status: Option<RequestStatus>,
    /// Expanded service desk, present with `expand=serviceDesk`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_desk: Option<serde_json::Value>,
    /// Expanded request type, present with `expand=requestType`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_type: Option<serde_json::Value>,
}

/// Status of a customer request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestStatus {
    /// Status name.
    pub status: String,
    /// Status category (`NEW`, `INDETERMINATE`, `DONE`).
    #[serde(default)]
    pub status_category: String,
}
