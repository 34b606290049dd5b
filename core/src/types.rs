//! Domain DTOs for the users resource.
//!
//! # Design
//! The REST API wraps every user payload in a `{"user": ...}` envelope and
//! every listing in `{"pagination": ..., "users": {"user": [...]}}`. The
//! envelopes stay crate-private; callers only see `User` and the request
//! payloads. Optional fields are skipped when absent so a freshly created
//! user serializes back to exactly `id`, `name` and `siteRole`.
//!
//! These types are defined independently from the mock-server crate.
//! Integration tests catch any schema drift between the two.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Permission level of a user within a site.
///
/// Closed set: anything else is rejected by `FromStr` before a request is
/// built. Variant names are the wire spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteRole {
    Creator,
    Explorer,
    ExplorerCanPublish,
    ReadOnly,
    ServerAdministrator,
    SiteAdministratorCreator,
    SiteAdministratorExplorer,
    Unlicensed,
    Viewer,
    // Accepted by servers that predate the 2018.1 licensing model.
    Interactor,
    Publisher,
    SiteAdministrator,
    UnlicensedWithPublish,
    ViewerWithPublish,
}

impl SiteRole {
    pub const ALL: [SiteRole; 14] = [
        SiteRole::Creator,
        SiteRole::Explorer,
        SiteRole::ExplorerCanPublish,
        SiteRole::ReadOnly,
        SiteRole::ServerAdministrator,
        SiteRole::SiteAdministratorCreator,
        SiteRole::SiteAdministratorExplorer,
        SiteRole::Unlicensed,
        SiteRole::Viewer,
        SiteRole::Interactor,
        SiteRole::Publisher,
        SiteRole::SiteAdministrator,
        SiteRole::UnlicensedWithPublish,
        SiteRole::ViewerWithPublish,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SiteRole::Creator => "Creator",
            SiteRole::Explorer => "Explorer",
            SiteRole::ExplorerCanPublish => "ExplorerCanPublish",
            SiteRole::ReadOnly => "ReadOnly",
            SiteRole::ServerAdministrator => "ServerAdministrator",
            SiteRole::SiteAdministratorCreator => "SiteAdministratorCreator",
            SiteRole::SiteAdministratorExplorer => "SiteAdministratorExplorer",
            SiteRole::Unlicensed => "Unlicensed",
            SiteRole::Viewer => "Viewer",
            SiteRole::Interactor => "Interactor",
            SiteRole::Publisher => "Publisher",
            SiteRole::SiteAdministrator => "SiteAdministrator",
            SiteRole::UnlicensedWithPublish => "UnlicensedWithPublish",
            SiteRole::ViewerWithPublish => "ViewerWithPublish",
        }
    }

    /// Validate an optional caller-supplied role. `None` stays `None`.
    pub fn parse_optional(value: Option<&str>) -> Result<Option<SiteRole>, ApiError> {
        value.map(str::parse::<SiteRole>).transpose()
    }
}

impl FromStr for SiteRole {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SiteRole::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ApiError::InvalidSiteRole {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for SiteRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user record as returned by the API.
///
/// `external_auth_user_id`, `email` and `password` are `None` when the server
/// did not send them. `password` is only ever populated by an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub site_role: SiteRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_auth_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// A user as returned by an update. The server may leave out the id, which
/// the caller already knows from the request path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatedUser {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub site_role: SiteRole,
    #[serde(default)]
    pub external_auth_user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl UpdatedUser {
    pub(crate) fn into_user(self, requested_id: &str) -> User {
        User {
            id: self
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| requested_id.to_string()),
            name: self.name,
            site_role: self.site_role,
            external_auth_user_id: self.external_auth_user_id,
            email: self.email,
            password: self.password,
        }
    }
}

/// Platform ids are hyphenated UUIDs.
pub fn is_tableau_id(id: &str) -> bool {
    id.len() == 36 && Uuid::parse_str(id).is_ok()
}

/// Request payload for adding a user to the site. Without a role the server
/// applies its default (`Viewer`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_role: Option<SiteRole>,
}

/// Request payload for updating a user. Only the fields present are sent;
/// omitted fields remain unchanged on the server.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_role: Option<SiteRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl fmt::Debug for UpdateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUser")
            .field("site_role", &self.site_role)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct UserEnvelope<T> {
    pub user: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserListEnvelope {
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub users: UserList,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserList {
    #[serde(default)]
    pub user: Vec<User>,
}

/// Paging block of a listing. The API encodes the counts as strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Pagination {
    #[serde(deserialize_with = "count")]
    pub page_number: u64,
    #[serde(deserialize_with = "count")]
    pub page_size: u64,
    #[serde(deserialize_with = "count")]
    pub total_available: u64,
}

fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Error body sent by the platform on failure.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub code: Option<String>,
}
