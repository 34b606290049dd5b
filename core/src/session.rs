//! Session context handed to the client.
//!
//! Signing in is someone else's job: a `Session` is the result of it (server
//! URL, REST API version, site id, auth token) and the client only reads it.

use std::env;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_API_VERSION: &str = "3.4";

pub const SERVER_URL_VAR: &str = "TABLEAU_SERVER_URL";
pub const API_VERSION_VAR: &str = "TABLEAU_API_VERSION";
pub const SITE_ID_VAR: &str = "TABLEAU_SITE_ID";
pub const AUTH_TOKEN_VAR: &str = "TABLEAU_AUTH_TOKEN";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
}

/// An authenticated, site-scoped session.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    pub server_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    pub site_id: String,
    pub auth_token: String,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl Session {
    pub fn new(server_url: &str, site_id: &str, auth_token: &str) -> Self {
        Self {
            server_url: server_url.to_string(),
            api_version: default_api_version(),
            site_id: site_id.to_string(),
            auth_token: auth_token.to_string(),
        }
    }

    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = api_version.to_string();
        self
    }

    /// Read the session from `TABLEAU_*` environment variables.
    /// `TABLEAU_API_VERSION` is optional.
    pub fn from_env() -> Result<Self, SessionError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, SessionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(SessionError::MissingVar(name))
        };
        Ok(Self {
            server_url: require(SERVER_URL_VAR)?,
            api_version: lookup(API_VERSION_VAR)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(default_api_version),
            site_id: require(SITE_ID_VAR)?,
            auth_token: require(AUTH_TOKEN_VAR)?,
        })
    }

    /// `{server}/api/{version}/sites/{site_id}`, without a trailing slash.
    pub fn site_url(&self) -> String {
        format!(
            "{}/api/{}/sites/{}",
            self.server_url.trim_end_matches('/'),
            self.api_version,
            self.site_id
        )
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("server_url", &self.server_url)
            .field("api_version", &self.api_version)
            .field("site_id", &self.site_id)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}
