//! Stateless HTTP request builder and response parser for the users resource.
//!
//! # Design
//! `UsersClient` holds only the session it was handed and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Whoever sits in between performs the round-trip, keeping
//! this layer deterministic and free of I/O.

use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::Session;
use crate::types::{
    CreateUser, ErrorEnvelope, UpdateUser, UpdatedUser, User, UserEnvelope, UserListEnvelope,
};

pub const AUTH_HEADER: &str = "x-tableau-auth";

/// Platform error code for an unknown user.
pub const USER_NOT_FOUND_CODE: &str = "404002";

/// Synchronous, stateless client for the site-scoped users endpoints.
#[derive(Debug, Clone)]
pub struct UsersClient {
    session: Session,
    users_url: String,
}

impl UsersClient {
    pub fn new(session: Session) -> Self {
        let users_url = format!("{}/users", session.site_url());
        Self { session, users_url }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn build_create_user(&self, input: &CreateUser) -> Result<HttpRequest, ApiError> {
        self.request_with_body(HttpMethod::Post, self.users_url.clone(), input)
    }

    pub fn build_list_users(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.users_url.clone(),
            headers: self.headers(false),
            body: None,
        }
    }

    /// `user_id` is percent-encoded into a single path segment.
    pub fn build_update_user(&self, user_id: &str, input: &UpdateUser) -> Result<HttpRequest, ApiError> {
        let path = format!("{}/{}", self.users_url, urlencoding::encode(user_id));
        self.request_with_body(HttpMethod::Put, path, input)
    }

    pub fn parse_create_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        check_status(&response, 201)?;
        let envelope: UserEnvelope<User> = deserialize(&response.body)?;
        require_id(&envelope.user)?;
        Ok(envelope.user)
    }

    /// Users in server order. `externalAuthUserId` defaults to an empty string.
    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Vec<User>, ApiError> {
        check_status(&response, 200)?;
        let envelope: UserListEnvelope = deserialize(&response.body)?;
        let mut users = envelope.users.user;

        if let Some(pagination) = envelope.pagination {
            if pagination.total_available > users.len() as u64 {
                warn!(
                    page_number = pagination.page_number,
                    page_size = pagination.page_size,
                    total_available = pagination.total_available,
                    returned = users.len(),
                    "user listing truncated by server paging"
                );
            }
        }

        for user in &mut users {
            require_id(user)?;
            user.external_auth_user_id.get_or_insert_with(String::new);
        }
        Ok(users)
    }

    /// Parse an update response. A 404 carrying the user-not-found code (or
    /// no code at all) means `user_id` is unknown to the site; any other 404,
    /// such as a missing site, stays an `HttpError`.
    ///
    /// The server's record is completed with the request: `id` when the body
    /// omits it, and the supplied `password`/`email` as confirmation echoes.
    pub fn parse_update_user(
        &self,
        user_id: &str,
        input: &UpdateUser,
        response: HttpResponse,
    ) -> Result<User, ApiError> {
        if response.status == 404 {
            let code = error_code(&response.body);
            if code.is_none() || code.as_deref() == Some(USER_NOT_FOUND_CODE) {
                return Err(ApiError::UserNotFound {
                    user_id: user_id.to_string(),
                });
            }
        }
        check_status(&response, 200)?;
        let envelope: UserEnvelope<UpdatedUser> = deserialize(&response.body)?;
        let mut user = envelope.user.into_user(user_id);

        if user.password.is_none() {
            user.password = input.password.clone();
        }
        if user.email.is_none() {
            user.email = input.email.clone();
        }
        Ok(user)
    }

    fn request_with_body<T: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        user: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(&UserEnvelope { user })
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: self.headers(true),
            body: Some(body),
        })
    }

    fn headers(&self, with_body: bool) -> Vec<(String, String)> {
        let mut headers = vec![
            (AUTH_HEADER.to_string(), self.session.auth_token.clone()),
            ("accept".to_string(), "application/json".to_string()),
        ];
        if with_body {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        headers
    }
}

fn require_id(user: &User) -> Result<(), ApiError> {
    if user.id.is_empty() {
        return Err(ApiError::DeserializationError(format!(
            "user '{}' has no id",
            user.name
        )));
    }
    Ok(())
}

fn error_code(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.code)
}

fn deserialize<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map an unexpected status to `HttpError`, keeping the platform error code
/// when the body carries one.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        code: error_code(&response.body),
        body: response.body.clone(),
    })
}
