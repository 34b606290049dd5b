//! Error types for the Tableau users client.
//!
//! # Design
//! Callers branch on the variant, never on the message. `InvalidSiteRole` is
//! raised before any request is built, so it guarantees nothing went over the
//! wire. `UserNotFound` is the one server-side condition with its own variant;
//! every other unexpected status lands in `HttpError` with the status, the
//! platform error code (when the body carries one) and the raw body.

use thiserror::Error;

/// Errors returned by `UsersClient` and the `Users` facade.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller supplied a site role outside the enumerated set.
    #[error("invalid site_role: {value}")]
    InvalidSiteRole { value: String },

    /// The server answered 404 for the user being updated.
    #[error("failed to find user: {user_id}")]
    UserNotFound { user_id: String },

    /// The transport could not complete the exchange.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server returned a status the operation does not expect.
    #[error("HTTP {status}: {body}")]
    HttpError {
        status: u16,
        code: Option<String>,
        body: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
