//! Synchronous client core for the Tableau REST API users resource.
//!
//! # Overview
//! Creates, lists and updates the users of one site. `UsersClient` builds
//! `HttpRequest` values and parses `HttpResponse` values without touching the
//! network (host-does-IO pattern). `Users` wraps it with an injected
//! `Transport` so each operation is a single call.
//!
//! # Design
//! - `UsersClient` is stateless apart from the `Session` it is handed; signing
//!   in and token refresh belong to the caller.
//! - Site roles are a closed enum, validated before any request is built.
//! - Failures are a typed `ApiError`, so callers match on the kind.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;
pub mod types;
pub mod users;

pub use client::UsersClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{Session, SessionError};
pub use transport::Transport;
pub use types::{is_tableau_id, CreateUser, SiteRole, UpdateUser, User};
pub use users::Users;
