//! The seam between the client and whatever performs HTTP.
//!
//! A live HTTP agent, a fixture replayer or a recording test double all
//! implement the same trait, so the facade never changes when the backend
//! does. Closures implement it directly.

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one request and returns the response as plain data.
///
/// Non-2xx statuses are responses, not errors: return them as `HttpResponse`
/// and let the client interpret them. `Err` is for exchanges that did not
/// complete at all, usually as `ApiError::Transport`.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, ApiError>,
{
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self(request)
    }
}
