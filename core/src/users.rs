//! One-call-per-operation facade over `UsersClient` and a `Transport`.
//!
//! Each operation validates its arguments, builds the request, hands it to the
//! transport exactly once and parses the answer. Role validation happens
//! before the request exists, so an invalid role never reaches the transport.

use tracing::{debug, instrument};

use crate::client::UsersClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::session::Session;
use crate::transport::Transport;
use crate::types::{CreateUser, SiteRole, UpdateUser, User};

/// The users resource of one site.
#[derive(Debug)]
pub struct Users<T> {
    client: UsersClient,
    transport: T,
}

impl<T: Transport> Users<T> {
    pub fn new(session: Session, transport: T) -> Self {
        Self {
            client: UsersClient::new(session),
            transport,
        }
    }

    pub fn client(&self) -> &UsersClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Add `username` to the site. Without `site_role` the server default
    /// (`Viewer`) applies.
    #[instrument(skip(self))]
    pub fn create(&self, username: &str, site_role: Option<&str>) -> Result<User, ApiError> {
        let input = CreateUser {
            name: username.to_string(),
            site_role: SiteRole::parse_optional(site_role)?,
        };
        let request = self.client.build_create_user(&input)?;
        let response = self.exchange(request)?;
        self.client.parse_create_user(response)
    }

    /// Every user of the site, in server order.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<User>, ApiError> {
        let request = self.client.build_list_users();
        let response = self.exchange(request)?;
        self.client.parse_list_users(response)
    }

    /// Change a user's role, password or email. Fields left `None` are not
    /// sent. Spans record only whether an email was supplied, never its value
    /// or the password.
    #[instrument(skip(self, password, email), fields(email_supplied = email.is_some()))]
    pub fn update_user(
        &self,
        user_id: &str,
        site_role: Option<&str>,
        password: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, ApiError> {
        let input = UpdateUser {
            site_role: SiteRole::parse_optional(site_role)?,
            password: password.map(str::to_string),
            email: email.map(str::to_string),
        };
        let request = self.client.build_update_user(user_id, &input)?;
        let response = self.exchange(request)?;
        self.client.parse_update_user(user_id, &input, response)
    }

    fn exchange(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self.transport.send(request)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}
