//! User lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the `Users` facade
//! over real HTTP through a ureq-backed `Transport`. Validates that request
//! building and response parsing work end-to-end with the actual server.

use std::cell::Cell;

use tableau_core::{
    is_tableau_id, ApiError, HttpMethod, HttpRequest, HttpResponse, Session, SiteRole, Transport,
    Users,
};

/// Executes `HttpRequest`s with ureq and counts them.
///
/// Disables ureq's status-code-as-error behavior so 4xx/5xx responses come
/// back as data, letting the client interpret them.
struct UreqTransport {
    agent: ureq::Agent,
    sent: Cell<usize>,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            sent: Cell::new(0),
        }
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.sent.set(self.sent.get() + 1);

        let result = match (req.method, req.body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&req.path), &req.headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&req.path), &req.headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(&req.path), &req.headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(&req.path), &req.headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(&req.path), &req.headers).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

fn start_mock_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn user_lifecycle() {
    // Step 1: start mock server on a random port.
    let addr = start_mock_server();
    let session = Session::new(&format!("http://{addr}"), "site-1", "token");
    let users = Users::new(session, UreqTransport::new());

    // Step 2: list, should be empty.
    assert!(users.list().unwrap().is_empty(), "expected empty site");

    // Step 3: create with a bad role fails without touching the server.
    let err = users.create("test", Some("foo")).unwrap_err();
    assert!(matches!(err, ApiError::InvalidSiteRole { ref value } if value == "foo"));
    assert_eq!(users.transport().sent.get(), 1);

    // Step 4: create with the server default role.
    let created = users.create("test", None).unwrap();
    assert!(is_tableau_id(&created.id));
    assert_eq!(created.name, "test");
    assert_eq!(created.site_role, SiteRole::Viewer);
    assert!(created.external_auth_user_id.is_none());
    assert!(created.email.is_none());
    assert!(created.password.is_none());

    // Step 5: list shows the user with an empty external auth id.
    let listed = users.list().unwrap();
    let user = listed.iter().find(|u| u.name == "test").unwrap();
    assert_eq!(user.id, created.id);
    assert_eq!(user.site_role, SiteRole::Viewer);
    assert_eq!(user.external_auth_user_id.as_deref(), Some(""));
    assert!(user.password.is_none());
    assert!(user.email.is_none());

    // Step 6: listing again without changes is equivalent.
    assert_eq!(users.list().unwrap(), listed);

    // Step 7: change the site role.
    let updated = users
        .update_user(&created.id, Some("Publisher"), None, None)
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.site_role, SiteRole::Publisher);

    let after = users.list().unwrap();
    let user_after = after.iter().find(|u| u.id == created.id).unwrap();
    assert_eq!(user_after.site_role, SiteRole::Publisher);
    assert_eq!(user_after.name, user.name);
    assert_eq!(user_after.external_auth_user_id, user.external_auth_user_id);

    // Step 8: change the password; it is echoed back, never listed.
    let updated = users
        .update_user(&created.id, Some("Viewer"), Some("new_password"), None)
        .unwrap();
    assert_eq!(updated.password.as_deref(), Some("new_password"));
    assert_eq!(updated.site_role, SiteRole::Viewer);

    // Step 9: change the email.
    let updated = users
        .update_user(&created.id, Some("Viewer"), None, Some("user@example.com"))
        .unwrap();
    assert_eq!(updated.email.as_deref(), Some("user@example.com"));

    // Step 10: invalid role on update is rejected client-side.
    let before = users.transport().sent.get();
    let err = users
        .update_user(&created.id, Some("foo"), None, None)
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidSiteRole { .. }));
    assert_eq!(users.transport().sent.get(), before);

    // Step 11: unknown user.
    let err = users.update_user("foo", Some("Viewer"), None, None).unwrap_err();
    assert!(matches!(err, ApiError::UserNotFound { ref user_id } if user_id == "foo"));

    // Step 12: creating the same name again is a conflict from the server.
    let err = users.create("test", None).unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 409, .. }));

    // Step 13: the site still holds exactly one user.
    let listed = users.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].password.is_none());
}

#[test]
fn missing_token_is_rejected_by_server() {
    let addr = start_mock_server();
    let session = Session::new(&format!("http://{addr}"), "site-1", "");
    let users = Users::new(session, UreqTransport::new());

    let err = users.list().unwrap_err();
    match err {
        ApiError::HttpError { status, code, .. } => {
            assert_eq!(status, 401);
            assert_eq!(code.as_deref(), Some("401002"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let session = Session::new(&format!("http://{addr}"), "site-1", "token");
    let users = Users::new(session, UreqTransport::new());
    assert!(matches!(users.list().unwrap_err(), ApiError::Transport(_)));
}
