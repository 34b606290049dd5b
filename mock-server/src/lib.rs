use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const AUTH_HEADER: &str = "x-tableau-auth";

pub const SITE_ROLES: [&str; 14] = [
    "Creator",
    "Explorer",
    "ExplorerCanPublish",
    "ReadOnly",
    "ServerAdministrator",
    "SiteAdministratorCreator",
    "SiteAdministratorExplorer",
    "Unlicensed",
    "Viewer",
    "Interactor",
    "Publisher",
    "SiteAdministrator",
    "UnlicensedWithPublish",
    "ViewerWithPublish",
];

const DEFAULT_SITE_ROLE: &str = "Viewer";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub site_role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_auth_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserEnvelope<T> {
    pub user: T,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page_number: String,
    pub page_size: String,
    pub total_available: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub user: Vec<User>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListEnvelope {
    pub pagination: Pagination,
    pub users: UserList,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub site_role: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserChanges {
    pub site_role: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub summary: String,
    pub detail: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

type Failure = (StatusCode, Json<ErrorEnvelope>);

fn failure(status: StatusCode, code: &str, summary: &str, detail: String) -> Failure {
    (
        status,
        Json(ErrorEnvelope {
            error: ErrorDetail {
                summary: summary.to_string(),
                detail,
                code: code.to_string(),
            },
        }),
    )
}

/// Stored user. Passwords are never kept, only echoed by the update.
#[derive(Clone, Debug)]
struct Account {
    id: Uuid,
    name: String,
    site_role: String,
    external_auth_user_id: String,
    email: Option<String>,
}

impl Account {
    fn created(&self) -> User {
        User {
            id: self.id,
            name: self.name.clone(),
            site_role: self.site_role.clone(),
            external_auth_user_id: None,
            email: None,
            password: None,
        }
    }

    fn listed(&self) -> User {
        User {
            external_auth_user_id: Some(self.external_auth_user_id.clone()),
            email: self.email.clone(),
            ..self.created()
        }
    }
}

/// Users per site id, in insertion order.
type Db = Arc<RwLock<HashMap<String, Vec<Account>>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/api/{version}/sites/{site_id}/users", get(list_users).post(create_user))
        .route("/api/{version}/sites/{site_id}/users/{user_id}", put(update_user))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn authorize(headers: &HeaderMap) -> Result<(), Failure> {
    let token = headers
        .get(AUTH_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if token.is_empty() {
        return Err(failure(
            StatusCode::UNAUTHORIZED,
            "401002",
            "Unauthorized Access",
            "Invalid authentication credentials were provided.".to_string(),
        ));
    }
    Ok(())
}

fn check_site_role(role: &str) -> Result<(), Failure> {
    if SITE_ROLES.contains(&role) {
        return Ok(());
    }
    Err(failure(
        StatusCode::BAD_REQUEST,
        "400000",
        "Bad Request",
        format!("'{role}' is not a valid site role."),
    ))
}

async fn list_users(
    State(db): State<Db>,
    Path((_version, site_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<UserListEnvelope>, Failure> {
    authorize(&headers)?;
    let sites = db.read().await;
    let user: Vec<User> = sites
        .get(&site_id)
        .map(|accounts| accounts.iter().map(Account::listed).collect())
        .unwrap_or_default();
    Ok(Json(UserListEnvelope {
        pagination: Pagination {
            page_number: "1".to_string(),
            page_size: "100".to_string(),
            total_available: user.len().to_string(),
        },
        users: UserList { user },
    }))
}

async fn create_user(
    State(db): State<Db>,
    Path((_version, site_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(input): Json<UserEnvelope<NewUser>>,
) -> Result<(StatusCode, Json<UserEnvelope<User>>), Failure> {
    authorize(&headers)?;
    let site_role = input
        .user
        .site_role
        .unwrap_or_else(|| DEFAULT_SITE_ROLE.to_string());
    check_site_role(&site_role)?;

    let mut sites = db.write().await;
    let accounts = sites.entry(site_id).or_default();
    if accounts.iter().any(|account| account.name == input.user.name) {
        return Err(failure(
            StatusCode::CONFLICT,
            "409017",
            "Conflict",
            format!("User '{}' already exists in the site.", input.user.name),
        ));
    }

    let account = Account {
        id: Uuid::new_v4(),
        name: input.user.name,
        site_role,
        external_auth_user_id: String::new(),
        email: None,
    };
    info!(id = %account.id, name = %account.name, site_role = %account.site_role, "user created");
    let user = account.created();
    accounts.push(account);
    Ok((StatusCode::CREATED, Json(UserEnvelope { user })))
}

async fn update_user(
    State(db): State<Db>,
    Path((_version, site_id, user_id)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(input): Json<UserEnvelope<UserChanges>>,
) -> Result<Json<UserEnvelope<User>>, Failure> {
    authorize(&headers)?;
    let changes = input.user;
    if let Some(role) = &changes.site_role {
        check_site_role(role)?;
    }

    let not_found = || {
        failure(
            StatusCode::NOT_FOUND,
            "404002",
            "Resource Not Found",
            format!("User '{user_id}' could not be found."),
        )
    };
    let id: Uuid = user_id.parse().map_err(|_| not_found())?;

    let mut sites = db.write().await;
    let account = sites
        .get_mut(&site_id)
        .and_then(|accounts| accounts.iter_mut().find(|account| account.id == id))
        .ok_or_else(not_found)?;

    if let Some(role) = changes.site_role {
        account.site_role = role;
    }
    if let Some(email) = changes.email {
        account.email = Some(email);
    }
    info!(id = %account.id, site_role = %account.site_role, "user updated");

    let user = User {
        email: account.email.clone(),
        password: changes.password,
        ..account.created()
    };
    Ok(Json(UserEnvelope { user }))
}
