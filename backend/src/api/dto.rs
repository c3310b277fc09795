//! Shared Data Transfer Objects (DTOs) for API handlers.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::user::{User, UserId};
use crate::services::user_service::{UserView, RESULTS_PER_PAGE};

/// Where a browser front end should go after a successful mutation.
pub const USER_LIST_REDIRECT: &str = "/app/user/list";

/// Query parameters for the user list.
///
/// `offset` switches to a windowed query; `max` defaults to the page size.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Index of the first user to return
    pub offset: Option<i64>,
    /// Window size (default: 10)
    pub max: Option<i64>,
    /// Page shown as active by the client (default: 1)
    pub page: Option<u32>,
}

/// Public representation of a user (no password hash).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub username: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Result of a create, update or delete.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserMutationResponse {
    pub user: UserResponse,
    pub message: String,
    pub redirect: String,
}

impl UserMutationResponse {
    pub fn new(user: User, verb: &str) -> Self {
        let message = format!("successfully {} user : {}", verb, user.id);
        Self {
            user: user.into(),
            message,
            redirect: USER_LIST_REDIRECT.to_string(),
        }
    }
}

/// A single user page (show or edit).
#[derive(Debug, Serialize, ToSchema)]
pub struct UserPageResponse {
    pub title: String,
    pub user: UserResponse,
    pub roles: Vec<String>,
    /// Permission tokens such as `user:update:42`
    pub permissions: Vec<String>,
}

impl UserPageResponse {
    pub fn new(title_prefix: &str, view: UserView) -> Self {
        Self {
            title: format!("{} : {}", title_prefix, view.user.id),
            user: view.user.into(),
            roles: view.roles.into_iter().collect(),
            permissions: view.permissions.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// The empty create form.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateFormResponse {
    pub title: String,
    pub add_user_active: String,
}

impl Default for CreateFormResponse {
    fn default() -> Self {
        Self {
            title: "Create New User".to_string(),
            add_user_active: "active".to_string(),
        }
    }
}

/// The user list page.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub title: String,
    pub users: Vec<UserResponse>,
    pub total: i64,
    pub results_per_page: i64,
    pub active_page: u32,
}

impl UserListResponse {
    pub fn new(users: Vec<User>, total: i64, active_page: Option<u32>) -> Self {
        Self {
            title: "List Users".to_string(),
            users: users.into_iter().map(UserResponse::from).collect(),
            total,
            results_per_page: RESULTS_PER_PAGE,
            active_page: active_page.unwrap_or(1),
        }
    }
}
