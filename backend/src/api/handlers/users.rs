//! User management handlers.
//!
//! Routes are mounted under `/api/v1/user` behind the optional-auth
//! middleware; gated operations turn an anonymous caller into a 401 and a
//! denied subject into a 403.

use axum::{
    extract::{Extension, Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::{OpenApi, ToSchema};

use crate::api::dto::{
    CreateFormResponse, ListUsersQuery, UserListResponse, UserMutationResponse, UserPageResponse,
    UserResponse,
};
use crate::api::middleware::auth::require_subject;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::subject::Subject;
use crate::models::user::UserId;
use crate::services::user_service::{CreateUser, ListWindow, UpdateUser};

/// Create user routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(create_user))
        .route("/create", get(create_form))
        .route("/list", get(list_users))
        .route("/show/:id", get(show_user))
        .route("/edit/:id", get(edit_user))
        .route("/:id/update", post(update_user))
        .route("/:id", delete(delete_user))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub username: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

redacted_debug!(UpdateUserRequest {
    show name,
    show email,
    show username,
    redact_option password,
});

impl From<UpdateUserRequest> for UpdateUser {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            username: request.username,
            password: request.password,
        }
    }
}

/// Empty create form
#[utoipa::path(
    get,
    path = "/create",
    context_path = "/api/v1/user",
    tag = "users",
    responses(
        (status = 200, description = "Create form", body = CreateFormResponse),
        (status = 401, description = "Not authenticated", body = crate::api::openapi::ErrorResponse),
        (status = 403, description = "Administrator role required", body = crate::api::openapi::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_form(
    State(state): State<SharedState>,
    Extension(subject): Extension<Option<Subject>>,
) -> Result<Json<CreateFormResponse>> {
    let subject = require_subject(subject)?;
    state.user_service.create_form(&subject)?;
    Ok(Json(CreateFormResponse::default()))
}

/// Create user
#[utoipa::path(
    post,
    path = "",
    context_path = "/api/v1/user",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = UserMutationResponse),
        (status = 400, description = "Validation error", body = crate::api::openapi::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::api::openapi::ErrorResponse),
        (status = 403, description = "Administrator role required", body = crate::api::openapi::ErrorResponse),
        (status = 409, description = "Username or email already taken", body = crate::api::openapi::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<SharedState>,
    Extension(subject): Extension<Option<Subject>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<UserMutationResponse>> {
    let subject = require_subject(subject)?;
    let user = state
        .user_service
        .create(
            &subject,
            CreateUser {
                name: payload.name,
                email: payload.email,
                username: payload.username,
            },
        )
        .await?;

    Ok(Json(UserMutationResponse::new(user, "saved")))
}

/// Update user
#[utoipa::path(
    post,
    path = "/{id}/update",
    context_path = "/api/v1/user",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserMutationResponse),
        (status = 400, description = "Validation error", body = crate::api::openapi::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::api::openapi::ErrorResponse),
        (status = 403, description = "Missing user:update permission", body = crate::api::openapi::ErrorResponse),
        (status = 404, description = "User not found", body = crate::api::openapi::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<SharedState>,
    Extension(subject): Extension<Option<Subject>>,
    Path(id): Path<UserId>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserMutationResponse>> {
    let subject = require_subject(subject)?;
    let user = state
        .user_service
        .update(&subject, id, payload.into())
        .await?;

    Ok(Json(UserMutationResponse::new(user, "updated")))
}

/// Delete user
#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/api/v1/user",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted", body = UserMutationResponse),
        (status = 401, description = "Not authenticated", body = crate::api::openapi::ErrorResponse),
        (status = 403, description = "Administrator role required", body = crate::api::openapi::ErrorResponse),
        (status = 404, description = "User not found", body = crate::api::openapi::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<SharedState>,
    Extension(subject): Extension<Option<Subject>>,
    Path(id): Path<UserId>,
) -> Result<Json<UserMutationResponse>> {
    let subject = require_subject(subject)?;
    let user = state.user_service.delete(&subject, id).await?;

    Ok(Json(UserMutationResponse::new(user, "deleted")))
}

/// Show user
#[utoipa::path(
    get,
    path = "/show/{id}",
    context_path = "/api/v1/user",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User details", body = UserPageResponse),
        (status = 404, description = "User not found", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn show_user(
    State(state): State<SharedState>,
    Path(id): Path<UserId>,
) -> Result<Json<UserPageResponse>> {
    let view = state.user_service.show(id).await?;
    Ok(Json(UserPageResponse::new("Show User", view)))
}

/// Edit form for a user
#[utoipa::path(
    get,
    path = "/edit/{id}",
    context_path = "/api/v1/user",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User details for editing", body = UserPageResponse),
        (status = 401, description = "Not authenticated", body = crate::api::openapi::ErrorResponse),
        (status = 403, description = "Missing user:edit permission", body = crate::api::openapi::ErrorResponse),
        (status = 404, description = "User not found", body = crate::api::openapi::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn edit_user(
    State(state): State<SharedState>,
    Extension(subject): Extension<Option<Subject>>,
    Path(id): Path<UserId>,
) -> Result<Json<UserPageResponse>> {
    let subject = require_subject(subject)?;
    let view = state.user_service.edit(&subject, id).await?;
    Ok(Json(UserPageResponse::new("Edit User", view)))
}

/// List users
#[utoipa::path(
    get,
    path = "/list",
    context_path = "/api/v1/user",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "List of users", body = UserListResponse),
        (status = 400, description = "Negative offset or max", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn list_users(
    State(state): State<SharedState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UserListResponse>> {
    let page = state
        .user_service
        .list(ListWindow {
            offset: query.offset,
            max: query.max,
        })
        .await?;

    Ok(Json(UserListResponse::new(page.users, page.total, query.page)))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create_form,
        create_user,
        update_user,
        delete_user,
        show_user,
        edit_user,
        list_users,
    ),
    components(schemas(
        CreateUserRequest,
        UpdateUserRequest,
        UserResponse,
        UserMutationResponse,
        UserPageResponse,
        CreateFormResponse,
        UserListResponse,
    ))
)]
pub struct UsersApiDoc;
