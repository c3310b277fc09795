//! Authentication handlers.

use axum::{
    extract::{Extension, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::api::SharedState;
use crate::error::Result;
use crate::models::subject::Subject;
use crate::models::user::UserId;
use crate::services::auth_service::TokenPair;

/// Create public auth routes (no auth required)
pub fn public_router() -> Router<SharedState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
}

/// Create protected auth routes (auth required)
pub fn protected_router() -> Router<SharedState> {
    Router::new().route("/me", get(get_current_user))
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

redacted_debug!(LoginRequest {
    show username,
    redact password,
});

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

impl From<TokenPair> for LoginResponse {
    fn from(tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: "Bearer".to_string(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

redacted_debug!(RefreshTokenRequest {
    redact refresh_token,
});

/// The authenticated caller with its roles and permission tokens.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentUserResponse {
    pub id: UserId,
    pub username: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl From<Subject> for CurrentUserResponse {
    fn from(subject: Subject) -> Self {
        Self {
            id: subject.user_id,
            username: subject.username,
            roles: subject.roles.into_iter().collect(),
            permissions: subject.permissions.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Login with credentials
#[utoipa::path(
    post,
    path = "/login",
    context_path = "/api/v1/auth",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (_, tokens) = state
        .auth_service
        .authenticate(state.users.as_ref(), &payload.username, &payload.password)
        .await?;

    Ok(Json(tokens.into()))
}

/// Refresh access token
#[utoipa::path(
    post,
    path = "/refresh",
    context_path = "/api/v1/auth",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token refreshed", body = LoginResponse),
        (status = 401, description = "Invalid or expired refresh token", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn refresh_token(
    State(state): State<SharedState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<Json<LoginResponse>> {
    let (_, tokens) = state
        .auth_service
        .refresh_tokens(state.users.as_ref(), &payload.refresh_token)
        .await?;

    Ok(Json(tokens.into()))
}

/// Get current user info
#[utoipa::path(
    get,
    path = "/me",
    context_path = "/api/v1/auth",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = CurrentUserResponse),
        (status = 401, description = "Not authenticated", body = crate::api::openapi::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_current_user(Extension(subject): Extension<Subject>) -> Json<CurrentUserResponse> {
    Json(subject.into())
}

#[derive(OpenApi)]
#[openapi(
    paths(login, refresh_token, get_current_user),
    components(schemas(LoginRequest, LoginResponse, RefreshTokenRequest, CurrentUserResponse))
)]
pub struct AuthApiDoc;
