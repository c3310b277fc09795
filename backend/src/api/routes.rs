//! Route definitions for the API.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Json, Router};

use super::handlers;
use super::middleware::auth::{auth_middleware, optional_auth_middleware};
use super::middleware::tracing::request_id_middleware;
use super::SharedState;

/// Request bodies are small JSON documents.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    // Build OpenAPI spec once at startup
    let openapi = Arc::new(super::openapi::build_openapi());

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route(
            "/api/v1/openapi.json",
            get(move || {
                let openapi = openapi.clone();
                async move { Json(openapi.as_ref().clone()) }
            }),
        )
        .nest("/api/v1", api_v1_routes(state.clone()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// API v1 routes
fn api_v1_routes(state: SharedState) -> Router<SharedState> {
    Router::new()
        .nest("/auth", handlers::auth::public_router())
        .nest(
            "/auth",
            handlers::auth::protected_router()
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Show and list are open to anonymous callers; handlers check the rest
        .nest(
            "/user",
            handlers::users::router().layer(middleware::from_fn_with_state(
                state,
                optional_auth_middleware,
            )),
        )
}
