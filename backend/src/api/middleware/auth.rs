//! Authentication middleware.
//!
//! Validates `Authorization: Bearer <jwt>` access tokens and loads the
//! [`Subject`] (user, roles, capabilities) from the store for every request.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::subject::Subject;

/// Token extraction result
#[derive(Debug, PartialEq)]
enum ExtractedToken<'a> {
    Bearer(&'a str),
    None,
    Invalid,
}

fn extract_token(request: &Request) -> ExtractedToken<'_> {
    match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(header) => parse_authorization(header),
        None => ExtractedToken::None,
    }
}

fn parse_authorization(header: &str) -> ExtractedToken<'_> {
    match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => ExtractedToken::Bearer(token.trim()),
        _ => ExtractedToken::Invalid,
    }
}

/// Resolve a bearer token into the subject it belongs to.
async fn resolve_subject(state: &SharedState, token: &str) -> Result<Subject> {
    let claims = state.auth_service.validate_access_token(token)?;
    state
        .user_service
        .load_subject(claims.sub)
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => AppError::Authentication("User no longer exists".to_string()),
            other => other,
        })
}

/// Authentication middleware - requires a valid token
pub async fn auth_middleware(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    let subject = match extract_token(&request) {
        ExtractedToken::Bearer(token) => resolve_subject(&state, token).await,
        ExtractedToken::None => Err(AppError::Authentication(
            "Missing authorization header".to_string(),
        )),
        ExtractedToken::Invalid => Err(AppError::Authentication(
            "Invalid authorization header format".to_string(),
        )),
    };

    match subject {
        Ok(subject) => {
            request.extensions_mut().insert(subject);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Optional authentication middleware - lets anonymous requests through.
///
/// Inserts `Option<Subject>`; a bad or stale token is treated as anonymous,
/// a store failure is not.
pub async fn optional_auth_middleware(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Response {
    let subject = match extract_token(&request) {
        ExtractedToken::Bearer(token) => match resolve_subject(&state, token).await {
            Ok(subject) => Some(subject),
            Err(AppError::Authentication(reason)) => {
                tracing::debug!(%reason, "Ignoring unusable bearer token");
                None
            }
            Err(e) => return e.into_response(),
        },
        ExtractedToken::None | ExtractedToken::Invalid => None,
    };

    request.extensions_mut().insert(subject);
    next.run(request).await
}

/// The subject of a request that passed through [`optional_auth_middleware`],
/// or `Authentication` for anonymous callers.
pub fn require_subject(subject: Option<Subject>) -> Result<Subject> {
    subject.ok_or_else(|| AppError::Authentication("Authentication required".to_string()))
}
