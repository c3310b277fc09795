//! Common test utilities for backend handler tests
//!
//! Builds the full router over the in-memory store and drives it with
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

pub mod fixtures;

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use account_keeper_backend::api::{routes::create_router, AppState, SharedState};
use account_keeper_backend::config::Config;
use account_keeper_backend::error::{AppError, Result};
use account_keeper_backend::models::permission::Capability;
use account_keeper_backend::models::role::Role;
use account_keeper_backend::models::user::{NewUser, User, UserChanges, UserId};
use account_keeper_backend::services::user_service::CreateUser;
use account_keeper_backend::store::memory::MemoryStore;
use account_keeper_backend::store::{RoleStore, UserStore};

use fixtures::TestUser;

/// Configuration suitable for tests: fast bcrypt, fixed secret.
pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://unused/test".to_string()),
        "JWT_SECRET" => Some("integration-test-secret".to_string()),
        "BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .expect("test config")
}

/// Router plus the state behind it
pub struct TestApp {
    pub state: SharedState,
    pub router: Router,
}

/// Status, headers and JSON body of one response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn starting_at(first_id: UserId) -> Self {
        Self::with_store(Arc::new(MemoryStore::starting_at(first_id)))
    }

    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: UserStore + RoleStore + 'static,
    {
        let state = Arc::new(
            AppState::new(test_config(), store.clone(), store).expect("app state"),
        );
        let router = create_router(state.clone());
        Self { state, router }
    }

    /// Provision the administrator and return it with an access token.
    pub async fn admin(&self) -> (User, String) {
        let admin = TestUser::admin();
        let user = match self
            .state
            .user_service
            .provision_admin(&admin.username, &admin.email, &admin.password)
            .await
            .expect("provision admin")
        {
            Some(user) => user,
            None => self
                .state
                .users
                .find_by_username(&admin.username)
                .await
                .expect("lookup admin")
                .expect("admin exists"),
        };
        let token = self.token_for(&user);
        (user, token)
    }

    /// Create a customer through the service and return it with a token.
    pub async fn customer(&self, username: &str) -> (User, String) {
        let (admin, _) = self.admin().await;
        let admin_subject = self
            .state
            .user_service
            .load_subject(admin.id)
            .await
            .expect("admin subject");
        let fixture = TestUser::with_name(username);
        let user = self
            .state
            .user_service
            .create(
                &admin_subject,
                CreateUser {
                    name: fixture.name,
                    email: fixture.email,
                    username: fixture.username,
                },
            )
            .await
            .expect("create customer");
        let token = self.token_for(&user);
        (user, token)
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state
            .auth_service
            .generate_tokens(user)
            .expect("tokens")
            .access_token
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::DELETE, uri, token, None).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// A store whose every call fails with a persistence error.
pub struct FailingStore;

fn unavailable<T>() -> Result<T> {
    Err(AppError::Persistence("connection refused".to_string()))
}

#[async_trait]
impl UserStore for FailingStore {
    async fn save(&self, _user: NewUser) -> Result<User> {
        unavailable()
    }
    async fn update(&self, _id: UserId, _changes: &UserChanges) -> Result<()> {
        unavailable()
    }
    async fn find_by_id(&self, _id: UserId) -> Result<User> {
        unavailable()
    }
    async fn find_by_username(&self, _username: &str) -> Result<Option<User>> {
        unavailable()
    }
    async fn find_all(&self) -> Result<Vec<User>> {
        unavailable()
    }
    async fn find_all_paged(&self, _limit: i64, _offset: i64) -> Result<Vec<User>> {
        unavailable()
    }
    async fn count(&self) -> Result<i64> {
        unavailable()
    }
    async fn delete(&self, _id: UserId) -> Result<()> {
        unavailable()
    }
    async fn get_user_roles(&self, _id: UserId) -> Result<BTreeSet<String>> {
        unavailable()
    }
    async fn get_user_permissions(&self, _id: UserId) -> Result<BTreeSet<Capability>> {
        unavailable()
    }
    async fn save_user_role(&self, _user_id: UserId, _role_id: i64) -> Result<()> {
        unavailable()
    }
    async fn save_user_permission(&self, _user_id: UserId, _capability: &Capability) -> Result<()> {
        unavailable()
    }
}

#[async_trait]
impl RoleStore for FailingStore {
    async fn find_by_name(&self, _name: &str) -> Result<Role> {
        unavailable()
    }
}
