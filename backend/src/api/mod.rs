//! API module - HTTP handlers and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::services::auth_service::AuthService;
use crate::services::user_service::UserService;
use crate::store::{RoleStore, UserStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UserStore>,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Wire the services over the given stores.
    pub fn new(
        config: Config,
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let auth_service = Arc::new(AuthService::new(config.clone()));
        let user_service = Arc::new(UserService::new(
            users.clone(),
            roles,
            auth_service.clone(),
            &config.default_user_password,
        )?);

        Ok(Self {
            config,
            users,
            auth_service,
            user_service,
        })
    }
}

pub type SharedState = Arc<AppState>;
