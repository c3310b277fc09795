//! User account operations.
//!
//! Every operation that mutates a user, or exposes its edit form, consults
//! [`AccessGate`] before the first store call. A denied check returns
//! `AppError::Authorization` and leaves the store untouched.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::permission::{Capability, UserAction};
use crate::models::role::{ADMIN_ROLE, CUSTOMER_ROLE};
use crate::models::subject::Subject;
use crate::models::user::{NewUser, User, UserChanges, UserId};
use crate::services::access_gate::AccessGate;
use crate::services::auth_service::AuthService;
use crate::store::{RoleStore, UserStore};

/// Page size used when a list request gives an offset but no max.
pub const RESULTS_PER_PAGE: i64 = 10;

/// Minimum length of a password set through an update.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Fields accepted when creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub username: String,
}

/// Fields accepted when updating a user; `None` leaves the value unchanged
#[derive(Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

redacted_debug!(UpdateUser {
    show name,
    show email,
    show username,
    redact_option password,
});

/// A user together with the roles and capabilities attached for display
#[derive(Debug, Clone)]
pub struct UserView {
    pub user: User,
    pub roles: BTreeSet<String>,
    pub permissions: BTreeSet<Capability>,
}

/// Optional window for list requests
#[derive(Debug, Clone, Copy, Default)]
pub struct ListWindow {
    pub offset: Option<i64>,
    pub max: Option<i64>,
}

impl ListWindow {
    /// `(limit, offset)` when a window was requested, `None` for the full list.
    pub fn limit_offset(&self) -> Option<(i64, i64)> {
        self.offset
            .map(|offset| (self.max.unwrap_or(RESULTS_PER_PAGE), offset))
    }
}

/// One page of users plus the overall count
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
}

/// User account service
pub struct UserService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    auth: Arc<AuthService>,
    default_password_hash: String,
}

impl UserService {
    /// Create the service; the default password is hashed once here.
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        auth: Arc<AuthService>,
        default_password: &str,
    ) -> Result<Self> {
        let default_password_hash = auth.hash_password(default_password)?;
        Ok(Self {
            users,
            roles,
            auth,
            default_password_hash,
        })
    }

    /// Load the request subject: the user, its roles and its capabilities.
    pub async fn load_subject(&self, user_id: UserId) -> Result<Subject> {
        let user = self.users.find_by_id(user_id).await?;
        let roles = self.users.get_user_roles(user_id).await?;
        let permissions = self.users.get_user_permissions(user_id).await?;
        Ok(Subject {
            user_id: user.id,
            username: user.username,
            roles,
            permissions,
        })
    }

    /// Create the bootstrap administrator unless a user with that name exists.
    ///
    /// Returns the new account, or `None` when nothing was provisioned.
    pub async fn provision_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<User>> {
        if self.users.find_by_username(username).await?.is_some() {
            tracing::debug!(username, "Administrator already present");
            return Ok(None);
        }

        let admin_role = self.roles.find_by_name(ADMIN_ROLE).await?;
        let user = self
            .users
            .save(NewUser {
                name: username.to_string(),
                email: email.to_string(),
                username: username.to_string(),
                password_hash: self.auth.hash_password(password)?,
            })
            .await?;
        self.users.save_user_role(user.id, admin_role.id).await?;

        tracing::info!(user_id = user.id, username, "Provisioned administrator");
        Ok(Some(user))
    }

    /// Check that the subject may open the create form.
    pub fn create_form(&self, subject: &Subject) -> Result<()> {
        AccessGate::require_admin(subject)
    }

    /// Create a user with the default role and its owner capabilities.
    pub async fn create(&self, subject: &Subject, request: CreateUser) -> Result<User> {
        AccessGate::require_admin(subject)?;
        let request = validate_create(request)?;

        // Resolve the default role first so a missing role leaves no orphan user
        let default_role = self.roles.find_by_name(CUSTOMER_ROLE).await?;

        let user = self
            .users
            .save(NewUser {
                name: request.name,
                email: request.email,
                username: request.username,
                password_hash: self.default_password_hash.clone(),
            })
            .await?;

        if let Err(e) = self.grant_defaults(user.id, default_role.id).await {
            tracing::error!(
                user_id = user.id,
                username = %user.username,
                error = %e,
                "User saved without its role or permissions"
            );
            return Err(e);
        }

        tracing::info!(
            user_id = user.id,
            username = %user.username,
            actor = %subject.username,
            "User created"
        );
        Ok(user)
    }

    /// Update a user the subject holds `user:update` on.
    pub async fn update(&self, subject: &Subject, id: UserId, request: UpdateUser) -> Result<User> {
        AccessGate::require_user_action(subject, UserAction::Update, id)?;
        let changes = self.validate_update(request)?;

        self.users.update(id, &changes).await?;
        let user = self.users.find_by_id(id).await?;

        tracing::info!(user_id = id, actor = %subject.username, "User updated");
        Ok(user)
    }

    /// Delete a user; administrators only.
    pub async fn delete(&self, subject: &Subject, id: UserId) -> Result<User> {
        AccessGate::require_admin(subject)?;

        let user = self.users.find_by_id(id).await?;
        self.users.delete(user.id).await?;

        tracing::info!(user_id = id, actor = %subject.username, "User deleted");
        Ok(user)
    }

    /// Read a user with its roles and capabilities. Not gated.
    pub async fn show(&self, id: UserId) -> Result<UserView> {
        self.view(id).await
    }

    /// Read a user for its edit form; requires `user:edit`.
    pub async fn edit(&self, subject: &Subject, id: UserId) -> Result<UserView> {
        AccessGate::require_user_action(subject, UserAction::Edit, id)?;
        self.view(id).await
    }

    /// List users, windowed when an offset is given.
    pub async fn list(&self, window: ListWindow) -> Result<UserPage> {
        let users = match window.limit_offset() {
            Some((limit, offset)) => {
                if limit < 0 || offset < 0 {
                    return Err(AppError::Validation(
                        "offset and max must not be negative".to_string(),
                    ));
                }
                self.users.find_all_paged(limit, offset).await?
            }
            None => self.users.find_all().await?,
        };
        let total = self.users.count().await?;

        Ok(UserPage { users, total })
    }

    async fn grant_defaults(&self, user_id: UserId, role_id: i64) -> Result<()> {
        self.users.save_user_role(user_id, role_id).await?;
        for capability in Capability::owner_grants(user_id) {
            self.users.save_user_permission(user_id, &capability).await?;
        }
        Ok(())
    }

    async fn view(&self, id: UserId) -> Result<UserView> {
        let user = self.users.find_by_id(id).await?;
        let roles = self.users.get_user_roles(user.id).await?;
        let permissions = self.users.get_user_permissions(user.id).await?;
        Ok(UserView {
            user,
            roles,
            permissions,
        })
    }

    fn validate_update(&self, request: UpdateUser) -> Result<UserChanges> {
        if let Some(ref username) = request.username {
            validate_username(username)?;
        }
        if let Some(ref email) = request.email {
            validate_email(email)?;
        }
        let password_hash = match request.password {
            Some(ref p) if p.len() >= MIN_PASSWORD_LENGTH => Some(self.auth.hash_password(p)?),
            Some(_) => {
                return Err(AppError::Validation(format!(
                    "Password must be at least {} characters",
                    MIN_PASSWORD_LENGTH
                )));
            }
            None => None,
        };

        let changes = UserChanges {
            name: request.name.map(|n| n.trim().to_string()),
            email: request.email.map(|e| e.trim().to_string()),
            username: request.username.map(|u| u.trim().to_string()),
            password_hash,
        };
        if changes.is_empty() {
            return Err(AppError::Validation("Nothing to update".to_string()));
        }
        Ok(changes)
    }
}

fn validate_create(request: CreateUser) -> Result<CreateUser> {
    validate_username(&request.username)?;
    validate_email(&request.email)?;
    Ok(CreateUser {
        name: request.name.trim().to_string(),
        email: request.email.trim().to_string(),
        username: request.username.trim().to_string(),
    })
}

fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AppError::Validation(format!("Invalid email: {}", email))),
    }
}
