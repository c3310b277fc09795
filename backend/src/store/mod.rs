//! Persistence backends for users and roles.

pub mod memory;
pub mod postgres;

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::permission::Capability;
use crate::models::role::Role;
use crate::models::user::{NewUser, User, UserChanges, UserId};

/// User persistence.
///
/// Calls are single-attempt; failures surface as `AppError::Persistence`,
/// missing records as `AppError::NotFound`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user and return it with its store-assigned id
    async fn save(&self, user: NewUser) -> Result<User>;

    /// Apply field changes to an existing user
    async fn update(&self, id: UserId, changes: &UserChanges) -> Result<()>;

    async fn find_by_id(&self, id: UserId) -> Result<User>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// All users ordered by id
    async fn find_all(&self) -> Result<Vec<User>>;

    /// One window of users ordered by id
    async fn find_all_paged(&self, limit: i64, offset: i64) -> Result<Vec<User>>;

    async fn count(&self) -> Result<i64>;

    /// Delete a user together with its role and permission rows
    async fn delete(&self, id: UserId) -> Result<()>;

    /// Names of the roles attached to a user
    async fn get_user_roles(&self, id: UserId) -> Result<BTreeSet<String>>;

    /// Capabilities granted to a user
    async fn get_user_permissions(&self, id: UserId) -> Result<BTreeSet<Capability>>;

    async fn save_user_role(&self, user_id: UserId, role_id: i64) -> Result<()>;

    async fn save_user_permission(&self, user_id: UserId, capability: &Capability) -> Result<()>;
}

/// Role lookup.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Role>;
}
