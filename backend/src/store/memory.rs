//! In-memory store used by tests and local experiments.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{RoleStore, UserStore};
use crate::error::{AppError, Result};
use crate::models::permission::Capability;
use crate::models::role::{Role, ADMIN_ROLE, CUSTOMER_ROLE};
use crate::models::user::{NewUser, User, UserChanges, UserId};

#[derive(Default)]
struct Tables {
    next_id: UserId,
    users: BTreeMap<UserId, User>,
    roles: Vec<Role>,
    user_roles: BTreeSet<(UserId, i64)>,
    user_permissions: BTreeSet<(UserId, Capability)>,
}

impl Tables {
    fn check_unique(&self, id: Option<UserId>, username: &str, email: &str) -> Result<()> {
        for user in self.users.values().filter(|u| Some(u.id) != id) {
            if user.username == username {
                return Err(AppError::Conflict("Username already exists".to_string()));
            }
            if user.email == email {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }
        Ok(())
    }
}

/// Store keeping users, roles and grants in process memory
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store seeded with the ADMIN and CUSTOMER roles; ids start at 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Like [`MemoryStore::new`] but the first saved user gets `first_id`.
    pub fn starting_at(first_id: UserId) -> Self {
        let tables = Tables {
            next_id: first_id,
            roles: vec![
                Role {
                    id: 1,
                    name: ADMIN_ROLE.to_string(),
                },
                Role {
                    id: 2,
                    name: CUSTOMER_ROLE.to_string(),
                },
            ],
            ..Default::default()
        };
        Self {
            tables: RwLock::new(tables),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn save(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        tables.check_unique(None, &user.username, &user.email)?;

        let id = tables.next_id;
        tables.next_id += 1;
        let now = Utc::now();
        let stored = User {
            id,
            name: user.name,
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: UserId, changes: &UserChanges) -> Result<()> {
        let mut tables = self.tables.write().await;
        let mut user = tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        changes.apply_to(&mut user);
        tables.check_unique(Some(id), &user.username, &user.email)?;
        user.updated_at = Utc::now();
        tables.users.insert(id, user);
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<User> {
        self.tables
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn find_all_paged(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.tables.read().await.users.len() as i64)
    }

    async fn delete(&self, id: UserId) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        tables.user_roles.retain(|(user_id, _)| *user_id != id);
        tables.user_permissions.retain(|(user_id, _)| *user_id != id);
        Ok(())
    }

    async fn get_user_roles(&self, id: UserId) -> Result<BTreeSet<String>> {
        let tables = self.tables.read().await;
        Ok(tables
            .user_roles
            .iter()
            .filter(|(user_id, _)| *user_id == id)
            .filter_map(|(_, role_id)| tables.roles.iter().find(|r| r.id == *role_id))
            .map(|r| r.name.clone())
            .collect())
    }

    async fn get_user_permissions(&self, id: UserId) -> Result<BTreeSet<Capability>> {
        Ok(self
            .tables
            .read()
            .await
            .user_permissions
            .iter()
            .filter(|(user_id, _)| *user_id == id)
            .map(|(_, capability)| *capability)
            .collect())
    }

    async fn save_user_role(&self, user_id: UserId, role_id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        if !tables.roles.iter().any(|r| r.id == role_id) {
            return Err(AppError::NotFound("Role not found".to_string()));
        }
        tables.user_roles.insert((user_id, role_id));
        Ok(())
    }

    async fn save_user_permission(&self, user_id: UserId, capability: &Capability) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        tables.user_permissions.insert((user_id, *capability));
        Ok(())
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Role> {
        self.tables
            .read()
            .await
            .roles
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Role {} not found", name)))
    }
}
