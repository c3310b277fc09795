//! PostgreSQL store backed by sqlx.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;

use super::{RoleStore, UserStore};
use crate::error::{AppError, Result};
use crate::models::permission::{Capability, UserAction};
use crate::models::role::Role;
use crate::models::user::{NewUser, User, UserChanges, UserId};

const USER_COLUMNS: &str = "id, name, email, username, password_hash, created_at, updated_at";

/// PostgreSQL implementation of [`UserStore`] and [`RoleStore`]
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn db_error(e: sqlx::Error) -> AppError {
    AppError::Persistence(e.to_string())
}

/// Map unique violations on insert/update to `Conflict`.
fn write_error(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            return if constraint.contains("username") {
                AppError::Conflict("Username already exists".to_string())
            } else if constraint.contains("email") {
                AppError::Conflict("Email already exists".to_string())
            } else {
                AppError::Conflict("User already exists".to_string())
            };
        }
    }
    db_error(e)
}

#[async_trait]
impl UserStore for PgStore {
    async fn save(&self, user: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (name, email, username, password_hash) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .fetch_one(&self.db)
            .await
            .map_err(write_error)
    }

    async fn update(&self, id: UserId, changes: &UserChanges) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                username = COALESCE($4, username),
                password_hash = COALESCE($5, password_hash),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.username)
        .bind(&changes.password_hash)
        .execute(&self.db)
        .await
        .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<User> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(db_error)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.db)
            .await
            .map_err(db_error)
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.db)
            .await
            .map_err(db_error)
    }

    async fn find_all_paged(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await
            .map_err(db_error)
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await
            .map_err(db_error)
    }

    async fn delete(&self, id: UserId) -> Result<()> {
        // user_roles and user_permissions rows go with ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn get_user_roles(&self, id: UserId) -> Result<BTreeSet<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await
        .map_err(db_error)?;

        Ok(names.into_iter().collect())
    }

    async fn get_user_permissions(&self, id: UserId) -> Result<BTreeSet<Capability>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT action, resource_id FROM user_permissions WHERE user_id = $1",
        )
        .bind(id)
        .fetch_all(&self.db)
        .await
        .map_err(db_error)?;

        let mut permissions = BTreeSet::new();
        for (action, resource_id) in rows {
            match UserAction::from_tag(&action) {
                Some(action) => {
                    permissions.insert(Capability::new(action, resource_id));
                }
                None => {
                    tracing::warn!(user_id = id, action = %action, "Ignoring unknown permission action");
                }
            }
        }
        Ok(permissions)
    }

    async fn save_user_role(&self, user_id: UserId, role_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.db)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn save_user_permission(&self, user_id: UserId, capability: &Capability) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_permissions (user_id, action, resource_id)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(capability.action.tag())
        .bind(capability.resource_id)
        .execute(&self.db)
        .await
        .map_err(db_error)?;

        Ok(())
    }
}

#[async_trait]
impl RoleStore for PgStore {
    async fn find_by_name(&self, name: &str) -> Result<Role> {
        sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.db)
            .await
            .map_err(db_error)?
            .ok_or_else(|| AppError::NotFound(format!("Role {} not found", name)))
    }
}
