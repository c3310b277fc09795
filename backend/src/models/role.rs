//! Role model.

use serde::Serialize;
use sqlx::FromRow;

/// Administrative role: passes every access check.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Default role given to every account created through the user API.
pub const CUSTOMER_ROLE: &str = "CUSTOMER";

/// Role entity
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}
