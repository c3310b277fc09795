//! User model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Store-assigned user identifier.
pub type UserId = i64;

/// User entity
#[derive(Clone, FromRow, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

redacted_debug!(User {
    show id,
    show name,
    show email,
    show username,
    redact password_hash,
    show created_at,
    show updated_at,
});

/// A user that has not been stored yet (no id).
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

redacted_debug!(NewUser {
    show name,
    show email,
    show username,
    redact password_hash,
});

/// Field changes applied by an update; `None` keeps the stored value.
#[derive(Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

redacted_debug!(UserChanges {
    show name,
    show email,
    show username,
    redact_option password_hash,
});

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.username.is_none()
            && self.password_hash.is_none()
    }

    /// Apply the changes to an in-memory user.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(ref name) = self.name {
            user.name = name.clone();
        }
        if let Some(ref email) = self.email {
            user.email = email.clone();
        }
        if let Some(ref username) = self.username {
            user.username = username.clone();
        }
        if let Some(ref hash) = self.password_hash {
            user.password_hash = hash.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: 42,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            password_hash: "$2b$04$hashhashhash".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_user_serialization_skips_password_hash() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["username"], "ada");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_user_debug_redacts_password_hash() {
        let output = format!("{:?}", sample_user());
        assert!(output.contains("ada@example.com"));
        assert!(!output.contains("hashhashhash"));
    }

    #[test]
    fn test_changes_apply_only_provided_fields() {
        let mut user = sample_user();
        let changes = UserChanges {
            email: Some("ada@lovelace.dev".to_string()),
            ..Default::default()
        };
        changes.apply_to(&mut user);
        assert_eq!(user.email, "ada@lovelace.dev");
        assert_eq!(user.name, "Ada");
        assert_eq!(user.username, "ada");
        assert_eq!(user.id, 42);
    }

    #[test]
    fn test_changes_is_empty() {
        assert!(UserChanges::default().is_empty());
        let changes = UserChanges {
            name: Some("x".to_string()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
