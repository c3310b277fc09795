//! Test fixtures and data factories for backend tests

#![allow(dead_code)]

use serde_json::{json, Value};

/// Test user credentials
pub struct TestUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl TestUser {
    pub fn admin() -> Self {
        Self {
            name: "Administrator".to_string(),
            username: "admin".to_string(),
            email: "admin@test.local".to_string(),
            password: "admin-password".to_string(),
        }
    }

    pub fn with_name(name: &str) -> Self {
        Self {
            name: format!("{} tester", name),
            username: name.to_string(),
            email: format!("{}@test.local", name),
            password: "changeme".to_string(),
        }
    }

    /// Body for `POST /api/v1/user`
    pub fn create_body(&self) -> Value {
        json!({
            "name": self.name,
            "email": self.email,
            "username": self.username,
        })
    }
}
