//! The authenticated caller of a request.

use std::collections::BTreeSet;

use serde::Serialize;

use super::permission::Capability;
use super::user::UserId;
use crate::services::access_gate::Authenticator;

/// Roles and capabilities of the caller, loaded fresh for every request.
#[derive(Debug, Clone, Serialize)]
pub struct Subject {
    pub user_id: UserId,
    pub username: String,
    pub roles: BTreeSet<String>,
    pub permissions: BTreeSet<Capability>,
}

impl Subject {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            roles: BTreeSet::new(),
            permissions: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn with_permission(mut self, capability: Capability) -> Self {
        self.permissions.insert(capability);
        self
    }
}

impl Authenticator for Subject {
    fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    fn is_permitted(&self, capability: &Capability) -> bool {
        self.permissions.contains(capability)
    }
}
