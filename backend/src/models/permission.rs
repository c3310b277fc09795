//! Capability model: a grant to perform one action on one user record.
//!
//! The token form is `<action>:<resource id>`, e.g. `user:update:42`. Tokens
//! are only ever produced from a [`Capability`] and parsed back through
//! [`Capability::from_str`], which accepts the known action tags and a
//! decimal id and nothing else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::user::UserId;
use crate::error::AppError;

/// Actions that can be granted on a user record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserAction {
    Edit,
    Update,
}

impl UserAction {
    pub const ALL: [UserAction; 2] = [UserAction::Edit, UserAction::Update];

    /// Action tag as stored and rendered (`user:edit`, `user:update`).
    pub fn tag(&self) -> &'static str {
        match self {
            UserAction::Edit => "user:edit",
            UserAction::Update => "user:update",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.tag() == tag)
    }
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Permission to perform `action` on the user identified by `resource_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Capability {
    pub action: UserAction,
    pub resource_id: UserId,
}

impl Capability {
    pub fn new(action: UserAction, resource_id: UserId) -> Self {
        Self {
            action,
            resource_id,
        }
    }

    /// The capabilities every account holds over its own record.
    pub fn owner_grants(user_id: UserId) -> [Capability; 2] {
        [
            Capability::new(UserAction::Edit, user_id),
            Capability::new(UserAction::Update, user_id),
        ]
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.action.tag(), self.resource_id)
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::Validation(format!("Invalid permission token: {}", token));

        let (tag, id) = token.rsplit_once(':').ok_or_else(invalid)?;
        let action = UserAction::from_tag(tag).ok_or_else(invalid)?;
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let resource_id = id.parse().map_err(|_| invalid())?;

        Ok(Capability::new(action, resource_id))
    }
}

impl Serialize for Capability {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}
