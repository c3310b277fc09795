//! Business logic services.

pub mod access_gate;
pub mod auth_service;
pub mod user_service;
