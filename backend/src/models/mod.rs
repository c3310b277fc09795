//! Domain and database models.

pub mod permission;
pub mod role;
pub mod subject;
pub mod user;
