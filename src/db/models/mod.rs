//! Database record structures matching table schemas.

pub mod navers;
pub mod projects;
pub mod users;
