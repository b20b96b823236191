//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection or transaction, provides
//! strongly-typed CRUD operations, and returns domain models from
//! [`crate::db::models`]. The owned resources (navers, projects) implement
//! [`OwnedRepository`], which scopes every query to the owning user.

pub mod navers;
pub mod projects;
pub mod repository;
pub mod users;

pub use navers::Navers;
pub use projects::Projects;
pub use repository::OwnedRepository;
pub use users::Users;
