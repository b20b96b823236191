//! API request and response data models.
//!
//! These models define the public API contract and are distinct from the
//! database models, allowing independent evolution of API and storage
//! representations. Each resource has three views: a flat summary for list
//! results, an id-based write representation for create/update, and a detail
//! representation with nested summaries of the related resource.

pub mod auth;
pub mod navers;
pub mod projects;
pub mod users;
