//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//! - **[`extract`]**: Shared request extractors
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`; the
//! generated document is served at `/api-docs/openapi.json`.

pub mod extract;
pub mod handlers;
pub mod models;
