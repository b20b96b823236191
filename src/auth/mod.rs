//! Authentication for the directory API.
//!
//! Users register and log in with email/password; a successful login returns
//! an opaque bearer token (a signed JWT) that every resource endpoint
//! requires via `Authorization: Bearer <token>`.
//!
//! # Modules
//!
//! - [`current_user`]: Extractor for the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: Bearer token creation and verification

pub mod current_user;
pub mod password;
pub mod session;
