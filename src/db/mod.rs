//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL.
//! It follows the Repository pattern to provide clean abstractions over
//! database operations.
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! # Transactions
//!
//! Repositories work with SQLx transactions to ensure ACID properties. Any
//! repository operation that touches both a resource row and its association
//! rows (create with associations, update, replace) runs inside a single
//! transaction, so a partial failure leaves neither the old nor a half-written
//! association set.

pub mod errors;
pub mod handlers;
pub mod models;
