//! Base repository trait for owner-scoped database operations.

use std::collections::HashMap;

use crate::db::errors::Result;
use crate::types::UserId;

/// Base repository trait for resources owned by a single user.
///
/// A repository is a data access layer for a postgres table. Every operation
/// takes the owner's id and scopes its queries to rows where the owner column
/// matches, so a caller can never observe or mutate another user's rows: a
/// cross-owner id behaves exactly like a nonexistent one.
///
/// The trait has separate associated types for create, partial-update, and
/// full-replace requests, matching the three write operations the API exposes.
#[async_trait::async_trait]
pub trait OwnedRepository {
    /// The request type for creating entities
    type CreateRequest;

    /// The request type for partial updates
    type UpdateRequest;

    /// The request type for full replacement
    type ReplaceRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: std::hash::Hash + Eq + Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Create a new entity owned by `owner`
    async fn create(&mut self, owner: UserId, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID, if it exists and is owned by `owner`
    async fn get_by_id(&mut self, owner: UserId, id: Self::Id) -> Result<Option<Self::Response>>;

    /// Get lots of entities by their IDs, keyed by ID. IDs not owned by
    /// `owner` are silently absent from the result.
    async fn get_bulk(&mut self, owner: UserId, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>>;

    /// List `owner`'s entities matching the filter, in insertion order
    async fn list(&mut self, owner: UserId, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Partially update an entity: only supplied fields change
    async fn update(&mut self, owner: UserId, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;

    /// Replace every editable field and the association set wholesale
    async fn replace(&mut self, owner: UserId, id: Self::Id, request: &Self::ReplaceRequest) -> Result<Self::Response>;

    /// Delete an entity and its association rows
    async fn delete(&mut self, owner: UserId, id: Self::Id) -> Result<bool>;
}
