//! API models for the authenticated user.

use crate::types::UserId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The caller identity resolved from a bearer token. Injected into handlers
/// by the extractor in [`crate::auth::current_user`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
}
