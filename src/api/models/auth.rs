//! API request/response models for registration and login.

use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating a new account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "suporte@navedex.com.br")]
    pub email: String,
    /// Plaintext password, at least 8 characters
    pub password: String,
}

/// Response for a successful registration. Never includes the password.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
}

impl From<UserDBResponse> for RegisterResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            email: db.email,
        }
    }
}

/// Request body for logging in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for a successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token to present on every protected route
    pub token: String,
}
