//! API request/response models for projects.

use crate::api::models::navers::NaverResponse;
use crate::db::models::projects::ProjectDBResponse;
use crate::types::{NaverId, ProjectId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Request body for creating a project. The owner is always the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectCreate {
    #[schema(example = "New Website Prototype")]
    pub name: String,
    /// Navers to associate at creation time, by id
    #[schema(value_type = Option<Vec<String>>)]
    pub navers: Option<Vec<NaverId>>,
}

/// Request body for a partial update (`PATCH`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub navers: Option<Vec<NaverId>>,
}

/// Request body for a full replacement (`PUT`); omitting `navers` clears all
/// associations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectReplace {
    pub name: String,
    #[schema(value_type = Option<Vec<String>>)]
    pub navers: Option<Vec<NaverId>>,
}

/// Summary representation used in list results
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ProjectId,
    pub name: String,
}

/// Representation returned by create and update operations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectCreateResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ProjectId,
    pub name: String,
    #[schema(value_type = String, format = "uuid")]
    pub owner: UserId,
    #[schema(value_type = Vec<String>)]
    pub navers: Vec<NaverId>,
}

/// Detail representation with nested naver summaries
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectDetailResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ProjectId,
    pub name: String,
    #[schema(value_type = String, format = "uuid")]
    pub owner: UserId,
    pub navers: Vec<NaverResponse>,
}

/// Query parameters for listing projects
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListProjectsQuery {
    /// Filter by exact name
    pub name: Option<String>,
}

impl From<ProjectDBResponse> for ProjectResponse {
    fn from(db: ProjectDBResponse) -> Self {
        Self { id: db.id, name: db.name }
    }
}

impl From<ProjectDBResponse> for ProjectCreateResponse {
    fn from(db: ProjectDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            owner: db.owner_id,
            navers: db.naver_ids,
        }
    }
}

impl ProjectDetailResponse {
    /// Assemble the detail view from the base entity and the already-fetched
    /// summaries of its navers.
    pub fn new(db: ProjectDBResponse, navers: Vec<NaverResponse>) -> Self {
        Self {
            id: db.id,
            name: db.name,
            owner: db.owner_id,
            navers,
        }
    }
}
