//! Database models for projects.

use crate::api::models::projects::{ProjectCreate, ProjectReplace, ProjectUpdate};
use crate::types::{NaverId, ProjectId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new project
#[derive(Debug, Clone)]
pub struct ProjectCreateDBRequest {
    pub name: String,
    pub naver_ids: Vec<NaverId>,
}

impl From<ProjectCreate> for ProjectCreateDBRequest {
    fn from(api: ProjectCreate) -> Self {
        Self {
            name: api.name,
            naver_ids: api.navers.unwrap_or_default(),
        }
    }
}

/// Database request for a partial update. `None` fields are left untouched;
/// a `Some` naver list replaces the association set wholesale.
#[derive(Debug, Clone)]
pub struct ProjectUpdateDBRequest {
    pub name: Option<String>,
    pub naver_ids: Option<Vec<NaverId>>,
}

impl From<ProjectUpdate> for ProjectUpdateDBRequest {
    fn from(api: ProjectUpdate) -> Self {
        Self {
            name: api.name,
            naver_ids: api.navers,
        }
    }
}

/// Database request for a full replacement. The association set becomes
/// exactly `naver_ids` (empty clears it).
#[derive(Debug, Clone)]
pub struct ProjectReplaceDBRequest {
    pub name: String,
    pub naver_ids: Vec<NaverId>,
}

impl From<ProjectReplace> for ProjectReplaceDBRequest {
    fn from(api: ProjectReplace) -> Self {
        Self {
            name: api.name,
            naver_ids: api.navers.unwrap_or_default(),
        }
    }
}

/// Database response for a project, including its association ids
#[derive(Debug, Clone)]
pub struct ProjectDBResponse {
    pub id: ProjectId,
    pub name: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub naver_ids: Vec<NaverId>,
}
