//! API request/response models for navers.
//!
//! Each operation has its own typed schema: summary responses for lists,
//! id-based association lists for writes, and nested summaries for detail
//! reads.

use crate::api::models::projects::ProjectResponse;
use crate::db::models::navers::NaverDBResponse;
use crate::types::{NaverId, ProjectId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Request body for creating a naver. The owner is always the caller and is
/// never part of the payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NaverCreate {
    #[schema(example = "Naver 1")]
    pub name: String,
    /// ISO 8601 date (YYYY-MM-DD)
    pub birthdate: NaiveDate,
    /// ISO 8601 date (YYYY-MM-DD)
    pub admission_date: NaiveDate,
    #[schema(example = "Tech Leader")]
    pub job_role: String,
    /// Projects to associate at creation time, by id
    #[schema(value_type = Option<Vec<String>>)]
    pub projects: Option<Vec<ProjectId>>,
}

/// Request body for a partial update (`PATCH`). Only supplied fields change;
/// a supplied `projects` list replaces the association set exactly.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NaverUpdate {
    pub name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub admission_date: Option<NaiveDate>,
    pub job_role: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub projects: Option<Vec<ProjectId>>,
}

/// Request body for a full replacement (`PUT`). Every editable field is
/// overwritten; omitting `projects` clears all associations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NaverReplace {
    pub name: String,
    pub birthdate: NaiveDate,
    pub admission_date: NaiveDate,
    pub job_role: String,
    #[schema(value_type = Option<Vec<String>>)]
    pub projects: Option<Vec<ProjectId>>,
}

/// Summary representation used in list results: flat scalar fields only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NaverResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: NaverId,
    pub name: String,
    pub birthdate: NaiveDate,
    pub admission_date: NaiveDate,
    pub job_role: String,
}

/// Representation returned by create and update operations: scalars plus the
/// resolved association ids and the server-assigned owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NaverCreateResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: NaverId,
    pub name: String,
    pub birthdate: NaiveDate,
    pub admission_date: NaiveDate,
    pub job_role: String,
    #[schema(value_type = String, format = "uuid")]
    pub owner: UserId,
    #[schema(value_type = Vec<String>)]
    pub projects: Vec<ProjectId>,
}

/// Detail representation: scalars plus nested summaries of the associated
/// projects.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NaverDetailResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: NaverId,
    pub name: String,
    pub birthdate: NaiveDate,
    pub admission_date: NaiveDate,
    pub job_role: String,
    #[schema(value_type = String, format = "uuid")]
    pub owner: UserId,
    pub projects: Vec<ProjectResponse>,
}

/// Query parameters for listing navers. All filters are exact-match equality
/// and combine with AND.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListNaversQuery {
    /// Filter by exact name
    pub name: Option<String>,
    /// Filter by exact admission date (YYYY-MM-DD)
    pub admission_date: Option<NaiveDate>,
    /// Filter by exact job role
    pub job_role: Option<String>,
}

impl From<NaverDBResponse> for NaverResponse {
    fn from(db: NaverDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            birthdate: db.birthdate,
            admission_date: db.admission_date,
            job_role: db.job_role,
        }
    }
}

impl From<NaverDBResponse> for NaverCreateResponse {
    fn from(db: NaverDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            birthdate: db.birthdate,
            admission_date: db.admission_date,
            job_role: db.job_role,
            owner: db.owner_id,
            projects: db.project_ids,
        }
    }
}

impl NaverDetailResponse {
    /// Assemble the detail view from the base entity and the already-fetched
    /// summaries of its projects.
    pub fn new(db: NaverDBResponse, projects: Vec<ProjectResponse>) -> Self {
        Self {
            id: db.id,
            name: db.name,
            birthdate: db.birthdate,
            admission_date: db.admission_date,
            job_role: db.job_role,
            owner: db.owner_id,
            projects,
        }
    }
}
