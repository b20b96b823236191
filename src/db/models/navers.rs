//! Database models for navers.

use crate::api::models::navers::{NaverCreate, NaverReplace, NaverUpdate};
use crate::types::{NaverId, ProjectId, UserId};
use chrono::{DateTime, NaiveDate, Utc};

/// Database request for creating a new naver
#[derive(Debug, Clone)]
pub struct NaverCreateDBRequest {
    pub name: String,
    pub birthdate: NaiveDate,
    pub admission_date: NaiveDate,
    pub job_role: String,
    pub project_ids: Vec<ProjectId>,
}

impl From<NaverCreate> for NaverCreateDBRequest {
    fn from(api: NaverCreate) -> Self {
        Self {
            name: api.name,
            birthdate: api.birthdate,
            admission_date: api.admission_date,
            job_role: api.job_role,
            project_ids: api.projects.unwrap_or_default(),
        }
    }
}

/// Database request for a partial update. `None` fields are left untouched;
/// a `Some` project list replaces the association set wholesale.
#[derive(Debug, Clone)]
pub struct NaverUpdateDBRequest {
    pub name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub admission_date: Option<NaiveDate>,
    pub job_role: Option<String>,
    pub project_ids: Option<Vec<ProjectId>>,
}

impl From<NaverUpdate> for NaverUpdateDBRequest {
    fn from(api: NaverUpdate) -> Self {
        Self {
            name: api.name,
            birthdate: api.birthdate,
            admission_date: api.admission_date,
            job_role: api.job_role,
            project_ids: api.projects,
        }
    }
}

/// Database request for a full replacement. Every scalar is overwritten and
/// the association set becomes exactly `project_ids` (empty clears it).
#[derive(Debug, Clone)]
pub struct NaverReplaceDBRequest {
    pub name: String,
    pub birthdate: NaiveDate,
    pub admission_date: NaiveDate,
    pub job_role: String,
    pub project_ids: Vec<ProjectId>,
}

impl From<NaverReplace> for NaverReplaceDBRequest {
    fn from(api: NaverReplace) -> Self {
        Self {
            name: api.name,
            birthdate: api.birthdate,
            admission_date: api.admission_date,
            job_role: api.job_role,
            project_ids: api.projects.unwrap_or_default(),
        }
    }
}

/// Database response for a naver, including its association ids
#[derive(Debug, Clone)]
pub struct NaverDBResponse {
    pub id: NaverId,
    pub name: String,
    pub birthdate: NaiveDate,
    pub admission_date: NaiveDate,
    pub job_role: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub project_ids: Vec<ProjectId>,
}
