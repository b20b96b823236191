//! Database repository for projects. Mirrors the navers repository on the
//! other side of the naver_projects join table.

use std::collections::HashMap;

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::OwnedRepository,
    models::projects::{ProjectCreateDBRequest, ProjectDBResponse, ProjectReplaceDBRequest, ProjectUpdateDBRequest},
};
use crate::types::{NaverId, ProjectId, UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{Connection, FromRow, PgConnection, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing projects
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub name: Option<String>,
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Project {
    pub id: ProjectId,
    pub name: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<(Vec<NaverId>, Project)> for ProjectDBResponse {
    fn from((naver_ids, project): (Vec<NaverId>, Project)) -> Self {
        Self {
            id: project.id,
            name: project.name,
            owner_id: project.owner_id,
            created_at: project.created_at,
            updated_at: project.updated_at,
            naver_ids,
        }
    }
}

pub struct Projects<'c> {
    db: &'c mut PgConnection,
}

fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[async_trait::async_trait]
impl<'c> OwnedRepository for Projects<'c> {
    type CreateRequest = ProjectCreateDBRequest;
    type UpdateRequest = ProjectUpdateDBRequest;
    type ReplaceRequest = ProjectReplaceDBRequest;
    type Response = ProjectDBResponse;
    type Id = ProjectId;
    type Filter = ProjectFilter;

    #[instrument(skip(self, request), fields(owner = %abbrev_uuid(&owner), name = %request.name), err)]
    async fn create(&mut self, owner: UserId, request: &Self::CreateRequest) -> Result<Self::Response> {
        let project_id = Uuid::new_v4();
        let naver_ids = dedup_ids(&request.naver_ids);

        let mut tx = self.db.begin().await?;

        let project: Project = sqlx::query_as(
            r#"
            INSERT INTO projects (id, name, owner_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(project_id)
        .bind(&request.name)
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        for naver_id in &naver_ids {
            sqlx::query("INSERT INTO naver_projects (naver_id, project_id) VALUES ($1, $2)")
                .bind(naver_id)
                .bind(project_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(ProjectDBResponse::from((naver_ids, project)))
    }

    #[instrument(skip(self), fields(owner = %abbrev_uuid(&owner), project_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, owner: UserId, id: Self::Id) -> Result<Option<Self::Response>> {
        let project: Option<Project> = sqlx::query_as("SELECT * FROM projects WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *self.db)
            .await?;

        match project {
            Some(project) => {
                let naver_ids = self.naver_ids_for(&[id]).await?.remove(&id).unwrap_or_default();
                Ok(Some(ProjectDBResponse::from((naver_ids, project))))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, ids), fields(owner = %abbrev_uuid(&owner), count = ids.len()), err)]
    async fn get_bulk(&mut self, owner: UserId, ids: Vec<ProjectId>) -> Result<HashMap<ProjectId, ProjectDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let projects: Vec<Project> = sqlx::query_as("SELECT * FROM projects WHERE id = ANY($1) AND owner_id = $2")
            .bind(&ids)
            .bind(owner)
            .fetch_all(&mut *self.db)
            .await?;

        let found_ids: Vec<ProjectId> = projects.iter().map(|p| p.id).collect();
        let mut associations = self.naver_ids_for(&found_ids).await?;

        let mut result = HashMap::new();
        for project in projects {
            let naver_ids = associations.remove(&project.id).unwrap_or_default();
            result.insert(project.id, ProjectDBResponse::from((naver_ids, project)));
        }

        Ok(result)
    }

    #[instrument(skip(self, filter), fields(owner = %abbrev_uuid(&owner)), err)]
    async fn list(&mut self, owner: UserId, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM projects WHERE owner_id = ");
        query.push_bind(owner);

        if let Some(ref name) = filter.name {
            query.push(" AND name = ");
            query.push_bind(name);
        }

        query.push(" ORDER BY created_at, id");

        let projects = query.build_query_as::<Project>().fetch_all(&mut *self.db).await?;

        let ids: Vec<ProjectId> = projects.iter().map(|p| p.id).collect();
        let mut associations = self.naver_ids_for(&ids).await?;

        Ok(projects
            .into_iter()
            .map(|project| {
                let naver_ids = associations.remove(&project.id).unwrap_or_default();
                ProjectDBResponse::from((naver_ids, project))
            })
            .collect())
    }

    #[instrument(skip(self, request), fields(owner = %abbrev_uuid(&owner), project_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, owner: UserId, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let project;
        {
            let mut tx = self.db.begin().await?;

            project = sqlx::query_as::<_, Project>(
                r#"
                UPDATE projects SET
                    name = COALESCE($3, name),
                    updated_at = NOW()
                WHERE id = $1 AND owner_id = $2
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(owner)
            .bind(&request.name)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound)?;

            if let Some(naver_ids) = &request.naver_ids {
                let naver_ids = dedup_ids(naver_ids);

                sqlx::query("DELETE FROM naver_projects WHERE project_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;

                for naver_id in &naver_ids {
                    sqlx::query("INSERT INTO naver_projects (naver_id, project_id) VALUES ($1, $2)")
                        .bind(naver_id)
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                }
            }

            tx.commit().await?;
        }

        let naver_ids = self.naver_ids_for(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(ProjectDBResponse::from((naver_ids, project)))
    }

    #[instrument(skip(self, request), fields(owner = %abbrev_uuid(&owner), project_id = %abbrev_uuid(&id)), err)]
    async fn replace(&mut self, owner: UserId, id: Self::Id, request: &Self::ReplaceRequest) -> Result<Self::Response> {
        let naver_ids = dedup_ids(&request.naver_ids);

        let mut tx = self.db.begin().await?;

        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects SET
                name = $3,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&request.name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        sqlx::query("DELETE FROM naver_projects WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for naver_id in &naver_ids {
            sqlx::query("INSERT INTO naver_projects (naver_id, project_id) VALUES ($1, $2)")
                .bind(naver_id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(ProjectDBResponse::from((naver_ids, project)))
    }

    #[instrument(skip(self), fields(owner = %abbrev_uuid(&owner), project_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, owner: UserId, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> Projects<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Of the given ids, return those that exist and belong to `owner`.
    #[instrument(skip(self, ids), fields(owner = %abbrev_uuid(&owner), count = ids.len()), err)]
    pub async fn filter_owned(&mut self, owner: UserId, ids: &[ProjectId]) -> Result<Vec<ProjectId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<ProjectId> = sqlx::query_scalar("SELECT id FROM projects WHERE id = ANY($1) AND owner_id = $2")
            .bind(ids.to_vec())
            .bind(owner)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(found)
    }

    async fn naver_ids_for(&mut self, project_ids: &[ProjectId]) -> Result<HashMap<ProjectId, Vec<NaverId>>> {
        if project_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(ProjectId, NaverId)> = sqlx::query_as(
            "SELECT project_id, naver_id FROM naver_projects WHERE project_id = ANY($1) ORDER BY project_id, naver_id",
        )
        .bind(project_ids.to_vec())
        .fetch_all(&mut *self.db)
        .await?;

        let mut result = HashMap::new();
        for (project_id, naver_id) in rows {
            result.entry(project_id).or_insert_with(Vec::new).push(naver_id);
        }

        Ok(result)
    }
}
