//! Database repository for navers and their project associations.

use std::collections::HashMap;

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::OwnedRepository,
    models::navers::{NaverCreateDBRequest, NaverDBResponse, NaverReplaceDBRequest, NaverUpdateDBRequest},
};
use crate::types::{NaverId, ProjectId, UserId, abbrev_uuid};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Connection, FromRow, PgConnection, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing navers. All filters are exact-match equality and
/// combine with AND; `None` fields are ignored.
#[derive(Debug, Clone, Default)]
pub struct NaverFilter {
    pub name: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub job_role: Option<String>,
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Naver {
    pub id: NaverId,
    pub name: String,
    pub birthdate: NaiveDate,
    pub admission_date: NaiveDate,
    pub job_role: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<(Vec<ProjectId>, Naver)> for NaverDBResponse {
    fn from((project_ids, naver): (Vec<ProjectId>, Naver)) -> Self {
        Self {
            id: naver.id,
            name: naver.name,
            birthdate: naver.birthdate,
            admission_date: naver.admission_date,
            job_role: naver.job_role,
            owner_id: naver.owner_id,
            created_at: naver.created_at,
            updated_at: naver.updated_at,
            project_ids,
        }
    }
}

pub struct Navers<'c> {
    db: &'c mut PgConnection,
}

/// Drop duplicate ids while preserving first-seen order, so a repeated id in
/// a request body cannot trip the join table's primary key.
fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[async_trait::async_trait]
impl<'c> OwnedRepository for Navers<'c> {
    type CreateRequest = NaverCreateDBRequest;
    type UpdateRequest = NaverUpdateDBRequest;
    type ReplaceRequest = NaverReplaceDBRequest;
    type Response = NaverDBResponse;
    type Id = NaverId;
    type Filter = NaverFilter;

    #[instrument(skip(self, request), fields(owner = %abbrev_uuid(&owner), name = %request.name), err)]
    async fn create(&mut self, owner: UserId, request: &Self::CreateRequest) -> Result<Self::Response> {
        let naver_id = Uuid::new_v4();
        let project_ids = dedup_ids(&request.project_ids);

        let mut tx = self.db.begin().await?;

        let naver: Naver = sqlx::query_as(
            r#"
            INSERT INTO navers (id, name, birthdate, admission_date, job_role, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(naver_id)
        .bind(&request.name)
        .bind(request.birthdate)
        .bind(request.admission_date)
        .bind(&request.job_role)
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        for project_id in &project_ids {
            sqlx::query("INSERT INTO naver_projects (naver_id, project_id) VALUES ($1, $2)")
                .bind(naver_id)
                .bind(project_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(NaverDBResponse::from((project_ids, naver)))
    }

    #[instrument(skip(self), fields(owner = %abbrev_uuid(&owner), naver_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, owner: UserId, id: Self::Id) -> Result<Option<Self::Response>> {
        let naver: Option<Naver> = sqlx::query_as("SELECT * FROM navers WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *self.db)
            .await?;

        match naver {
            Some(naver) => {
                let project_ids = self.project_ids_for(&[id]).await?.remove(&id).unwrap_or_default();
                Ok(Some(NaverDBResponse::from((project_ids, naver))))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, ids), fields(owner = %abbrev_uuid(&owner), count = ids.len()), err)]
    async fn get_bulk(&mut self, owner: UserId, ids: Vec<NaverId>) -> Result<HashMap<NaverId, NaverDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let navers: Vec<Naver> = sqlx::query_as("SELECT * FROM navers WHERE id = ANY($1) AND owner_id = $2")
            .bind(&ids)
            .bind(owner)
            .fetch_all(&mut *self.db)
            .await?;

        let found_ids: Vec<NaverId> = navers.iter().map(|n| n.id).collect();
        let mut associations = self.project_ids_for(&found_ids).await?;

        let mut result = HashMap::new();
        for naver in navers {
            let project_ids = associations.remove(&naver.id).unwrap_or_default();
            result.insert(naver.id, NaverDBResponse::from((project_ids, naver)));
        }

        Ok(result)
    }

    #[instrument(skip(self, filter), fields(owner = %abbrev_uuid(&owner)), err)]
    async fn list(&mut self, owner: UserId, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM navers WHERE owner_id = ");
        query.push_bind(owner);

        if let Some(ref name) = filter.name {
            query.push(" AND name = ");
            query.push_bind(name);
        }
        if let Some(admission_date) = filter.admission_date {
            query.push(" AND admission_date = ");
            query.push_bind(admission_date);
        }
        if let Some(ref job_role) = filter.job_role {
            query.push(" AND job_role = ");
            query.push_bind(job_role);
        }

        query.push(" ORDER BY created_at, id");

        let navers = query.build_query_as::<Naver>().fetch_all(&mut *self.db).await?;

        let ids: Vec<NaverId> = navers.iter().map(|n| n.id).collect();
        let mut associations = self.project_ids_for(&ids).await?;

        Ok(navers
            .into_iter()
            .map(|naver| {
                let project_ids = associations.remove(&naver.id).unwrap_or_default();
                NaverDBResponse::from((project_ids, naver))
            })
            .collect())
    }

    #[instrument(skip(self, request), fields(owner = %abbrev_uuid(&owner), naver_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, owner: UserId, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let naver;
        {
            let mut tx = self.db.begin().await?;

            naver = sqlx::query_as::<_, Naver>(
                r#"
                UPDATE navers SET
                    name = COALESCE($3, name),
                    birthdate = COALESCE($4, birthdate),
                    admission_date = COALESCE($5, admission_date),
                    job_role = COALESCE($6, job_role),
                    updated_at = NOW()
                WHERE id = $1 AND owner_id = $2
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(owner)
            .bind(&request.name)
            .bind(request.birthdate)
            .bind(request.admission_date)
            .bind(&request.job_role)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound)?;

            // An explicit project list replaces the association set wholesale;
            // an absent one leaves it untouched.
            if let Some(project_ids) = &request.project_ids {
                let project_ids = dedup_ids(project_ids);

                sqlx::query("DELETE FROM naver_projects WHERE naver_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;

                for project_id in &project_ids {
                    sqlx::query("INSERT INTO naver_projects (naver_id, project_id) VALUES ($1, $2)")
                        .bind(id)
                        .bind(project_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }

            tx.commit().await?;
        }

        let project_ids = self.project_ids_for(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(NaverDBResponse::from((project_ids, naver)))
    }

    #[instrument(skip(self, request), fields(owner = %abbrev_uuid(&owner), naver_id = %abbrev_uuid(&id)), err)]
    async fn replace(&mut self, owner: UserId, id: Self::Id, request: &Self::ReplaceRequest) -> Result<Self::Response> {
        let project_ids = dedup_ids(&request.project_ids);

        let mut tx = self.db.begin().await?;

        let naver = sqlx::query_as::<_, Naver>(
            r#"
            UPDATE navers SET
                name = $3,
                birthdate = $4,
                admission_date = $5,
                job_role = $6,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&request.name)
        .bind(request.birthdate)
        .bind(request.admission_date)
        .bind(&request.job_role)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        // Full replacement always rewrites the association set, so an empty
        // list clears every membership.
        sqlx::query("DELETE FROM naver_projects WHERE naver_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for project_id in &project_ids {
            sqlx::query("INSERT INTO naver_projects (naver_id, project_id) VALUES ($1, $2)")
                .bind(id)
                .bind(project_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(NaverDBResponse::from((project_ids, naver)))
    }

    #[instrument(skip(self), fields(owner = %abbrev_uuid(&owner), naver_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, owner: UserId, id: Self::Id) -> Result<bool> {
        // Association rows go with the naver via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM navers WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> Navers<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Of the given ids, return those that exist and belong to `owner`.
    /// Used to validate association lists before writing join rows.
    #[instrument(skip(self, ids), fields(owner = %abbrev_uuid(&owner), count = ids.len()), err)]
    pub async fn filter_owned(&mut self, owner: UserId, ids: &[NaverId]) -> Result<Vec<NaverId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<NaverId> = sqlx::query_scalar("SELECT id FROM navers WHERE id = ANY($1) AND owner_id = $2")
            .bind(ids.to_vec())
            .bind(owner)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(found)
    }

    async fn project_ids_for(&mut self, naver_ids: &[NaverId]) -> Result<HashMap<NaverId, Vec<ProjectId>>> {
        if naver_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(NaverId, ProjectId)> = sqlx::query_as(
            "SELECT naver_id, project_id FROM naver_projects WHERE naver_id = ANY($1) ORDER BY naver_id, project_id",
        )
        .bind(naver_ids.to_vec())
        .fetch_all(&mut *self.db)
        .await?;

        let mut result = HashMap::new();
        for (naver_id, project_id) in rows {
            result.entry(naver_id).or_insert_with(Vec::new).push(project_id);
        }

        Ok(result)
    }
}
