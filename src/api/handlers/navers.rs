use crate::api::extract::AppJson;
use crate::api::models::navers::{
    ListNaversQuery, NaverCreate, NaverCreateResponse, NaverDetailResponse, NaverReplace, NaverResponse, NaverUpdate,
};
use crate::api::models::projects::ProjectResponse;
use crate::api::models::users::CurrentUser;
use crate::db::handlers::{Navers, OwnedRepository, Projects, navers::NaverFilter};
use crate::db::models::navers::{NaverCreateDBRequest, NaverReplaceDBRequest, NaverUpdateDBRequest};
use crate::errors::{Error, FieldErrors, Result};
use crate::types::{NaverId, ProjectId};
use crate::{AppState, api::handlers::validate_non_blank};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use sqlx::Acquire;
use std::collections::HashSet;

/// Check that every referenced project exists and belongs to the caller.
/// Cross-owner ids are indistinguishable from nonexistent ones.
async fn check_project_references(conn: &mut sqlx::PgConnection, current_user: &CurrentUser, ids: &[ProjectId]) -> Result<()> {
    let mut repo = Projects::new(conn);
    let owned = repo.filter_owned(current_user.id, ids).await?;
    let unique: HashSet<ProjectId> = ids.iter().copied().collect();
    if owned.len() != unique.len() {
        return Err(Error::validation("projects", "contains ids of projects that do not exist"));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/navers",
    tag = "navers",
    summary = "List navers",
    responses(
        (status = 200, description = "The caller's navers matching all supplied filters", body = Vec<NaverResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    params(ListNaversQuery),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_navers(
    State(state): State<AppState>,
    Query(query): Query<ListNaversQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<NaverResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Navers::new(&mut pool_conn);

    let filter = NaverFilter {
        name: query.name,
        admission_date: query.admission_date,
        job_role: query.job_role,
    };

    let navers = repo.list(current_user.id, &filter).await?;
    Ok(Json(navers.into_iter().map(NaverResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/navers",
    tag = "navers",
    summary = "Create naver",
    request_body = NaverCreate,
    responses(
        (status = 201, description = "Naver created successfully", body = NaverCreateResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_naver(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(create): AppJson<NaverCreate>,
) -> Result<(StatusCode, Json<NaverCreateResponse>)> {
    let mut errors = FieldErrors::new();
    validate_non_blank(&mut errors, "name", &create.name);
    validate_non_blank(&mut errors, "job_role", &create.job_role);
    errors.into_result()?;

    let project_ids = create.projects.clone().unwrap_or_default();

    // Reference checks and the insert share one transaction so a concurrent
    // project deletion cannot slip between them.
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    check_project_references(tx.acquire().await.map_err(|e| Error::Database(e.into()))?, &current_user, &project_ids).await?;

    let naver = {
        let mut repo = Navers::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.create(current_user.id, &NaverCreateDBRequest::from(create)).await?
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(NaverCreateResponse::from(naver))))
}

#[utoipa::path(
    get,
    path = "/navers/{id}",
    tag = "navers",
    summary = "Get naver",
    responses(
        (status = 200, description = "Naver details with nested projects", body = NaverDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Naver not found"),
        (status = 500, description = "Internal server error")
    ),
    params(("id" = uuid::Uuid, Path, description = "Naver ID")),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_naver(
    State(state): State<AppState>,
    Path(id): Path<NaverId>,
    current_user: CurrentUser,
) -> Result<Json<NaverDetailResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let naver = {
        let mut repo = Navers::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.get_by_id(current_user.id, id).await?
    }
    .ok_or_else(|| Error::NotFound {
        resource: "Naver",
        id: id.to_string(),
    })?;

    // Explicit read-model assembly: fetch the related projects and project
    // them into nested summaries.
    let mut projects_map = {
        let mut repo = Projects::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.get_bulk(current_user.id, naver.project_ids.clone()).await?
    };

    // Commit the transaction to ensure all reads were atomic
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let projects: Vec<ProjectResponse> = naver
        .project_ids
        .iter()
        .filter_map(|project_id| projects_map.remove(project_id))
        .map(ProjectResponse::from)
        .collect();

    Ok(Json(NaverDetailResponse::new(naver, projects)))
}

#[utoipa::path(
    patch,
    path = "/navers/{id}",
    tag = "navers",
    summary = "Partially update naver",
    request_body = NaverUpdate,
    responses(
        (status = 200, description = "Naver updated successfully", body = NaverCreateResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Naver not found"),
        (status = 500, description = "Internal server error")
    ),
    params(("id" = uuid::Uuid, Path, description = "Naver ID")),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_naver(
    State(state): State<AppState>,
    Path(id): Path<NaverId>,
    current_user: CurrentUser,
    AppJson(update): AppJson<NaverUpdate>,
) -> Result<Json<NaverCreateResponse>> {
    let mut errors = FieldErrors::new();
    if let Some(ref name) = update.name {
        validate_non_blank(&mut errors, "name", name);
    }
    if let Some(ref job_role) = update.job_role {
        validate_non_blank(&mut errors, "job_role", job_role);
    }
    errors.into_result()?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    if let Some(ref project_ids) = update.projects {
        check_project_references(tx.acquire().await.map_err(|e| Error::Database(e.into()))?, &current_user, project_ids).await?;
    }

    let naver = {
        let mut repo = Navers::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.update(current_user.id, id, &NaverUpdateDBRequest::from(update)).await
    }
    .map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Naver",
            id: id.to_string(),
        },
        other => Error::Database(other),
    })?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(NaverCreateResponse::from(naver)))
}

#[utoipa::path(
    put,
    path = "/navers/{id}",
    tag = "navers",
    summary = "Replace naver",
    request_body = NaverReplace,
    responses(
        (status = 200, description = "Naver replaced successfully", body = NaverCreateResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Naver not found"),
        (status = 500, description = "Internal server error")
    ),
    params(("id" = uuid::Uuid, Path, description = "Naver ID")),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn replace_naver(
    State(state): State<AppState>,
    Path(id): Path<NaverId>,
    current_user: CurrentUser,
    AppJson(replace): AppJson<NaverReplace>,
) -> Result<Json<NaverCreateResponse>> {
    let mut errors = FieldErrors::new();
    validate_non_blank(&mut errors, "name", &replace.name);
    validate_non_blank(&mut errors, "job_role", &replace.job_role);
    errors.into_result()?;

    let project_ids = replace.projects.clone().unwrap_or_default();

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    check_project_references(tx.acquire().await.map_err(|e| Error::Database(e.into()))?, &current_user, &project_ids).await?;

    let naver = {
        let mut repo = Navers::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.replace(current_user.id, id, &NaverReplaceDBRequest::from(replace)).await
    }
    .map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Naver",
            id: id.to_string(),
        },
        other => Error::Database(other),
    })?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(NaverCreateResponse::from(naver)))
}

#[utoipa::path(
    delete,
    path = "/navers/{id}",
    tag = "navers",
    summary = "Delete naver",
    responses(
        (status = 204, description = "Naver deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Naver not found"),
        (status = 500, description = "Internal server error")
    ),
    params(("id" = uuid::Uuid, Path, description = "Naver ID")),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_naver(State(state): State<AppState>, Path(id): Path<NaverId>, current_user: CurrentUser) -> Result<StatusCode> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Navers::new(&mut pool_conn);

    if repo.delete(current_user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Naver",
            id: id.to_string(),
        })
    }
}
