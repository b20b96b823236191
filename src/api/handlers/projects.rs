use crate::api::extract::AppJson;
use crate::api::models::navers::NaverResponse;
use crate::api::models::projects::{
    ListProjectsQuery, ProjectCreate, ProjectCreateResponse, ProjectDetailResponse, ProjectReplace, ProjectResponse, ProjectUpdate,
};
use crate::api::models::users::CurrentUser;
use crate::db::handlers::{Navers, OwnedRepository, Projects, projects::ProjectFilter};
use crate::db::models::projects::{ProjectCreateDBRequest, ProjectReplaceDBRequest, ProjectUpdateDBRequest};
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

/// Check that every referenced naver exists and belongs to the caller.
async fn check_naver_references(conn: &mut sqlx::PgConnection, current_user: &CurrentUser, ids: &[NaverId]) -> Result<()> {
    let mut repo = Navers::new(conn);
    let owned = repo.filter_owned(current_user.id, ids).await?;
    let unique: HashSet<NaverId> = ids.iter().copied().collect();
    if owned.len() != unique.len() {
        return Err(Error::validation("navers", "contains ids of navers that do not exist"));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/projects",
    tag = "projects",
    summary = "List projects",
    responses(
        (status = 200, description = "The caller's projects matching all supplied filters", body = Vec<ProjectResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    params(ListProjectsQuery),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ListProjectsQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<ProjectResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Projects::new(&mut pool_conn);

    let filter = ProjectFilter { name: query.name };

    let projects = repo.list(current_user.id, &filter).await?;
    Ok(Json(projects.into_iter().map(ProjectResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/projects",
    tag = "projects",
    summary = "Create project",
    request_body = ProjectCreate,
    responses(
        (status = 201, description = "Project created successfully", body = ProjectCreateResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_project(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(create): AppJson<ProjectCreate>,
) -> Result<(StatusCode, Json<ProjectCreateResponse>)> {
    let mut errors = FieldErrors::new();
    validate_non_blank(&mut errors, "name", &create.name);
    errors.into_result()?;

    let naver_ids = create.navers.clone().unwrap_or_default();

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    check_naver_references(tx.acquire().await.map_err(|e| Error::Database(e.into()))?, &current_user, &naver_ids).await?;

    let project = {
        let mut repo = Projects::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.create(current_user.id, &ProjectCreateDBRequest::from(create)).await?
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(ProjectCreateResponse::from(project))))
}

#[utoipa::path(
    get,
    path = "/projects/{id}",
    tag = "projects",
    summary = "Get project",
    responses(
        (status = 200, description = "Project details with nested navers", body = ProjectDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    params(("id" = uuid::Uuid, Path, description = "Project ID")),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    current_user: CurrentUser,
) -> Result<Json<ProjectDetailResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let project = {
        let mut repo = Projects::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.get_by_id(current_user.id, id).await?
    }
    .ok_or_else(|| Error::NotFound {
        resource: "Project",
        id: id.to_string(),
    })?;

    let mut navers_map = {
        let mut repo = Navers::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.get_bulk(current_user.id, project.naver_ids.clone()).await?
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let navers: Vec<NaverResponse> = project
        .naver_ids
        .iter()
        .filter_map(|naver_id| navers_map.remove(naver_id))
        .map(NaverResponse::from)
        .collect();

    Ok(Json(ProjectDetailResponse::new(project, navers)))
}

#[utoipa::path(
    patch,
    path = "/projects/{id}",
    tag = "projects",
    summary = "Partially update project",
    request_body = ProjectUpdate,
    responses(
        (status = 200, description = "Project updated successfully", body = ProjectCreateResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    params(("id" = uuid::Uuid, Path, description = "Project ID")),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    current_user: CurrentUser,
    AppJson(update): AppJson<ProjectUpdate>,
) -> Result<Json<ProjectCreateResponse>> {
    let mut errors = FieldErrors::new();
    if let Some(ref name) = update.name {
        validate_non_blank(&mut errors, "name", name);
    }
    errors.into_result()?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    if let Some(ref naver_ids) = update.navers {
        check_naver_references(tx.acquire().await.map_err(|e| Error::Database(e.into()))?, &current_user, naver_ids).await?;
    }

    let project = {
        let mut repo = Projects::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.update(current_user.id, id, &ProjectUpdateDBRequest::from(update)).await
    }
    .map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Project",
            id: id.to_string(),
        },
        other => Error::Database(other),
    })?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(ProjectCreateResponse::from(project)))
}

#[utoipa::path(
    put,
    path = "/projects/{id}",
    tag = "projects",
    summary = "Replace project",
    request_body = ProjectReplace,
    responses(
        (status = 200, description = "Project replaced successfully", body = ProjectCreateResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    params(("id" = uuid::Uuid, Path, description = "Project ID")),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn replace_project(
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    current_user: CurrentUser,
    AppJson(replace): AppJson<ProjectReplace>,
) -> Result<Json<ProjectCreateResponse>> {
    let mut errors = FieldErrors::new();
    validate_non_blank(&mut errors, "name", &replace.name);
    errors.into_result()?;

    let naver_ids = replace.navers.clone().unwrap_or_default();

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    check_naver_references(tx.acquire().await.map_err(|e| Error::Database(e.into()))?, &current_user, &naver_ids).await?;

    let project = {
        let mut repo = Projects::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
        repo.replace(current_user.id, id, &ProjectReplaceDBRequest::from(replace)).await
    }
    .map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Project",
            id: id.to_string(),
        },
        other => Error::Database(other),
    })?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(ProjectCreateResponse::from(project)))
}

#[utoipa::path(
    delete,
    path = "/projects/{id}",
    tag = "projects",
    summary = "Delete project",
    responses(
        (status = 204, description = "Project deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    ),
    params(("id" = uuid::Uuid, Path, description = "Project ID")),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_project(State(state): State<AppState>, Path(id): Path<ProjectId>, current_user: CurrentUser) -> Result<StatusCode> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Projects::new(&mut pool_conn);

    if repo.delete(current_user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Project",
            id: id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::projects::{ProjectCreateResponse, ProjectDetailResponse, ProjectResponse};
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;
    use uuid::Uuid;

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_required(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        app.get("/projects").await.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_list_projects(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let auth = bearer_for(&user);

        let response = app
            .post("/projects")
            .add_header("authorization", auth.as_str())
            .json(&json!({"name": "Web Site Prototype"}))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created: ProjectCreateResponse = response.json();
        assert_eq!(created.name, "Web Site Prototype");
        assert_eq!(created.owner, user.id);

        let projects: Vec<ProjectResponse> = app.get("/projects").add_header("authorization", auth.as_str()).await.json();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, created.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_projects_limited_to_user(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user1 = create_test_user(&pool).await;
        let user2 = create_test_user(&pool).await;

        app.post("/projects")
            .add_header("authorization", bearer_for(&user1))
            .json(&json!({"name": "Mine"}))
            .await
            .assert_status(StatusCode::CREATED);
        app.post("/projects")
            .add_header("authorization", bearer_for(&user2))
            .json(&json!({"name": "Theirs"}))
            .await
            .assert_status(StatusCode::CREATED);

        let projects: Vec<ProjectResponse> = app
            .get("/projects")
            .add_header("authorization", bearer_for(&user1))
            .await
            .json();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Mine");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_project_invalid(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;

        let response = app
            .post("/projects")
            .add_header("authorization", bearer_for(&user))
            .json(&json!({"name": ""}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["errors"]["name"].is_array());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_retrieve_project_by_name(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let auth = bearer_for(&user);

        for name in ["new Web Site Prototype", "New Logo"] {
            app.post("/projects")
                .add_header("authorization", auth.as_str())
                .json(&json!({ "name": name }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let projects: Vec<ProjectResponse> = app
            .get("/projects")
            .add_query_param("name", "New Logo")
            .add_header("authorization", auth.as_str())
            .await
            .json();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "New Logo");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_project_with_naver(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let auth = bearer_for(&user);
        let naver_id = create_test_naver(&pool, user.id, "Naver 1", "Tech Leader").await;

        let response = app
            .post("/projects")
            .add_header("authorization", auth.as_str())
            .json(&json!({
                "name": "Website Prototype",
                "navers": [naver_id]
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created: ProjectCreateResponse = response.json();
        assert_eq!(created.navers, vec![naver_id]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_project_with_unknown_naver(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;

        let response = app
            .post("/projects")
            .add_header("authorization", bearer_for(&user))
            .json(&json!({
                "name": "Website Prototype",
                "navers": [Uuid::new_v4()]
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["errors"]["navers"].is_array());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_view_project_detail(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let auth = bearer_for(&user);
        let naver_id = create_test_naver(&pool, user.id, "Naver 1", "Tech Leader").await;

        let created: ProjectCreateResponse = app
            .post("/projects")
            .add_header("authorization", auth.as_str())
            .json(&json!({
                "name": "New WebSite Prototype",
                "navers": [naver_id]
            }))
            .await
            .json();

        let response = app
            .get(&format!("/projects/{}", created.id))
            .add_header("authorization", auth.as_str())
            .await;
        response.assert_status_ok();
        let detail: ProjectDetailResponse = response.json();
        assert_eq!(detail.name, "New WebSite Prototype");
        assert_eq!(detail.owner, user.id);
        assert_eq!(detail.navers.len(), 1);
        assert_eq!(detail.navers[0].id, naver_id);
        assert_eq!(detail.navers[0].job_role, "Tech Leader");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_association_symmetry_across_resources(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let auth = bearer_for(&user);
        let naver_id = create_test_naver(&pool, user.id, "Naver 1", "Designer").await;

        // Associate from the projects side...
        let created: ProjectCreateResponse = app
            .post("/projects")
            .add_header("authorization", auth.as_str())
            .json(&json!({
                "name": "Shared",
                "navers": [naver_id]
            }))
            .await
            .json();

        // ...and observe it from the navers side
        let detail: serde_json::Value = app
            .get(&format!("/navers/{naver_id}"))
            .add_header("authorization", auth.as_str())
            .await
            .json();
        let project_ids: Vec<String> = detail["projects"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(project_ids, vec![created.id.to_string()]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_partial_and_full_update_project(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let auth = bearer_for(&user);
        let naver_id = create_test_naver(&pool, user.id, "Naver 1", "Designer").await;

        let created: ProjectCreateResponse = app
            .post("/projects")
            .add_header("authorization", auth.as_str())
            .json(&json!({
                "name": "Old Name",
                "navers": [naver_id]
            }))
            .await
            .json();

        // PATCH without navers keeps the association set
        let updated: ProjectCreateResponse = app
            .patch(&format!("/projects/{}", created.id))
            .add_header("authorization", auth.as_str())
            .json(&json!({"name": "New Name"}))
            .await
            .json();
        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.navers, vec![naver_id]);

        // PUT without navers clears it
        let replaced: ProjectCreateResponse = app
            .put(&format!("/projects/{}", created.id))
            .add_header("authorization", auth.as_str())
            .json(&json!({"name": "Replaced"}))
            .await
            .json();
        assert_eq!(replaced.name, "Replaced");
        assert!(replaced.navers.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_project_keeps_navers(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let auth = bearer_for(&user);
        let naver_id = create_test_naver(&pool, user.id, "Naver 1", "Designer").await;

        let created: ProjectCreateResponse = app
            .post("/projects")
            .add_header("authorization", auth.as_str())
            .json(&json!({
                "name": "Doomed",
                "navers": [naver_id]
            }))
            .await
            .json();

        app.delete(&format!("/projects/{}", created.id))
            .add_header("authorization", auth.as_str())
            .await
            .assert_status(StatusCode::NO_CONTENT);

        // The associated naver survives, with the membership gone
        let detail: serde_json::Value = app
            .get(&format!("/navers/{naver_id}"))
            .add_header("authorization", auth.as_str())
            .await
            .json();
        assert!(detail["projects"].as_array().unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cross_owner_project_access_is_not_found(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let owner = create_test_user(&pool).await;
        let intruder = create_test_user(&pool).await;

        let created: ProjectCreateResponse = app
            .post("/projects")
            .add_header("authorization", bearer_for(&owner))
            .json(&json!({"name": "Private"}))
            .await
            .json();

        let url = format!("/projects/{}", created.id);
        let auth = bearer_for(&intruder);

        app.get(&url).add_header("authorization", auth.as_str()).await.assert_status(StatusCode::NOT_FOUND);
        app.delete(&url).add_header("authorization", auth.as_str()).await.assert_status(StatusCode::NOT_FOUND);
    }
}
