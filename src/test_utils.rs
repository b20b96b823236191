//! Test utilities for integration testing.

use crate::api::models::users::CurrentUser;
use crate::auth::{password, session};
use crate::config::Config;
use crate::db::{
    handlers::{Navers, OwnedRepository, Projects, Users},
    models::{navers::NaverCreateDBRequest, projects::ProjectCreateDBRequest, users::UserCreateDBRequest, users::UserDBResponse},
};
use crate::types::{NaverId, ProjectId, UserId};
use axum_test::TestServer;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    }
}

pub async fn create_test_app(pool: PgPool) -> TestServer {
    let config = create_test_config();
    let state = crate::AppState::builder().db(pool).config(config).build();
    let router = crate::build_router(&state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

/// Cheap argon2 parameters so per-test user creation stays fast. Verification
/// reads the parameters from the hash, so logins against these users still
/// work.
fn test_password_hash(password: &str) -> String {
    password::hash_string_with_params(
        password,
        Some(password::Argon2Params {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }),
    )
    .expect("Failed to hash test password")
}

pub async fn create_test_user(pool: &PgPool) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let email = format!("testuser_{}@navedex.com.br", Uuid::new_v4().simple());

    users_repo
        .create(&UserCreateDBRequest {
            email,
            password_hash: test_password_hash("supersenha"),
        })
        .await
        .expect("Failed to create test user")
}

/// Authorization header value for a user, signed with the test config's secret
pub fn bearer_for(user: &UserDBResponse) -> String {
    let config = create_test_config();
    let current_user = CurrentUser {
        id: user.id,
        email: user.email.clone(),
    };
    let token = session::create_session_token(&current_user, &config).expect("Failed to create session token");
    format!("Bearer {token}")
}

pub async fn create_test_naver(pool: &PgPool, owner: UserId, name: &str, job_role: &str) -> NaverId {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Navers::new(&mut conn);
    repo.create(
        owner,
        &NaverCreateDBRequest {
            name: name.to_string(),
            birthdate: NaiveDate::from_ymd_opt(1991, 1, 1).unwrap(),
            admission_date: NaiveDate::from_ymd_opt(2020, 8, 10).unwrap(),
            job_role: job_role.to_string(),
            project_ids: vec![],
        },
    )
    .await
    .expect("Failed to create test naver")
    .id
}

pub async fn create_test_project(pool: &PgPool, owner: UserId, name: &str) -> ProjectId {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Projects::new(&mut conn);
    repo.create(
        owner,
        &ProjectCreateDBRequest {
            name: name.to_string(),
            naver_ids: vec![],
        },
    )
    .await
    .expect("Failed to create test project")
    .id
}
