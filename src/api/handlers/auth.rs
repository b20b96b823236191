use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::extract::AppJson,
    api::models::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
        users::CurrentUser,
    },
    auth::{password, session},
    db::{handlers::Users, models::users::UserCreateDBRequest},
    errors::{Error, FieldErrors, Result},
};

/// Minimal shape check; the unique constraint and lowercasing live in the
/// repository.
fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "User registered successfully", body = RegisterResponse),
        (status = 400, description = "Invalid email, weak password, or duplicate email"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let email = request.email.trim().to_lowercase();

    let mut errors = FieldErrors::new();
    if !is_valid_email(&email) {
        errors.push("email", "enter a valid email address");
    }
    let password_config = &state.config.auth.password;
    if request.password.len() < password_config.min_length {
        errors.push("password", &format!("must be at least {} characters", password_config.min_length));
    }
    if request.password.len() > password_config.max_length {
        errors.push("password", &format!("must be no more than {} characters", password_config.max_length));
    }
    errors.into_result()?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut tx);

    if user_repo.get_by_email(&email).await?.is_some() {
        return Err(Error::validation("email", "an account with this email address already exists"));
    }

    // Hash the password on a blocking thread to avoid blocking the async runtime
    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let created_user = user_repo.create(&UserCreateDBRequest { email, password_hash }).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(created_user))))
}

/// Login with email and password, returning a bearer token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing or invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, AppJson(request): AppJson<LoginRequest>) -> Result<Json<LoginResponse>> {
    let mut errors = FieldErrors::new();
    if request.email.trim().is_empty() {
        errors.push("email", "an email address is required to log in");
    }
    if request.password.is_empty() {
        errors.push("password", "a password is required to log in");
    }
    errors.into_result()?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    // Unknown email and wrong password are indistinguishable to the caller
    let user = user_repo.get_by_email(&request.email).await?.ok_or(Error::InvalidCredentials)?;

    // Verify password on a blocking thread to avoid blocking the async runtime
    let password = request.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::InvalidCredentials);
    }

    let current_user = CurrentUser {
        id: user.id,
        email: user.email,
    };
    let token = session::create_session_token(&current_user, &state.config)?;

    Ok(Json(LoginResponse { token }))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_valid_user(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app
            .post("/register")
            .json(&json!({
                "email": "suporte@navedex.com.br",
                "password": "supersenha"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["email"], "suporte@navedex.com.br");
        assert!(body["id"].is_string());
        assert!(body.get("password").is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_normalizes_email_casing(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app
            .post("/register")
            .json(&json!({
                "email": "Test@NAVEDEX.COM.BR",
                "password": "supersenha"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["email"], "test@navedex.com.br");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_duplicate_email_fails(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let payload = json!({
            "email": "financeiro@navedex.com.br",
            "password": "supersenha"
        });

        app.post("/register").json(&payload).await.assert_status(StatusCode::CREATED);

        // Same address again, different casing - still a duplicate
        let response = app
            .post("/register")
            .json(&json!({
                "email": "Financeiro@navedex.com.br",
                "password": "otherpassword"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind("financeiro@navedex.com.br")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_password_too_short(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app
            .post("/register")
            .json(&json!({
                "email": "rh@navedex.com.br",
                "password": "1234567"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["errors"]["password"].is_array());

        // No row was created
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind("rh@navedex.com.br")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_invalid_email(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        for email in ["", "navedex", "@navedex.com.br", "suporte@"] {
            let response = app
                .post("/register")
                .json(&json!({
                    "email": email,
                    "password": "supersenha"
                }))
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_returns_token(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        app.post("/register")
            .json(&json!({
                "email": "gerencia@navedex.com.br",
                "password": "12345678"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = app
            .post("/login")
            .json(&json!({
                "email": "gerencia@navedex.com.br",
                "password": "12345678"
            }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert!(body["token"].is_string());
        assert!(!body["token"].as_str().unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_wrong_password(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        app.post("/register")
            .json(&json!({
                "email": "gestao@navedex.com.br",
                "password": "12345678"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = app
            .post("/login")
            .json(&json!({
                "email": "gestao@navedex.com.br",
                "password": "1234567"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(!response.text().contains("token"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_unknown_user(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app
            .post("/login")
            .json(&json!({
                "email": "usernotexists@navedex.com.br",
                "password": "testpass"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(!response.text().contains("token"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_missing_fields(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app
            .post("/login")
            .json(&json!({
                "email": "navedex",
                "password": ""
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["errors"]["password"].is_array());
    }
}
