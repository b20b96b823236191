//! Extractor resolving the bearer token into the authenticated caller.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract user from the Authorization header if present and valid
/// Returns:
/// - None: No Authorization header or not a Bearer token
/// - Some(Ok(user)): Valid bearer token resolved to a user
/// - Some(Err(error)): Bearer token present but invalid/expired
fn try_bearer_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let auth_header = parts.headers.get(axum::http::header::AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }));
        }
    };

    // Check for Bearer token format
    let token = auth_str.strip_prefix("Bearer ")?;

    Some(session::verify_session_token(token, config))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_bearer_auth(parts, &state.config) {
            Some(Ok(user)) => {
                debug!("Found bearer authenticated user: {}", user.id);
                Ok(user)
            }
            Some(Err(e)) => {
                trace!("Bearer authentication failed: {:?}", e);
                Err(Error::Unauthenticated { message: None })
            }
            None => {
                trace!("No authentication credentials found in request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_config;
    use axum::extract::FromRequestParts as _;
    use uuid::Uuid;

    fn test_state() -> AppState {
        AppState::builder()
            .db(sqlx::postgres::PgPoolOptions::new().connect_lazy("postgres://localhost/unused").unwrap())
            .config(create_test_config())
            .build()
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = axum::http::Request::builder().uri("http://localhost/navers");
        if let Some(value) = value {
            builder = builder.header("authorization", value);
        }
        let (parts, _body) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_extractor_accepts_valid_token() {
        let state = test_state();
        let user = CurrentUser {
            id: Uuid::new_v4(),
            email: "suporte@navedex.com.br".to_string(),
        };
        let token = session::create_session_token(&user, &state.config).unwrap();

        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let resolved = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.email, user.email);
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let state = test_state();
        let mut parts = parts_with_auth(None);

        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_unauthorized() {
        let state = test_state();
        let mut parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));

        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let state = test_state();
        let mut parts = parts_with_auth(Some("Bearer not-a-jwt"));

        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
