//! Request extractors shared by the API handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

use crate::errors::Error;

/// JSON body extractor that reports deserialization failures as 400 responses
/// instead of axum's default 422, so malformed payloads (bad dates, wrong
/// types, missing fields) surface as validation failures.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(Error::BadRequest {
                message: rejection.body_text(),
            }),
        }
    }
}
