//! Request extractors that validate before a handler runs.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{StatusCode, request::Parts},
};
use serde_json::Value;

use crate::error::AppError;
use crate::validation::{self, Validate};

/// Client-side rejections are a 400; the rest (such as a route registered
/// without the path parameter it extracts) are server errors.
fn rejected(status: StatusCode, message: String) -> AppError {
    if status.is_server_error() {
        AppError::Internal(message)
    } else {
        AppError::BadRequest(message)
    }
}

/// A JSON body checked by its [`Validate`] implementation.
///
/// Malformed JSON is a plain 400; a well-formed body that fails validation
/// is a 400 listing every rejected field.
#[derive(Debug, Clone)]
pub struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: Validate + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| rejected(rejection.status(), rejection.body_text()))?;

        T::validate(&body).map(Self).map_err(AppError::Validation)
    }
}

/// The `{id}` path segment as an integer of at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidId(pub i32);

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| rejected(rejection.status(), rejection.body_text()))?;

        validation::path_id(&raw)
            .map(Self)
            .map_err(AppError::Validation)
    }
}
