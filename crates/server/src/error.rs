//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! Every error body is JSON with a `message`. Validation failures also carry
//! an `errors` list of `{field, message}` pairs.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use shop_core::ValidationErrors;

use crate::db::RepositoryError;
use crate::services::{CatalogError, OrderError};

/// Application-level error type for the shop API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body or path failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Order operation failed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Catalog operation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a ValidationErrors>,
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Order(err) => match err {
                OrderError::ProductNotFound(_) | OrderError::InsufficientStock { .. } => {
                    StatusCode::BAD_REQUEST
                }
                OrderError::OrderNotFound(_) => StatusCode::NOT_FOUND,
                OrderError::InvalidTransition { .. } => StatusCode::CONFLICT,
                OrderError::Repository(e) => repository_status(e),
            },
            Self::Catalog(err) => match err {
                CatalogError::ProductNotFound(_) => StatusCode::NOT_FOUND,
                CatalogError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
                CatalogError::Repository(e) => repository_status(e),
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            _ if status.is_server_error() => "Internal server error".to_owned(),
            Self::Validation(_) => "validation failed".to_owned(),
            Self::Order(OrderError::Repository(_))
            | Self::Catalog(CatalogError::Repository(_)) => match status {
                StatusCode::CONFLICT => "Request conflicts with the current state".to_owned(),
                _ => "Not found".to_owned(),
            },
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) => msg.clone(),
            _ => self.to_string(),
        };

        let errors = match &self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        };

        (
            status,
            Json(ErrorBody {
                message: &message,
                errors,
            }),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
