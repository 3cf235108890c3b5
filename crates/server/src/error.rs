//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::orders::OrderError;
use crate::services::password::PasswordError;
use crate::services::token::TokenError;

/// Application-level error type for the HTTP API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Order processor rejected or failed the operation.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Issuing a token failed.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials were rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Mismatch => Self::Unauthorized("invalid credentials".to_string()),
            PasswordError::Hash => Self::Internal(err.to_string()),
        }
    }
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Database(err) => !matches!(
                err,
                RepositoryError::NotFound
                    | RepositoryError::Conflict(_)
                    | RepositoryError::MissingReference(_)
            ),
            Self::Token(_) | Self::Internal(_) => true,
            Self::Order(err) => matches!(err, OrderError::Repository(_)),
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound | RepositoryError::MissingReference(_))
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Token(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Order(err) => match err {
                OrderError::NotFound | OrderError::MissingReference(_) => StatusCode::NOT_FOUND,
                OrderError::Conflict(_) => StatusCode::CONFLICT,
                OrderError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                OrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    // Don't expose internal error details to clients
    fn public_message(&self) -> String {
        if self.is_server_error() {
            return "Internal server error".to_string();
        }
        match self {
            Self::Database(RepositoryError::NotFound) => "not found".to_string(),
            Self::Database(err) => err.to_string(),
            Self::Order(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::Token(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = Json(json!({ "message": self.public_message() }));

        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a principal key.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}
