use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// RepositoryError
///
/// Failures raised by the persistence layer. Constraint violations are classified so
/// that handlers can surface them as client errors instead of generic 500s.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("referenced record does not exist or is still in use: {0}")]
    ForeignKey(String),
    #[error("duplicate value: {0}")]
    UniqueViolation(String),
    /// A write could not be read back inside its own transaction.
    #[error("{0}")]
    Verification(String),
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_foreign_key_violation() {
                return RepositoryError::ForeignKey(db_err.message().to_string());
            }
            if db_err.is_unique_violation() {
                return RepositoryError::UniqueViolation(db_err.message().to_string());
            }
        }
        RepositoryError::Database(err)
    }
}

/// AppError
///
/// The single error type returned by handlers and extractors. Every variant renders as
/// `{"error": "<category>", "message": "<detail>"}` with the matching status code.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Submission(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Upstream(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Submission(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Repository(RepositoryError::ForeignKey(_))
            | AppError::Repository(RepositoryError::Verification(_)) => StatusCode::BAD_REQUEST,
            AppError::Repository(RepositoryError::UniqueViolation(_)) => StatusCode::CONFLICT,
            AppError::Repository(RepositoryError::Database(_)) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn category(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::Repository(RepositoryError::ForeignKey(_)) => {
                "Validation Error"
            }
            AppError::Submission(_) | AppError::Repository(RepositoryError::Verification(_)) => {
                "Submission Error"
            }
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::NotFound(_) => "Not Found",
            AppError::Conflict(_) | AppError::Repository(RepositoryError::UniqueViolation(_)) => {
                "Conflict"
            }
            AppError::Upstream(_) => "Bad Gateway",
            AppError::Repository(RepositoryError::Database(_)) | AppError::Internal(_) => {
                "Internal Server Error"
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal failures are logged in full but answered with a generic message.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "request failed");
            "An unexpected error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({ "error": self.category(), "message": message }));
        (status, body).into_response()
    }
}
