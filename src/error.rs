use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::error::Error;
use std::fmt;

use crate::auth::AuthError;

/// The primary error type for the application.
///
/// Every handler returns [`AppResult`]; the variant decides the HTTP status and
/// the `code` field of the `{ "message", "code" }` response envelope.
#[derive(Debug)]
pub enum AppError {
    /// For internal server errors that are not expected to be handled by the client.
    Internal(anyhow::Error),
    /// For client errors due to invalid requests.
    BadRequest(String),
    /// For when a specific field in a request fails validation.
    ValidationError {
        /// The name of the field that failed validation.
        field: String,
        /// A message describing the validation error.
        message: String,
    },
    /// Missing, malformed or expired bearer token.
    Unauthorized(String),
    /// Sign-in failure. Unknown mail and wrong password are not distinguished.
    InvalidCredentials,
    /// For when a requested resource is not found or not owned by the caller.
    NotFound(String),
    /// For when a request conflicts with the current state of the server.
    Conflict(String),
    /// For when a service is temporarily unavailable.
    ServiceUnavailable(String),
    /// For errors related to database operations.
    Database(String),
    /// A bulk write touched a different number of rows than requested.
    Integrity(String),
    /// Upload with a content type or extension outside the allow-list.
    UnsupportedMediaType(String),
    /// Upload larger than the configured limit.
    PayloadTooLarge(String),
    /// For errors related to I/O operations.
    IoError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ValidationError { field, message } => {
                write!(f, "Validation error on field '{}': {}", field, message)
            }
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::InvalidCredentials => write!(f, "invalid mail or password"),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Integrity(msg) => write!(f, "Integrity error: {}", msg),
            AppError::UnsupportedMediaType(msg) => write!(f, "Unsupported media type: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Internal(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::ValidationError { .. } | AppError::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) | AppError::Database(_) | AppError::Integrity(_) | AppError::IoError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message, error_id) = match self {
            AppError::Internal(e) => {
                let error_id = uuid::Uuid::new_v4();
                tracing::error!(%error_id, "Internal error: {:?}", e);
                ("INTERNAL_ERROR", "An internal server error occurred".to_string(), Some(error_id))
            }
            AppError::BadRequest(msg) => {
                tracing::debug!("Bad request: {}", msg);
                ("BAD_REQUEST", msg, None)
            }
            AppError::ValidationError { field, message } => {
                tracing::debug!("Validation failed for '{}': {}", field, message);
                ("VALIDATION_ERROR", format!("{}: {}", field, message), None)
            }
            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                ("UNAUTHORIZED", msg, None)
            }
            AppError::InvalidCredentials => {
                tracing::warn!("Sign-in rejected");
                ("INVALID_CREDENTIALS", "invalid mail or password".to_string(), None)
            }
            AppError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                ("NOT_FOUND", msg, None)
            }
            AppError::Conflict(msg) => ("CONFLICT", msg, None),
            AppError::ServiceUnavailable(msg) => {
                tracing::error!("Service unavailable: {}", msg);
                ("SERVICE_UNAVAILABLE", msg, None)
            }
            AppError::Database(msg) => {
                let error_id = uuid::Uuid::new_v4();
                tracing::error!(%error_id, "Database error: {}", msg);
                ("DATABASE_ERROR", "A database error occurred".to_string(), Some(error_id))
            }
            AppError::Integrity(msg) => {
                let error_id = uuid::Uuid::new_v4();
                tracing::error!(%error_id, "Integrity error: {}", msg);
                ("INTEGRITY_ERROR", msg, Some(error_id))
            }
            AppError::UnsupportedMediaType(msg) => ("UNSUPPORTED_MEDIA_TYPE", msg, None),
            AppError::PayloadTooLarge(msg) => ("PAYLOAD_TOO_LARGE", msg, None),
            AppError::IoError(msg) => {
                let error_id = uuid::Uuid::new_v4();
                tracing::error!(%error_id, "I/O error: {}", msg);
                ("IO_ERROR", "An I/O error occurred".to_string(), Some(error_id))
            }
        };

        let mut body = json!({
            "message": message,
            "code": code,
        });
        if let Some(error_id) = error_id {
            body["error_id"] = json!(error_id.to_string());
        }

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("Duplicate entry: {}", db_err.message()))
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound(format!("Referenced record not found: {}", db_err.message()))
            }
            sqlx::Error::Database(db_err) => AppError::Database(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => {
                AppError::ServiceUnavailable("Database connection pool timed out".to_string())
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(format!("{}: {}", err.kind(), err))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::MissingToken | AuthError::InvalidToken(_) => AppError::Unauthorized(err.to_string()),
            AuthError::Hashing(e) => AppError::Internal(anyhow::anyhow!("password hashing failed: {}", e)),
            AuthError::Salt(e) => AppError::Internal(anyhow::anyhow!("password salt failed: {}", e)),
            AuthError::Signing(e) => AppError::Internal(anyhow::anyhow!("token signing failed: {}", e)),
        }
    }
}

/// A type alias for `Result<T, AppError>`, used throughout the application.
pub type AppResult<T> = Result<T, AppError>;

/// An extension trait for `Option` that provides a convenient way to convert
/// an `Option` to a `Result` with a `NotFound` error.
pub trait OptionExt<T> {
    /// Converts `None` into `AppError::NotFound("<entity> not found")`.
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(format!("{} not found", entity)))
    }
}

/// Turns the affected-row count of an owned `UPDATE`/`DELETE` into `NotFound` when nothing matched.
pub fn ensure_affected(rows: u64, entity: &str) -> AppResult<()> {
    if rows == 0 {
        return Err(AppError::NotFound(format!("{} not found", entity)));
    }
    Ok(())
}

/// Request payload checks shared by the handlers.
pub mod validation {
    use super::*;

    /// Rejects a missing or whitespace-only string field.
    pub fn require_non_blank(value: Option<&str>, field: &str) -> AppResult<()> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(()),
            _ => Err(AppError::ValidationError {
                field: field.to_string(),
                message: "must not be empty".to_string(),
            }),
        }
    }

    /// Rejects an explicitly supplied blank value; absence is fine.
    pub fn reject_blank(value: Option<&str>, field: &str) -> AppResult<()> {
        match value {
            Some(v) if v.trim().is_empty() => Err(AppError::ValidationError {
                field: field.to_string(),
                message: "must not be empty".to_string(),
            }),
            _ => Ok(()),
        }
    }
}
