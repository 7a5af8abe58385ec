//! Reset Error Types
//!
//! Domain-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.
//!
//! The public taxonomy is deliberately coarse: "token never existed",
//! "already used", "expired" and "hash mismatch" all collapse into
//! [`ResetError::InvalidOrExpired`], and every unexpected fault renders as
//! the same generic 500 body. The audit trail is the only place the true
//! cause is recorded.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Reset-specific result type alias
pub type ResetResult<T> = Result<T, ResetError>;

/// Reset-specific error variants
#[derive(Debug, Error)]
pub enum ResetError {
    /// Token or new password missing from the redemption request
    #[error("Token and newPassword are required.")]
    MissingFields,

    /// New password fails the strength policy; the reason is safe to show
    #[error("{0}")]
    WeakPassword(String),

    /// Single opaque outcome for every way a token can be unusable
    #[error("Invalid or expired reset token.")]
    InvalidOrExpired,

    /// Rate limit exceeded (per origin or per identifier)
    #[error("Too many requests. Try again later.")]
    RateLimited,

    /// Endpoint hidden outside demo mode / from non-local callers
    #[error("Not found")]
    NotFound,

    /// Malformed admin input (SMTP settings validation)
    #[error("{0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResetError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ResetError::MissingFields
            | ResetError::WeakPassword(_)
            | ResetError::InvalidOrExpired
            | ResetError::Validation(_) => StatusCode::BAD_REQUEST,
            ResetError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ResetError::NotFound => StatusCode::NOT_FOUND,
            ResetError::Database(_) | ResetError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResetError::MissingFields
            | ResetError::WeakPassword(_)
            | ResetError::InvalidOrExpired
            | ResetError::Validation(_) => ErrorKind::BadRequest,
            ResetError::RateLimited => ErrorKind::TooManyRequests,
            ResetError::NotFound => ErrorKind::NotFound,
            ResetError::Database(_) | ResetError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// The message rendered to the caller.
    ///
    /// Internal faults never leak their detail; they all render as the same
    /// generic string regardless of cause.
    pub fn public_message(&self) -> String {
        match self {
            ResetError::Database(_) | ResetError::Internal(_) => {
                "Something went wrong.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Convert to AppError (with the caller-safe message only)
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.public_message())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ResetError::Database(e) => {
                tracing::error!(error = %e, "Reset database error");
            }
            ResetError::Internal(msg) => {
                tracing::error!(message = %msg, "Reset internal error");
            }
            ResetError::InvalidOrExpired => {
                tracing::warn!("Reset token rejected");
            }
            ResetError::RateLimited => {
                tracing::warn!("Reset rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Reset error");
            }
        }
    }
}

impl IntoResponse for ResetError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<ResetError> for AppError {
    fn from(err: ResetError) -> Self {
        err.to_app_error()
    }
}

impl From<platform::password::PasswordHashError> for ResetError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        ResetError::Internal(err.to_string())
    }
}
