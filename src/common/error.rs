// Error handling types for the API

use axum::{
    http::{header::WWW_AUTHENTICATE, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;

/// API error types
///
/// Every variant is scoped to the request that produced it; none is retried.
#[derive(Debug)]
pub enum ApiError {
    /// No cookie and no bearer header on a protected route
    AuthenticationMissing,
    /// Malformed, expired or wrongly signed token
    InvalidToken,
    /// Token is valid but its subject no longer exists
    UserNotFound,
    /// Login mismatch, never says which half was wrong
    InvalidCredentials,
    DuplicateEmail,
    Conflict(String),
    OAuthExchangeFailed(String),
    /// Absent or owned by someone else, deliberately indistinguishable
    NotFound(String),
    ValidationError(String),
    BadRequest(String),
    ServiceUnavailable(String),
    InternalServer(String),
    DatabaseError(sqlx::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::AuthenticationMissing => write!(f, "Authentication Missing"),
            ApiError::InvalidToken => write!(f, "Invalid Token"),
            ApiError::UserNotFound => write!(f, "User Not Found"),
            ApiError::InvalidCredentials => write!(f, "Invalid Credentials"),
            ApiError::DuplicateEmail => write!(f, "Duplicate Email"),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::OAuthExchangeFailed(msg) => write!(f, "OAuth Exchange Failed: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Maps a failed write to a uniqueness error when the store rejected it
    /// for a duplicate key, otherwise keeps it as a database error.
    pub fn from_write(e: sqlx::Error, conflict_message: &str) -> Self {
        let message = e.to_string();
        if message.contains("UNIQUE constraint failed") {
            if message.contains("users.email") {
                ApiError::DuplicateEmail
            } else {
                ApiError::Conflict(conflict_message.to_string())
            }
        } else {
            ApiError::DatabaseError(e)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationMissing
            | ApiError::InvalidToken
            | ApiError::UserNotFound
            | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::DuplicateEmail | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::OAuthExchangeFailed(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalServer(_) | ApiError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let (error_message, code) = match self {
            ApiError::AuthenticationMissing => {
                ("Not authenticated".to_string(), "AUTHENTICATION_MISSING")
            }
            ApiError::InvalidToken => ("Invalid or expired token".to_string(), "INVALID_TOKEN"),
            ApiError::UserNotFound => ("User not found".to_string(), "USER_NOT_FOUND"),
            ApiError::InvalidCredentials => (
                "Invalid email or password".to_string(),
                "INVALID_CREDENTIALS",
            ),
            ApiError::DuplicateEmail => {
                ("Email is already registered".to_string(), "DUPLICATE_EMAIL")
            }
            ApiError::Conflict(msg) => (msg, "CONFLICT"),
            ApiError::OAuthExchangeFailed(msg) => (msg, "OAUTH_EXCHANGE_FAILED"),
            ApiError::NotFound(msg) => (msg, "NOT_FOUND"),
            ApiError::ValidationError(msg) => (msg, "VALIDATION_ERROR"),
            ApiError::BadRequest(msg) => (msg, "BAD_REQUEST"),
            ApiError::ServiceUnavailable(msg) => (msg, "SERVICE_UNAVAILABLE"),
            ApiError::InternalServer(msg) => (msg, "INTERNAL_SERVER_ERROR"),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                )
            }
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        if status == StatusCode::UNAUTHORIZED {
            (status, [(WWW_AUTHENTICATE, "Bearer")], Json(error_response)).into_response()
        } else {
            (status, Json(error_response)).into_response()
        }
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::ValidationError(error_messages.join(", "))
        }
    }
}
