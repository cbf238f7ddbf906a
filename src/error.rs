// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::dispatch::DispatchError;
use crate::executor::ExecutionError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError(String),
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError(_) => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError(msg) => msg,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("Not Found".to_string())
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Unauthorized".to_string())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::NotFound => ApiError::not_found(),
            DispatchError::Unauthorized => ApiError::unauthorized(),
            DispatchError::Validation(msg) => ApiError::ValidationError(msg),
            DispatchError::InvalidPayload(msg) => ApiError::InvalidJson(msg),
            // Logged where raised; clients only see a generic failure
            DispatchError::UnsupportedMethod(_) => {
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<ExecutionError> for ApiError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::Statement(e) => ApiError::bad_request(e.to_string()),
            ExecutionError::Rejected(msg) => ApiError::bad_request(msg),
            ExecutionError::Sqlx(sqlx::Error::Database(db_err)) => {
                tracing::error!("Database error: {}", db_err);
                ApiError::bad_request(db_err.message().to_string())
            }
            ExecutionError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::bad_request("Database error occurred")
            }
            ExecutionError::ConfigMissing(what) => {
                tracing::error!("Executor misconfigured: missing {}", what);
                ApiError::internal_server_error("Service is not configured")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::SqlError;

    #[test]
    fn dispatch_errors_map_to_statuses() {
        assert_eq!(ApiError::from(DispatchError::NotFound).status_code(), 404);
        assert_eq!(ApiError::from(DispatchError::Unauthorized).status_code(), 401);
        assert_eq!(ApiError::from(DispatchError::validation("x")).status_code(), 400);
        assert_eq!(ApiError::from(DispatchError::InvalidPayload("x".into())).status_code(), 400);
        assert_eq!(ApiError::from(DispatchError::UnsupportedMethod("PUT".into())).status_code(), 500);
    }

    #[test]
    fn validation_messages_reach_the_client() {
        let err = ApiError::from(DispatchError::validation("b is a required param"));
        let body = err.to_json();
        assert_eq!(body["message"], "b is a required param");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[test]
    fn execution_errors_are_bad_requests() {
        let err = ApiError::from(ExecutionError::Statement(SqlError::UnscopedMutation("delete")));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Refusing to delete without filters");
        assert_eq!(ApiError::from(ExecutionError::Rejected("nope".into())).status_code(), 400);
    }
}
