// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-facing messages.
///
/// The wire shape is always `{"message": "..."}`; upstream failures (storage,
/// mail provider) are surfaced verbatim as 400s, which is acceptable for an
/// internal back-office tool.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    Validation(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    Internal(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Validation(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Internal(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Validation(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({ "message": self.message() })
    }
}

// Static constructors, mirroring the HTTP taxonomy
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert module error types to ApiError
// Storage failures surface verbatim as 400s (internal tool); missing rows
// are reported as NotFound by the handlers, not by this layer.
impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        tracing::error!("database error: {}", err);
        ApiError::bad_request(err.to_string())
    }
}

impl From<crate::database::payload::PayloadError> for ApiError {
    fn from(err: crate::database::payload::PayloadError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<crate::filter::FilterError> for ApiError {
    fn from(err: crate::filter::FilterError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<crate::auth::AuthError> for ApiError {
    fn from(err: crate::auth::AuthError) -> Self {
        match err {
            crate::auth::AuthError::InvalidCredentials => {
                ApiError::unauthorized("Invalid credentials")
            }
            crate::auth::AuthError::InvalidToken(_) | crate::auth::AuthError::WrongPurpose => {
                ApiError::unauthorized("Invalid or expired token")
            }
            crate::auth::AuthError::UnknownRole(role) => {
                ApiError::validation(format!("Unknown role: {}", role))
            }
            crate::auth::AuthError::Hash(msg) => {
                tracing::error!("password hash error: {}", msg);
                ApiError::internal("Failed to process credentials")
            }
        }
    }
}

impl From<crate::transfer::TransferError> for ApiError {
    fn from(err: crate::transfer::TransferError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<crate::mailer::MailError> for ApiError {
    fn from(err: crate::mailer::MailError) -> Self {
        tracing::error!("mail delivery error: {}", err);
        ApiError::bad_request(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_surface_verbatim_as_bad_request() {
        let err: ApiError =
            crate::database::manager::DatabaseError::ConfigMissing("DATABASE_URL").into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Missing configuration: DATABASE_URL");
    }

    #[test]
    fn wire_shape_is_a_message_object() {
        let err = ApiError::not_found("Client not found");
        assert_eq!(err.to_json(), json!({ "message": "Client not found" }));
    }
}
