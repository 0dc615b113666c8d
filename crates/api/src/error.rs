//! HTTP error mapping for the JSON surface.
//!
//! Client errors carry their detail back to the caller; server errors are
//! logged and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use service::{FieldError, ServiceError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Malformed body, query string or path segment.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unexpected error")]
    Unexpected,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(ServiceError::Validation(_) | ServiceError::DuplicateEmail(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::Database(_)) | Self::Unexpected => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Service(ServiceError::Validation(errors)) => json!({
                "error": "Validation failed",
                "errors": errors,
            }),
            Self::Service(ServiceError::DuplicateEmail(email)) => json!({
                "error": "Email already exists",
                "message": format!("Email already exists: {email}"),
                "errors": [FieldError::new("email", "Email already exists")],
            }),
            Self::Service(ServiceError::NotFound(id)) => json!({
                "error": "Employee not found",
                "message": format!("Employee not found with id: {id}"),
            }),
            Self::BadRequest(message) => json!({
                "error": "Bad request",
                "message": message,
            }),
            Self::Service(ServiceError::Database(e)) => {
                error!("Database error while handling request: {e}");
                json!({
                    "error": "Internal server error",
                    "message": "Database operation failed",
                })
            }
            Self::Unexpected => json!({
                "error": "Internal server error",
                "message": "An unexpected error occurred",
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::DbError;
    use service::ValidationErrors;

    #[test]
    fn statuses_follow_error_kind() {
        let mut errors = ValidationErrors::default();
        errors.push("email", "Email is required");

        assert_eq!(ApiError::from(ServiceError::Validation(errors)).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(ServiceError::DuplicateEmail("a@b.co".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(ServiceError::NotFound(1)).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(ServiceError::Database(DbError::NotFound)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unexpected.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
