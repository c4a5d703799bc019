//! Error types for the API layer.
//!
//! Every failure leaving a handler is an [`ApiError`], serialized as
//! `{"success": false, "error": "<message>"}` with the matching HTTP status:
//!
//! ```text
//! ValidationError → 400    NotFoundError → 404    ConflictError → 409
//! everything else → 500 (logged)
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use duka_db::DbError;
use duka_payments::WorkflowError;

/// An HTTP-mappable error.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// 400: missing or malformed input.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// 404: referenced entity absent.
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// 409: unique-constraint collision.
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    /// 500: unexpected failure. The detail goes to the log, not the caller.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "success": false, "error": self.message })),
        )
            .into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Validation(e) => ApiError::validation(e.to_string()),
            WorkflowError::NotFound { .. } => ApiError::not_found(err.to_string()),
            WorkflowError::Conflict { .. } => ApiError::conflict(err.to_string()),
            WorkflowError::Gateway(e) => {
                error!(%e, "Gateway failure");
                ApiError::internal("Payment gateway failure")
            }
            WorkflowError::Store(e) => {
                error!(%e, "Store failure");
                ApiError::internal("Storage failure")
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::not_found(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::conflict(err.to_string()),
            other => {
                error!(%other, "Store failure");
                ApiError::internal("Storage failure")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duka_core::ValidationError;

    #[test]
    fn test_workflow_error_status_mapping() {
        let err: ApiError = WorkflowError::Validation(ValidationError::Required {
            field: "phone".to_string(),
        })
        .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: ApiError = WorkflowError::not_found("Sale", "s-1").into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: ApiError = WorkflowError::Conflict { attempts: 3 }.into();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_db_error_status_mapping() {
        let err: ApiError = DbError::UniqueViolation {
            field: "customers.email".to_string(),
            value: "a@b.c".to_string(),
        }
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err: ApiError = DbError::PoolExhausted.into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
