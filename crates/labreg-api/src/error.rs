//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps schema validation issues, password hashing failures and database
//! errors to HTTP status codes with a uniform
//! JSON body. Never exposes internal error details in responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use labreg_schema::{ErrorExample, Issue};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::openapi::schema::{ArrayBuilder, ObjectBuilder, Schema, SchemaType};
use utoipa::openapi::RefOr;
use utoipa::ToSchema;

use crate::password::PasswordError;

/// Structured JSON error response body.
///
/// All error responses use this format. `issues` is present only when a
/// request body failed schema validation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Individual validation issues, in the order they were found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<IssueBody>>)]
    pub issues: Option<Vec<ErrorExample>>,
}

/// OpenAPI description of one entry in `error.issues`.
///
/// The entries themselves are [`ErrorExample`]s, the same type the
/// documentation examples are built from.
pub struct IssueBody;

impl<'s> ToSchema<'s> for IssueBody {
    fn schema() -> (&'s str, RefOr<Schema>) {
        let string = || ObjectBuilder::new().schema_type(SchemaType::String);
        let schema = ObjectBuilder::new()
            .property(
                "code",
                string().description(Some("Issue code, e.g. `too_small`, `invalid_string`.")),
            )
            .required("code")
            .property(
                "path",
                ArrayBuilder::new()
                    .items(ObjectBuilder::new().schema_type(SchemaType::Value))
                    .description(Some("Object keys and array indices leading to the offending value.")),
            )
            .required("path")
            .property("message", string())
            .required("message")
            .into();
        ("IssueBody", schema)
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request body failed schema validation (422, with issues).
    #[error("request body failed validation ({} issue(s))", .0.len())]
    Validation(Vec<Issue>),

    /// Request was well-formed but semantically invalid (422).
    #[error("unprocessable: {0}")]
    Unprocessable(String),

    /// Request body could not be parsed as JSON (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),

    /// A dependency such as the database is unavailable (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) | Self::Unprocessable(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
            }
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }

    /// Build the uniform JSON body for this error.
    pub fn to_body(&self) -> ErrorBody {
        let (_, code) = self.status_and_code();
        let (message, issues) = match self {
            Self::Internal(_) => ("An internal error occurred".to_string(), None),
            Self::Validation(issues) => (
                "Request body failed validation".to_string(),
                Some(issues.iter().cloned().map(ErrorExample::from).collect()),
            ),
            other => (other.to_string(), None),
        };
        ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                issues,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, _) = self.status_and_code();

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        } else if matches!(&self, Self::ServiceUnavailable(_)) {
            tracing::warn!(error = %self, "dependency unavailable");
        }

        (status, Json(self.to_body())).into_response()
    }
}

/// Password hashing failures are never the client's fault.
impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Map database errors: constraint violations are client errors, the rest
/// is internal.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound("record not found".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict("a record with the same unique key already exists".to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                Self::Unprocessable("referenced record does not exist".to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::ServiceUnavailable("database unavailable".to_string())
            }
            _ => Self::Internal(err.to_string()),
        }
    }
}
