use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::db::StoreError;
use crate::provisioning::policy::MISSING_FIELDS;
use crate::provisioning::{ProvisionError, ValidationError};

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    BadRequest(String),
    Unprocessable(String),
    PayloadTooLarge(String),
    UnsupportedMediaType(String),
    /// Field-scoped validation failure; either field may be absent.
    Validation {
        slug_error: Option<String>,
        domain_error: Option<String>,
    },
    DomainRejected(String),
    MethodNotAllowed {
        method: Method,
        allow: &'static str,
    },
    Internal(String),
    Database(sqlx::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Unprocessable(msg) => write!(f, "Unprocessable: {msg}"),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload Too Large: {msg}"),
            AppError::UnsupportedMediaType(msg) => write!(f, "Unsupported Media Type: {msg}"),
            AppError::Validation {
                slug_error,
                domain_error,
            } => write!(f, "Validation failed: slug={slug_error:?} domain={domain_error:?}"),
            AppError::DomainRejected(msg) => write!(f, "Domain rejected: {msg}"),
            AppError::MethodNotAllowed { method, .. } => write!(f, "Method {method} Not Allowed"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::Database(err) => write!(f, "Database Error: {err}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Unprocessable(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": msg }))
            }
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, json!({ "error": msg }))
            }
            AppError::UnsupportedMediaType(msg) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, json!({ "error": msg }))
            }
            AppError::Validation {
                slug_error,
                domain_error,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "slugError": slug_error, "domainError": domain_error }),
            ),
            AppError::DomainRejected(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "domainError": msg }))
            }
            AppError::MethodNotAllowed { method, allow } => {
                let body = json!({ "error": format!("Method {method} Not Allowed") });
                return (
                    StatusCode::METHOD_NOT_ALLOWED,
                    [(header::ALLOW, allow)],
                    axum::Json(body),
                )
                    .into_response();
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(err) => AppError::Database(err),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<ProvisionError> for AppError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::Invalid(ValidationError::MissingField) => {
                AppError::Unprocessable(MISSING_FIELDS.to_string())
            }
            ProvisionError::Invalid(ValidationError::Invalid {
                slug_error,
                domain_error,
            }) => AppError::Validation {
                slug_error,
                domain_error,
            },
            ProvisionError::DomainRejected(msg) => AppError::DomainRejected(msg),
            ProvisionError::Conflict => {
                AppError::BadRequest("Project slug already exists".to_string())
            }
            ProvisionError::Store(err) => err.into(),
            other => AppError::Internal(other.to_string()),
        }
    }
}
