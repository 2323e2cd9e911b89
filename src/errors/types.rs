//! Error type definitions for the drop-search services
//!
//! One application-level error enum shared by all three services, with an
//! `IntoResponse` impl so handlers can propagate errors with `?` and still
//! produce consistent JSON error bodies.
//!
//! The taxonomy follows the aggregation contract: logical absence is not an
//! error (it is an empty collection or `exists=false` at the call site),
//! downstream HTTP errors keep their original status, transport-level
//! failures collapse to a generic 500, and cache failures never reach this
//! type at all because the cache layer swallows them.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A downstream service answered with a 4xx/5xx status
    #[error("Downstream error: {status} - {body}")]
    Downstream { status: StatusCode, body: String },

    /// Connection refused, timeout, DNS failure and friends
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Object-storage errors other than a missing object
    #[error("Storage error: {0}")]
    Storage(#[from] object_store::Error),

    /// Malformed request body/params, rejected before any downstream call
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Convenience type alias for fallible service and handler results
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Wrap a downstream HTTP error, keeping the original status and body
    pub fn downstream(status: StatusCode, body: impl Into<String>) -> Self {
        Self::Downstream {
            status,
            body: body.into(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // Status-carrying errors are produced explicitly by the clients so
        // the body text survives; anything arriving here is transport-level.
        Self::Transport {
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                format!("{resource} with id {id} not found"),
            ),
            // Matches the status axum's extractors use for rejected bodies,
            // so validation failures look the same from either layer.
            AppError::Validation { message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message.clone())
            }
            // Propagated unchanged so the caller sees the real downstream status
            AppError::Downstream { status, body } => (*status, body.clone()),
            AppError::Transport { message } => {
                tracing::error!(error = %message, "Transport error talking to downstream service");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error connecting to downstream service".to_string(),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Object storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
            AppError::Configuration { message } | AppError::Internal { message } => {
                tracing::error!(error = %message, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = json!({ "detail": message });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downstream_errors_keep_their_status() {
        let err = AppError::downstream(StatusCode::BAD_GATEWAY, "upstream broke");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn transport_errors_collapse_to_500() {
        let err = AppError::Transport {
            message: "connection refused".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_maps_to_422() {
        let err = AppError::validation("name must not be empty");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::not_found("drop record", "42");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
