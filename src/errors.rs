//! Error handling for the API.
//!
//! Every failure maps to one taxonomy entry with a fixed HTTP status and a
//! sanitized, user-facing message in the same JSON envelope the success
//! responses use. Backend errors are logged through `tracing` and never
//! leak internals to clients.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// 400 — the path id is not a well-formed integer.
    InvalidIdentifier,

    /// 400 — mandatory payload fields are missing or empty.
    Validation { missing: Vec<&'static str> },

    /// 400 — a uniqueness rule was violated (email already taken).
    DuplicateKey { message: &'static str },

    /// 400 — a query parameter could not be parsed as its declared type.
    InvalidParameter { parameter: String },

    /// 404 — the addressed record does not exist.
    NotFound { resource: &'static str },

    /// 500 — any other backend failure. Details are logged, not returned.
    Storage { internal: DbErr },
}

impl ApiError {
    #[must_use]
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    #[must_use]
    pub fn validation(missing: Vec<&'static str>) -> Self {
        Self::Validation { missing }
    }

    #[must_use]
    pub fn duplicate_key(message: &'static str) -> Self {
        Self::DuplicateKey { message }
    }

    #[must_use]
    pub fn invalid_parameter(parameter: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
        }
    }

    #[must_use]
    pub fn storage(internal: DbErr) -> Self {
        Self::Storage { internal }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier
            | Self::Validation { .. }
            | Self::DuplicateKey { .. }
            | Self::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::InvalidIdentifier => "Invalid id".to_string(),
            Self::Validation { .. } => "Incomplete data".to_string(),
            Self::DuplicateKey { message } => (*message).to_string(),
            Self::InvalidParameter { parameter } => {
                format!("Invalid value for parameter '{parameter}'")
            }
            Self::NotFound { resource } => format!("{resource} not found"),
            Self::Storage { .. } => "Internal server error".to_string(),
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            Self::Validation { missing } => Some(format!("{} are required", missing.join(", "))),
            _ => None,
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Storage { internal } => {
                tracing::error!(error = ?internal, "storage error");
            }
            other => {
                tracing::debug!(
                    status = %other.status_code(),
                    message = %other.user_message(),
                    "request rejected"
                );
            }
        }
    }
}

/// Error half of the response envelope.
#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorDetail>,
}

#[derive(Serialize)]
struct ErrorDetail {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();
        let body = ErrorBody {
            status: "error",
            message: self.user_message(),
            error: self.detail().map(|detail| ErrorDetail { detail }),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}
