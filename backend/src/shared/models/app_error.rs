use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    ado::client::AdoError,
    data_access::data_context::StoreError,
};

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Server-side settings are missing (PAT, organization).
    #[error("{message}")]
    Configuration { code: &'static str, message: String },

    #[error("{message}")]
    Authentication { code: &'static str, message: String },

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("{message}")]
    Validation {
        code: &'static str,
        message: String,
        details: Vec<FieldError>,
    },

    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error("{message}")]
    Upstream { code: &'static str, message: String },

    #[error("Too many requests, please try again later.")]
    RateLimited,

    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
    #[serde(skip_serializing_if = "<[FieldError]>::is_empty")]
    details: &'a [FieldError],
}

impl AppError {
    pub fn validation(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        AppError::Validation { code: "VALIDATION_ERROR", message: message.into(), details }
    }

    pub fn invalid_input(details: Vec<FieldError>) -> Self {
        Self::validation("Invalid input data", details)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Authentication { code: "UNAUTHORIZED", message: message.into() }
    }

    pub fn task_not_found() -> Self {
        AppError::NotFound { code: "TASK_NOT_FOUND", message: "Task not found".to_string() }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Configuration { code, .. }
            | AppError::Authentication { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Validation { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Upstream { code, .. } => code,
            AppError::RateLimited => "RATE_LIMIT_EXCEEDED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        match &self {
            AppError::Internal(message) => {
                tracing::error!(code, %message, "request failed");
            }
            AppError::Upstream { message, .. } | AppError::Configuration { message, .. } => {
                tracing::error!(code, %message, "request failed");
            }
            other => tracing::warn!(code, message = %other, "request rejected"),
        }

        // Storage and other internal details stay in the log.
        let message = match &self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        let details: &[FieldError] = match &self {
            AppError::Validation { details, .. } => details,
            _ => &[],
        };

        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody { code, message, details },
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::EmailTaken(email) => AppError::Conflict {
                code: "EMAIL_TAKEN",
                message: format!("A user with email {email} already exists"),
            },
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<AdoError> for AppError {
    fn from(e: AdoError) -> Self {
        match e {
            AdoError::NotInitialized => AppError::Validation {
                code: "ADO_NOT_INITIALIZED",
                message: "ADO service not initialized. PAT configuration error.".to_string(),
                details: Vec::new(),
            },
            AdoError::ProjectNotFound(_) => AppError::NotFound {
                code: "PROJECT_NOT_FOUND",
                message: e.to_string(),
            },
            AdoError::Request(request) => match request.status_code {
                Some(401) | Some(403) => AppError::Authentication {
                    code: "ADO_AUTHENTICATION_FAILED",
                    message: request.message,
                },
                Some(404) => AppError::NotFound {
                    code: "WORK_ITEM_NOT_FOUND",
                    message: request.message,
                },
                _ => AppError::Upstream {
                    code: "ADO_REQUEST_FAILED",
                    message: request.message,
                },
            },
        }
    }
}
