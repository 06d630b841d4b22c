use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::StoreError;
use crate::storage::StorageError;

/// Which unique attribute a duplicate was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Email,
    MobileNumber,
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DuplicateField::Email => "Email",
            DuplicateField::MobileNumber => "Mobile number",
        };
        f.write_str(name)
    }
}

/// Application-wide error taxonomy. Each variant maps to a stable error
/// code and status; internal detail is logged, never returned to clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Error parsing request body")]
    Parse(String),

    #[error("Missing required field: {0}")]
    Validation(String),

    #[error("{0} already exists")]
    Duplicate(DuplicateField),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Error uploading file to storage")]
    Upload(#[from] StorageError),

    #[error("Internal server error")]
    Internal(String),
}

/// Error body returned for every failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }
}

impl ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::Parse(_) => "PARSE_ERROR",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Duplicate(_) => "DUPLICATE_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Upload(_) => "UPLOAD_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Parse(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Duplicate(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upload(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Parse(detail) => {
                tracing::debug!("Request body rejected: {}", detail);
            }
            ApiError::Upload(err) => {
                tracing::error!("Blob upload failed: {}", err);
            }
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
            }
            _ => {}
        }

        let body = Json(ErrorResponse::new(self.error_code(), self.to_string()));
        (self.status_code(), body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => ApiError::Duplicate(field),
            StoreError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}
