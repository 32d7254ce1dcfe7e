use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use coursescope_catalog::CatalogError;

/// A request the server refuses to process.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MalformedInputError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("Uploaded file is not a PDF")]
    NotPdf,
    #[error("Invalid majorId: {0:?}")]
    InvalidMajorId(String),
    #[error("Failed to read upload: {0}")]
    Multipart(String),
}

/// Every error a handler can return, rendered as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(MalformedInputError),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(e) => e.to_string(),
            ApiError::NotFound(m) | ApiError::Internal(m) => m.clone(),
        }
    }
}

impl From<MalformedInputError> for ApiError {
    fn from(e: MalformedInputError) -> Self {
        ApiError::BadRequest(e)
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::MajorNotFound(_) | CatalogError::CourseNotFound(_) => {
                ApiError::NotFound(e.to_string())
            }
            other => {
                tracing::error!(error = %other, "catalog query failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(serde_json::json!({ "error": self.message() })),
        )
            .into_response()
    }
}
