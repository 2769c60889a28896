use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// A candidate document whose text could not be extracted.
///
/// Per-document and recoverable: the candidate is dropped from the report and the
/// error is returned to the caller in the run's warning list.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("could not extract text from '{document}': {reason}")]
pub struct ExtractionError {
    pub document: String,
    pub reason: String,
}

impl ExtractionError {
    pub fn new(document: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            reason: reason.into(),
        }
    }
}

/// Terminal failures of a ranking run. Any of these aborts the run and leaves the
/// previously persisted report untouched.
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Failed to write report to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Ranking(#[from] RankingError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Ranking(RankingError::MissingInput(msg)) => {
                (StatusCode::BAD_REQUEST, "MISSING_INPUT", msg.clone())
            }
            AppError::Ranking(e @ RankingError::Io { .. }) => {
                tracing::error!("Report persistence error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "REPORT_IO_ERROR",
                    "The ranking report could not be saved".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error_names_document() {
        let err = ExtractionError::new("broken.pdf", "invalid file header");
        assert_eq!(
            err.to_string(),
            "could not extract text from 'broken.pdf': invalid file header"
        );
    }

    #[test]
    fn test_missing_input_maps_to_bad_request() {
        let response =
            AppError::from(RankingError::MissingInput("no job description".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_report_io_maps_to_internal_error() {
        let err = RankingError::Io {
            path: PathBuf::from("/nowhere/report.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/nowhere/report.csv"));
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
