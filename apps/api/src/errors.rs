use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::extract::ExtractError;
use crate::report::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Client errors carry their message through; server errors are logged with
/// their cause and answered with a fixed message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Analysis parse error: {0}")]
    AnalysisParse(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::UnsupportedFormat(_) => AppError::UnsupportedFormat(e.to_string()),
            ExtractError::Io(_) | ExtractError::Extraction { .. } => {
                AppError::Extraction(e.to_string())
            }
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::InvalidInput(msg) => AppError::Validation(msg),
            AnalysisError::Configuration(_) => AppError::Configuration(e.to_string()),
            AnalysisError::Upstream(_) => AppError::Upstream(e.to_string()),
            AnalysisError::Parse(_) => AppError::AnalysisParse(e.to_string()),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        AppError::Render(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) | AppError::UnsupportedFormat(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Extraction(msg) => {
                tracing::error!("Extraction error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract text from resume".to_string(),
                )
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Analysis service is not configured".to_string(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The analysis service is currently unavailable".to_string(),
                )
            }
            AppError::AnalysisParse(msg) => {
                tracing::error!("Analysis parse error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The analysis service returned an unreadable result".to_string(),
                )
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate report".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
