use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info};

use crate::analysis::validation::validate_analysis;
use crate::analysis::AnalysisResult;
use crate::errors::AppError;
use crate::report::{self, REPORT_FILENAME};

pub const REPORT_FIELDS_MESSAGE: &str = "Resume filename and analysis results are required";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default)]
    pub resume_file_name: Option<String>,
    #[serde(default)]
    pub analysis_result: Option<AnalysisResult>,
}

/// POST /api/generate-report
/// Renders a previously returned analysis as a downloadable PDF.
pub async fn generate_report_handler(
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|e| {
        debug!("Rejected report body: {}", e.body_text());
        AppError::Validation(REPORT_FIELDS_MESSAGE.to_string())
    })?;

    let resume_name = request
        .resume_file_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::Validation(REPORT_FIELDS_MESSAGE.to_string()))?;
    let analysis = request
        .analysis_result
        .ok_or_else(|| AppError::Validation(REPORT_FIELDS_MESSAGE.to_string()))?;
    let analysis = validate_analysis(analysis).map_err(|problems| {
        AppError::Validation(format!("Invalid analysis results: {}", problems.join("; ")))
    })?;

    let pdf = report::render(resume_name.clone(), analysis).await?;
    info!(resume = %resume_name, bytes = pdf.len(), "Generated report");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={REPORT_FILENAME}"),
            ),
            (header::CONTENT_LENGTH, pdf.len().to_string()),
        ],
        pdf,
    )
        .into_response())
}
