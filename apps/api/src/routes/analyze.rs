use anyhow::{anyhow, Context};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use tracing::info;

use crate::analysis::{self, AnalysisResult};
use crate::errors::AppError;
use crate::extract::{self, DocumentFormat};
use crate::routes::upload::{parse_analyze_form, NO_FILE_MESSAGE, NO_JOB_DESCRIPTION_MESSAGE};
use crate::state::AppState;
use crate::storage::StoredFileGuard;

/// POST /api/analyze
/// Multipart form: `resume` (PDF/DOC/DOCX) and `jobDescription` (text).
/// The upload lives in the file store only for the duration of the request.
pub async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let form = parse_analyze_form(multipart, state.config.max_upload_bytes).await?;

    let resume = form
        .resume
        .ok_or_else(|| AppError::Validation(NO_FILE_MESSAGE.to_string()))?;
    let job_description = form
        .job_description
        .ok_or_else(|| AppError::Validation(NO_JOB_DESCRIPTION_MESSAGE.to_string()))?;

    info!(
        file_name = %resume.file_name,
        format = %resume.format,
        bytes = resume.content.len(),
        "Analyzing resume"
    );

    let guard = state
        .store
        .acquire(&resume.content, &resume.file_name)
        .await
        .context("Failed to store uploaded resume")?;

    let outcome = extract_and_analyze(&state, &guard, resume.format, &job_description).await;
    guard.release().await;

    outcome.map(Json)
}

async fn extract_and_analyze(
    state: &AppState,
    guard: &StoredFileGuard,
    format: DocumentFormat,
    job_description: &str,
) -> Result<AnalysisResult, AppError> {
    // Resolving through the store refreshes the entry's expiry and catches a
    // record the sweep has already reclaimed.
    let path = state
        .store
        .lookup(guard.id())
        .ok_or_else(|| anyhow!("stored resume {} expired before extraction", guard.id()))?;
    let text = extract::extract(path, format).await?;
    let result = analysis::analyze(state.provider.as_ref(), &text, job_description).await?;
    Ok(result)
}
