use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};

use crate::errors::AppError;
use crate::extract::DocumentFormat;

pub const NO_FILE_MESSAGE: &str = "No resume file uploaded";
pub const NO_JOB_DESCRIPTION_MESSAGE: &str = "Job description is required";
pub const INVALID_TYPE_MESSAGE: &str =
    "Invalid file type. Only PDF, DOC, and DOCX files are allowed.";

const MB: usize = 1024 * 1024;

/// The uploaded resume, already checked for extension and size.
#[derive(Debug)]
pub struct UploadedResume {
    pub file_name: String,
    pub format: DocumentFormat,
    pub content: Bytes,
}

/// Parsed fields of the analyze form. Presence is checked by the handler so
/// the "missing file" message wins over the "missing description" one.
#[derive(Debug, Default)]
pub struct AnalyzeForm {
    pub resume: Option<UploadedResume>,
    pub job_description: Option<String>,
}

/// Reads the `resume` and `jobDescription` fields. Unknown fields are
/// drained and ignored. The file is rejected as soon as it exceeds
/// `max_file_bytes`, without buffering the rest.
pub async fn parse_analyze_form(
    mut multipart: Multipart,
    max_file_bytes: usize,
) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_bytes))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let format = DocumentFormat::from_file_name(&file_name)
                    .map_err(|_| AppError::Validation(INVALID_TYPE_MESSAGE.to_string()))?;
                let content = read_limited(field, max_file_bytes).await?;

                form.resume = Some(UploadedResume {
                    file_name,
                    format,
                    content,
                });
            }
            "jobDescription" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, max_file_bytes))?;
                if !value.trim().is_empty() {
                    form.job_description = Some(value);
                }
            }
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    Ok(form)
}

async fn read_limited(mut field: Field<'_>, max_bytes: usize) -> Result<Bytes, AppError> {
    let mut content = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if content.len() + chunk.len() > max_bytes {
            return Err(too_large(max_bytes));
        }
        content.extend_from_slice(&chunk);
    }
    Ok(content.freeze())
}

fn multipart_error(e: MultipartError, max_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return too_large(max_bytes);
    }
    AppError::Validation(format!("Failed to read form field: {}", e.body_text()))
}

fn too_large(max_bytes: usize) -> AppError {
    AppError::Validation(format!(
        "File too large. Maximum size is {}.",
        describe_limit(max_bytes)
    ))
}

fn describe_limit(bytes: usize) -> String {
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else {
        format!("{bytes} bytes")
    }
}
