//! Document Text Extractor: turns an uploaded resume into plain text.
//!
//! Dispatch is a closed enum over the accepted formats; adding a format means
//! adding a variant and its arm in [`extract_text`].
//! Parsing is CPU-bound, so the async entry point runs it on the blocking pool.

mod doc;
mod docx;
mod pdf;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Doc,
    Docx,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to extract text from {format}: {reason}")]
    Extraction {
        format: DocumentFormat,
        reason: String,
    },
}

impl ExtractError {
    pub(crate) fn extraction(format: DocumentFormat, reason: impl fmt::Display) -> Self {
        ExtractError::Extraction {
            format,
            reason: reason.to_string(),
        }
    }
}

impl DocumentFormat {
    /// Accepts `pdf`, `.pdf`, `PDF`, ...
    pub fn from_extension(ext: &str) -> Result<Self, ExtractError> {
        let normalized = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "doc" => Ok(DocumentFormat::Doc),
            "docx" => Ok(DocumentFormat::Docx),
            _ => Err(ExtractError::UnsupportedFormat(format!(".{normalized}"))),
        }
    }

    pub fn from_file_name(name: &str) -> Result<Self, ExtractError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Doc => "DOC",
            DocumentFormat::Docx => "DOCX",
        })
    }
}

/// Extracts text on the blocking pool. A panic inside a format parser is
/// reported as an extraction failure rather than tearing down the request.
pub async fn extract(path: PathBuf, format: DocumentFormat) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || extract_text(&path, format))
        .await
        .map_err(|e| ExtractError::extraction(format, format!("parser aborted: {e}")))?
}

/// Synchronous extraction. An empty document yields an empty string.
pub fn extract_text(path: &Path, format: DocumentFormat) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path)?;
    let raw = match format {
        DocumentFormat::Docx => docx::extract(&bytes)?,
        DocumentFormat::Doc => doc::extract(&bytes)?,
        DocumentFormat::Pdf => pdf::extract(&bytes)?,
    };
    let text = normalize_whitespace(&raw);
    debug!(%format, chars = text.len(), "Extracted resume text");
    Ok(text)
}

/// Trims trailing spaces per line, collapses runs of blank lines to one, and
/// trims the document as a whole.
pub(crate) fn normalize_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0;
    for line in raw.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension_is_case_and_dot_insensitive() {
        assert_eq!(DocumentFormat::from_extension(".PDF").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_extension("docx").unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_extension(".Doc").unwrap(), DocumentFormat::Doc);
    }

    #[test]
    fn test_unsupported_extension_is_named_in_error() {
        let err = DocumentFormat::from_extension(".txt").unwrap_err();
        assert!(matches!(&err, ExtractError::UnsupportedFormat(ext) if ext == ".txt"));
        assert_eq!(err.to_string(), "Unsupported file type: .txt");
    }

    #[test]
    fn test_from_file_name_without_extension_is_unsupported() {
        assert!(matches!(
            DocumentFormat::from_file_name("resume"),
            Err(ExtractError::UnsupportedFormat(_))
        ));
        assert_eq!(
            DocumentFormat::from_file_name("my.resume.docx").unwrap(),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn test_normalize_whitespace_collapses_blank_runs() {
        let raw = "Jane Doe   \n\n\n\nSkills: Go, Rust  \n\n";
        assert_eq!(normalize_whitespace(raw), "Jane Doe\n\nSkills: Go, Rust");
    }

    #[test]
    fn test_normalize_whitespace_empty_stays_empty() {
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace("  \n \n"), "");
    }

    #[tokio::test]
    async fn test_extract_docx_round_trip_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.docx");
        let bytes = fixtures::docx_with_paragraphs(&["Jane Doe", "Skills: Go, Rust"]);
        std::fs::write(&path, bytes).unwrap();

        let text = extract(path, DocumentFormat::Docx).await.unwrap();
        assert_eq!(text, "Jane Doe\nSkills: Go, Rust");
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract(dir.path().join("gone.pdf"), DocumentFormat::Pdf)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }

    #[tokio::test]
    async fn test_extract_garbage_docx_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.docx");
        std::fs::write(&path, b"definitely not a zip").unwrap();

        let err = extract(path, DocumentFormat::Docx).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Extraction {
                format: DocumentFormat::Docx,
                ..
            }
        ));
    }
}
