//! PDF text-layer extraction.
//!
//! The container is parsed with `lopdf` first so a corrupt upload fails with a
//! clear reason (and so the page count can be logged); the text itself comes
//! from `pdf-extract`, which maps fonts to glyphs across all content streams.
//! Scanned PDFs without a text layer legitimately produce an empty string.

use tracing::debug;

use super::{DocumentFormat, ExtractError};

pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let document = lopdf::Document::load_mem(bytes)
        .map_err(|e| ExtractError::extraction(DocumentFormat::Pdf, format!("invalid PDF: {e}")))?;
    let pages = document.get_pages().len();

    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::extraction(DocumentFormat::Pdf, e))?;

    debug!(pages, chars = text.len(), "Read PDF text layer");
    Ok(text)
}
