//! Raw text from a WordprocessingML (`.docx`) package.
//!
//! Reads `word/document.xml` out of the ZIP container and streams it: text of
//! `<w:t>` runs is concatenated, `<w:tab/>` becomes a tab, `<w:br/>`/`<w:cr/>`
//! a newline, and every closing `</w:p>` ends a line.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{DocumentFormat, ExtractError};

const DOCUMENT_PART: &str = "word/document.xml";

pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    extract_as(bytes, DocumentFormat::Docx)
}

/// Shared with the `.doc` path, which accepts renamed `.docx` files.
pub(super) fn extract_as(bytes: &[u8], format: DocumentFormat) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::extraction(format, format!("not a valid package: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::extraction(format, format!("missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::extraction(format, format!("unreadable {DOCUMENT_PART}: {e}")))?;

    document_text(&xml).map_err(|e| ExtractError::extraction(format, e))
}

fn document_text(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let text = t
                    .unescape()
                    .map_err(|e| format!("bad text at {}: {e}", reader.buffer_position()))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "malformed XML at {}: {e}",
                    reader.buffer_position()
                ))
            }
        }
    }

    Ok(out)
}
