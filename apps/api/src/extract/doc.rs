//! Legacy Word (`.doc`) text recovery.
//!
//! Many `.doc` uploads are really `.docx` packages with the wrong extension;
//! those go through the WordprocessingML path. Genuine Word 97-2003 binaries
//! (OLE2 compound files) are scanned for text runs in both encodings Word
//! uses: UTF-16LE at either byte alignment and single-byte (compressed) text.
//! A document routinely mixes them, with an 8-bit body next to UTF-16 style
//! and font names, so every run is kept and the runs are emitted in file order.

use super::{docx, DocumentFormat, ExtractError};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
/// Shorter runs are overwhelmingly table/stream noise.
const MIN_RUN_CHARS: usize = 4;

pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    if bytes.starts_with(ZIP_MAGIC) {
        return docx::extract_as(bytes, DocumentFormat::Doc);
    }
    if !bytes.starts_with(OLE_MAGIC) {
        return Err(ExtractError::extraction(
            DocumentFormat::Doc,
            "not a Word document (unrecognized file signature)",
        ));
    }

    let body = &bytes[OLE_MAGIC.len()..];
    let mut runs = byte_runs(body);
    runs.extend(utf16_runs(body, 0));
    runs.extend(utf16_runs(body, 1));
    runs.sort_by_key(|(offset, _)| *offset);

    let texts: Vec<String> = runs.into_iter().map(|(_, text)| text).collect();
    Ok(texts.join("\n"))
}

fn is_text_char(c: char) -> bool {
    c == '\t' || c == '\r' || c == '\n' || (!c.is_control() && c != '\u{fffd}')
}

/// Text runs found by one scan, tagged with the byte offset they start at.
#[derive(Default)]
struct RunCollector {
    found: Vec<(usize, String)>,
    run: String,
    start: usize,
}

impl RunCollector {
    fn push(&mut self, offset: usize, c: char) {
        if self.run.is_empty() {
            self.start = offset;
        }
        self.run.push(c);
    }

    fn flush(&mut self) {
        let trimmed = self.run.trim();
        if trimmed.chars().filter(|c| c.is_alphanumeric()).count() >= MIN_RUN_CHARS {
            self.found.push((self.start, trimmed.replace('\r', "\n")));
        }
        self.run.clear();
    }

    fn finish(mut self) -> Vec<(usize, String)> {
        self.flush();
        self.found
    }
}

/// Latin-1, Latin Extended-A/B and general punctuation (dashes, curly quotes,
/// bullets). Wider ranges let pairs of ASCII bytes masquerade as CJK text.
fn is_word_text_unit(unit: u16) -> bool {
    unit < 0x0250 || (0x2010..=0x2027).contains(&unit)
}

/// UTF-16LE runs starting at byte `parity` (0 or 1).
fn utf16_runs(bytes: &[u8], parity: usize) -> Vec<(usize, String)> {
    let mut runs = RunCollector::default();
    let aligned = bytes.get(parity..).unwrap_or_default();
    for (i, pair) in aligned.chunks_exact(2).enumerate() {
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        let decoded = char::from_u32(unit as u32)
            .filter(|c| is_text_char(*c) && is_word_text_unit(unit));
        match decoded {
            Some(c) => runs.push(parity + 2 * i, c),
            None => runs.flush(),
        }
    }
    runs.finish()
}

fn byte_runs(bytes: &[u8]) -> Vec<(usize, String)> {
    let mut runs = RunCollector::default();
    for (offset, &b) in bytes.iter().enumerate() {
        if b.is_ascii_graphic() || matches!(b, b' ' | b'\t' | b'\r' | b'\n') {
            runs.push(offset, b as char);
        } else {
            runs.flush();
        }
    }
    runs.finish()
}
