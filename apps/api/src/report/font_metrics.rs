//! Static advance-width tables for the PDF base-14 Helvetica family.
//!
//! Widths are in 1/1000 em (the AFM convention) and cover ASCII 0x20..=0x7E.
//! Index = (char as usize) - 32. Oblique shares the upright widths.
//! Anything outside the table falls back to `FALLBACK_WIDTH`, which slightly
//! over-estimates most Latin-1 letters; that only makes wrapping conservative.

/// Font faces used by the report. `resource_name` is the key under the page
/// `/Font` resource dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Regular,
    Bold,
    Oblique,
}

impl Face {
    pub const ALL: [Face; 3] = [Face::Regular, Face::Bold, Face::Oblique];

    pub fn resource_name(&self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
            Face::Oblique => "F3",
        }
    }

    pub fn base_font(&self) -> &'static str {
        match self {
            Face::Regular => "Helvetica",
            Face::Bold => "Helvetica-Bold",
            Face::Oblique => "Helvetica-Oblique",
        }
    }

    fn widths(&self) -> &'static [u16; 95] {
        match self {
            Face::Regular | Face::Oblique => &HELVETICA,
            Face::Bold => &HELVETICA_BOLD,
        }
    }
}

const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
static HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Rendered width of `s` in points at `size_pt`.
pub fn measure(s: &str, face: Face, size_pt: f32) -> f32 {
    let table = face.widths();
    let units: u32 = s
        .chars()
        .map(|c| {
            let code = c as usize;
            if (32..=126).contains(&code) {
                table[code - 32] as u32
            } else {
                FALLBACK_WIDTH as u32
            }
        })
        .sum();
    units as f32 * size_pt / 1000.0
}

/// Cuts `text` back to fit `max_width`, marking the cut with "...".
/// Text that already fits is returned unchanged.
pub fn truncate_to_width(text: &str, face: Face, size_pt: f32, max_width: f32) -> String {
    const ELLIPSIS: &str = "...";
    if measure(text, face, size_pt) <= max_width {
        return text.to_string();
    }

    let mut kept = String::new();
    for c in text.chars() {
        kept.push(c);
        if measure(&format!("{kept}{ELLIPSIS}"), face, size_pt) > max_width {
            kept.pop();
            break;
        }
    }
    let mut truncated = kept.trim_end().to_string();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Greedy word wrap. Explicit newlines start new lines; a word wider than a
/// whole line is split at character boundaries. `first_width` lets the first
/// line share its row with a label.
pub fn wrap(text: &str, face: Face, size_pt: f32, first_width: f32, width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut available = first_width;

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if measure(&candidate, face, size_pt) <= available {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                available = width;
            }
            if measure(word, face, size_pt) <= available {
                line = word.to_string();
            } else {
                for piece in split_long_word(word, face, size_pt, available, width) {
                    if !line.is_empty() {
                        lines.push(std::mem::take(&mut line));
                    }
                    line = piece;
                    available = width;
                }
            }
        }
        lines.push(line);
        available = width;
    }

    lines
}

fn split_long_word(word: &str, face: Face, size_pt: f32, first: f32, width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut limit = first;
    for c in word.chars() {
        current.push(c);
        if measure(&current, face, size_pt) > limit && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
            limit = width;
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
