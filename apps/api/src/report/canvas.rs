//! Top-down page canvas over lopdf content operations.
//!
//! The cursor tracks the top edge of the next row in PDF user space (origin
//! bottom-left). Every drawing helper reserves its row with `ensure_space`,
//! so page breaks happen between rows and never inside one.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use super::font_metrics::{self, Face};
use super::style::Rgb;
use super::RenderError;

/// Minimum vertical room between the margins for a usable page.
const MIN_CONTENT_HEIGHT: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    /// A4 portrait in points with 50pt margins.
    pub const A4: PageGeometry = PageGeometry {
        width: 595.0,
        height: 842.0,
        margin: 50.0,
    };

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    fn top(&self) -> f32 {
        self.height - self.margin
    }

    fn bottom(&self) -> f32 {
        self.margin
    }

    fn validate(&self) -> Result<(), RenderError> {
        let finite = [self.width, self.height, self.margin]
            .iter()
            .all(|v| v.is_finite());
        if !finite
            || self.margin < 0.0
            || self.content_width() <= 0.0
            || self.height - 2.0 * self.margin < MIN_CONTENT_HEIGHT
        {
            return Err(RenderError::Layout(format!(
                "page {}x{} with margin {} leaves no room for content",
                self.width, self.height, self.margin
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub face: Face,
    pub size: f32,
    pub color: Rgb,
}

impl TextStyle {
    pub const fn new(face: Face, size: f32, color: Rgb) -> Self {
        Self { face, size, color }
    }

    pub fn leading(&self) -> f32 {
        self.size * 1.35
    }
}

pub struct Canvas {
    geometry: PageGeometry,
    finished: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    cursor: f32,
}

impl Canvas {
    pub fn new(geometry: PageGeometry) -> Result<Self, RenderError> {
        geometry.validate()?;
        Ok(Self {
            geometry,
            finished: Vec::new(),
            current: Vec::new(),
            cursor: geometry.top(),
        })
    }

    /// Pages drawn so far. A page break with nothing drawn after it does not
    /// count, so a section ending exactly at the bottom margin adds no page.
    pub fn page_count(&self) -> usize {
        self.finished.len() + usize::from(self.has_open_page())
    }

    fn has_open_page(&self) -> bool {
        !self.current.is_empty() || self.finished.is_empty()
    }

    pub fn new_page(&mut self) {
        self.finished.push(std::mem::take(&mut self.current));
        self.cursor = self.geometry.top();
    }

    /// Starts a new page unless `height` fits above the bottom margin. A row
    /// taller than a whole page is placed at the top of a fresh page and
    /// allowed to overflow.
    pub fn ensure_space(&mut self, height: f32) {
        if self.cursor - height < self.geometry.bottom() && self.cursor < self.geometry.top() {
            self.new_page();
        }
    }

    pub fn move_down(&mut self, amount: f32) {
        self.cursor -= amount;
        if self.cursor <= self.geometry.bottom() {
            self.new_page();
        }
    }

    /// Wrapped text starting at the left margin plus `indent`.
    pub fn paragraph(&mut self, text: &str, style: TextStyle, indent: f32) {
        let width = self.geometry.content_width() - indent;
        for line in font_metrics::wrap(text, style.face, style.size, width, width) {
            let leading = style.leading();
            self.ensure_space(leading);
            if !line.is_empty() {
                let x = self.geometry.margin + indent;
                self.current
                    .extend(text_ops(x, self.cursor - style.size, &line, style));
            }
            self.cursor -= leading;
        }
    }

    /// Single centered line.
    pub fn centered(&mut self, text: &str, style: TextStyle) {
        let leading = style.leading();
        self.ensure_space(leading);
        let x = self.centered_x(font_metrics::measure(text, style.face, style.size));
        self.current
            .extend(text_ops(x, self.cursor - style.size, text, style));
        self.cursor -= leading;
    }

    /// `label` followed by wrapped `text` on the same first row.
    pub fn labeled(
        &mut self,
        label: &str,
        label_style: TextStyle,
        text: &str,
        style: TextStyle,
        indent: f32,
    ) {
        let x = self.geometry.margin + indent;
        let width = self.geometry.content_width() - indent;
        let label = format!("{label} ");
        let label_width = font_metrics::measure(&label, label_style.face, label_style.size);
        let lines = font_metrics::wrap(
            text,
            style.face,
            style.size,
            (width - label_width).max(0.0),
            width,
        );
        let size = style.size.max(label_style.size);
        let leading = style.leading().max(label_style.leading());

        for (i, line) in lines.iter().enumerate() {
            self.ensure_space(leading);
            let baseline = self.cursor - size;
            if i == 0 {
                self.current.extend(text_ops(x, baseline, &label, label_style));
                if !line.is_empty() {
                    self.current
                        .extend(text_ops(x + label_width, baseline, line, style));
                }
            } else if !line.is_empty() {
                self.current.extend(text_ops(x, baseline, line, style));
            }
            self.cursor -= leading;
        }
    }

    /// Wrapped text on a tinted band with a thin accent bar on the left.
    /// Each line carries its own band so the block can break across pages.
    pub fn highlighted(
        &mut self,
        text: &str,
        style: TextStyle,
        indent: f32,
        background: Rgb,
        accent: Rgb,
    ) {
        const PAD: f32 = 6.0;
        let x = self.geometry.margin + indent;
        let band_width = self.geometry.content_width() - indent;
        let inner = band_width - 2.0 * PAD;
        let leading = style.leading();

        for line in font_metrics::wrap(text, style.face, style.size, inner, inner) {
            self.ensure_space(leading);
            let top = self.cursor;
            self.fill_rect(x, top, band_width, leading, background);
            self.fill_rect(x, top, 2.0, leading, accent);
            if !line.is_empty() {
                self.current
                    .extend(text_ops(x + PAD, top - style.size, &line, style));
            }
            self.cursor -= leading;
        }
    }

    /// Wrapped heading followed by a filled badge. The badge shares the last
    /// heading line when it fits, otherwise it gets a row of its own.
    pub fn heading_with_badge(
        &mut self,
        text: &str,
        style: TextStyle,
        badge: &str,
        badge_style: TextStyle,
        badge_color: Rgb,
    ) {
        const PAD: f32 = 4.0;
        const GAP: f32 = 8.0;
        let left = self.geometry.margin;
        let right = left + self.geometry.content_width();
        let leading = style.leading();
        let badge_width =
            font_metrics::measure(badge, badge_style.face, badge_style.size) + 2.0 * PAD;
        let badge_height = badge_style.size + 4.0;

        let lines = font_metrics::wrap(
            text,
            style.face,
            style.size,
            self.geometry.content_width(),
            self.geometry.content_width(),
        );
        let last = lines.len().saturating_sub(1);
        let mut badge_x = left;
        let mut own_row = true;
        for (i, line) in lines.iter().enumerate() {
            self.ensure_space(leading);
            self.current
                .extend(text_ops(left, self.cursor - style.size, line, style));
            if i == last {
                let after = left + font_metrics::measure(line, style.face, style.size) + GAP;
                if after + badge_width <= right {
                    badge_x = after;
                    own_row = false;
                    break;
                }
            }
            self.cursor -= leading;
        }
        if own_row {
            self.ensure_space(leading);
        }

        let baseline = self.cursor - style.size;
        self.fill_rect(
            badge_x,
            baseline - 2.0 + badge_height,
            badge_width,
            badge_height,
            badge_color,
        );
        self.current
            .extend(text_ops(badge_x + PAD, baseline, badge, badge_style));
        self.cursor -= leading;
    }

    /// Full-width track with `fraction` of it filled. Nothing is filled at 0.
    pub fn progress_bar(&mut self, fraction: f32, height: f32, track: Rgb, fill: Rgb) {
        self.ensure_space(height);
        let width = self.geometry.content_width();
        let top = self.cursor;
        self.fill_rect(self.geometry.margin, top, width, height, track);
        let filled = width * fraction.clamp(0.0, 1.0);
        if filled > 0.0 {
            self.fill_rect(self.geometry.margin, top, filled, height, fill);
        }
        self.cursor -= height;
    }

    /// Filled rectangle whose top edge is at `top`.
    pub fn fill_rect(&mut self, x: f32, top: f32, width: f32, height: f32, color: Rgb) {
        let [r, g, b] = color.components();
        self.current.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", vec![real(r), real(g), real(b)]),
            Operation::new(
                "re",
                vec![real(x), real(top - height), real(width), real(height)],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    #[cfg(test)]
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.finished.iter().flatten().chain(self.current.iter())
    }

    fn centered_x(&self, text_width: f32) -> f32 {
        self.geometry.margin + ((self.geometry.content_width() - text_width) / 2.0).max(0.0)
    }

    /// Stamps `footer(page, total)` centered in the bottom margin of every
    /// page, then serializes the document.
    pub fn finish(
        mut self,
        title: &str,
        footer_style: TextStyle,
        footer: impl Fn(usize, usize) -> String,
    ) -> Result<Vec<u8>, RenderError> {
        let open = self.has_open_page();
        let mut pages = std::mem::take(&mut self.finished);
        if open {
            pages.push(std::mem::take(&mut self.current));
        }
        let total = pages.len();
        let baseline = self.geometry.margin / 2.0;

        let pages: Vec<Vec<Operation>> = pages
            .into_iter()
            .enumerate()
            .map(|(i, mut operations)| {
                let text = footer(i + 1, total);
                let width = font_metrics::measure(&text, footer_style.face, footer_style.size);
                operations.extend(text_ops(
                    self.centered_x(width),
                    baseline,
                    &text,
                    footer_style,
                ));
                operations
            })
            .collect();

        serialize(self.geometry, title, pages)
    }
}

fn serialize(
    geometry: PageGeometry,
    title: &str,
    pages: Vec<Vec<Operation>>,
) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for face in Face::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let count = pages.len() as i64;
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let encoded = Content { operations }
            .encode()
            .map_err(|e| RenderError::Serialize(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), real(geometry.width), real(geometry.height)],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(title)),
        "Producer" => Object::string_literal("ResumeAI Optimizer"),
    });
    doc.trailer.set("Info", info_id);

    doc.compress();
    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| RenderError::Serialize(e.to_string()))?;
    Ok(out)
}

fn text_ops(x: f32, baseline: f32, text: &str, style: TextStyle) -> [Operation; 6] {
    let [r, g, b] = style.color.components();
    [
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(style.face.resource_name().as_bytes().to_vec()),
                real(style.size),
            ],
        ),
        Operation::new("rg", vec![real(r), real(g), real(b)]),
        Operation::new("Td", vec![real(x), real(baseline)]),
        Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(text))]),
        Operation::new("ET", vec![]),
    ]
}

fn real(value: f32) -> Object {
    Object::Real(value)
}

/// Encodes text for the base-14 fonts under WinAnsiEncoding. Typographic
/// punctuation maps to its cp1252 slot, Latin-1 passes through, control
/// characters are dropped and anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter_map(|c| match c {
            '\t' => Some(b' '),
            c if c.is_control() => None,
            ' '..='~' => Some(c as u8),
            '\u{20ac}' => Some(0x80),
            '\u{2026}' => Some(0x85),
            '\u{2018}' => Some(0x91),
            '\u{2019}' => Some(0x92),
            '\u{201c}' => Some(0x93),
            '\u{201d}' => Some(0x94),
            '\u{2022}' => Some(0x95),
            '\u{2013}' => Some(0x96),
            '\u{2014}' => Some(0x97),
            '\u{a0}'..='\u{ff}' => Some(c as u32 as u8),
            _ => Some(b'?'),
        })
        .collect()
}
