// Report palette and type scale.

use crate::analysis::Priority;

/// RGB color with 0-255 channels; converted to PDF's 0.0-1.0 at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn components(&self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

pub const SCORE_LOW: Rgb = Rgb(0xef, 0x44, 0x44);
pub const SCORE_MID: Rgb = Rgb(0xf5, 0x9e, 0x0b);
pub const SCORE_HIGH: Rgb = Rgb(0x10, 0xb9, 0x81);

pub const PRIORITY_HIGH: Rgb = Rgb(0xf5, 0x9e, 0x0b);
pub const PRIORITY_MEDIUM: Rgb = Rgb(0x6b, 0x72, 0x80);
pub const PRIORITY_LOW: Rgb = Rgb(0x3b, 0x82, 0xf6);

pub const HEADING: Rgb = Rgb(0x1e, 0x40, 0xaf);
pub const BODY: Rgb = Rgb(0x1f, 0x29, 0x37);
pub const MUTED: Rgb = Rgb(0x6b, 0x72, 0x80);
pub const SUGGESTION: Rgb = Rgb(0x1e, 0x3a, 0x8a);
pub const SUGGESTION_BACKGROUND: Rgb = Rgb(0xef, 0xf6, 0xff);
pub const TRACK: Rgb = Rgb(0xe5, 0xe7, 0xeb);
pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);

pub const TITLE_SIZE: f32 = 22.0;
pub const HEADING_SIZE: f32 = 16.0;
pub const ITEM_SIZE: f32 = 12.0;
pub const BODY_SIZE: f32 = 10.5;
pub const FOOTER_SIZE: f32 = 8.0;

pub const SCORE_BAR_HEIGHT: f32 = 18.0;
pub const SUGGESTION_INDENT: f32 = 12.0;

/// Score bar fill: red below 40, amber below 70, green otherwise.
pub fn score_color(match_percentage: u8) -> Rgb {
    match match_percentage {
        0..=39 => SCORE_LOW,
        40..=69 => SCORE_MID,
        _ => SCORE_HIGH,
    }
}

pub fn priority_color(priority: Priority) -> Rgb {
    match priority {
        Priority::High => PRIORITY_HIGH,
        Priority::Medium => PRIORITY_MEDIUM,
        Priority::Low => PRIORITY_LOW,
    }
}
