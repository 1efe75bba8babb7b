//! Drawing vocabulary shared between the export pipeline and the PDF backend.
//!
//! Every coordinate is in PDF space (bottom-left origin, points).

use serde::{Deserialize, Serialize};

/// Standard-14 fonts used by flattened export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    /// Symbol font; `"4"` renders as a check mark
    ZapfDingbats,
}

impl StandardFont {
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Name under which the font is registered in a page's /Font resources
    pub fn resource_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "FFHelv",
            StandardFont::HelveticaBold => "FFHelvB",
            StandardFont::ZapfDingbats => "FFZaDb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    /// Slightly blue ink used for signatures
    pub const SIGNATURE_INK: Rgb = Rgb::new(0.0, 0.0, 0.8);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    /// Single line of text starting at the baseline origin (`x`, `y`)
    Text {
        x: f64,
        y: f64,
        size: f64,
        font: StandardFont,
        color: Rgb,
        text: String,
    },
    /// Stroked (unfilled) rectangle
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        border_color: Rgb,
        border_width: f64,
    },
    Line {
        start: (f64, f64),
        end: (f64, f64),
        thickness: f64,
        color: Rgb,
    },
}

impl DrawOp {
    pub fn is_text(&self) -> bool {
        matches!(self, DrawOp::Text { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn font(&self) -> Option<StandardFont> {
        match self {
            DrawOp::Text { font, .. } => Some(*font),
            _ => None,
        }
    }
}
