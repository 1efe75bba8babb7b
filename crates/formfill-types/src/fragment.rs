use serde::{Deserialize, Serialize};

/// A positioned run of text on one page, in PDF space.
///
/// `x`/`y` is the text origin as reported by the renderer (the baseline
/// start), so `y` grows upward.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFragment {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub font_name: Option<String>,
    #[serde(default)]
    pub font_size: Option<f64>,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
            font_name: None,
            font_size: None,
        }
    }

    pub fn with_font(mut self, name: impl Into<String>, size: f64) -> Self {
        self.font_name = Some(name.into());
        self.font_size = Some(size);
        self
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}
