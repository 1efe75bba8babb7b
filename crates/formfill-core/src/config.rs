//! Editor configuration
//!
//! Every tunable constant of the detection, geometry and export layers
//! lives here. `EditorConfig::default()` reproduces the stock behaviour;
//! a TOML file may override any subset of keys.
//!
//! ```toml
//! [upload]
//! max_bytes = 5242880
//!
//! [detection]
//! line_tolerance = 4.0
//!
//! [export]
//! default_filename = "filled.pdf"
//! ```

use crate::error::{FormError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub upload: UploadConfig,
    pub detection: DetectionConfig,
    pub zoom: ZoomConfig,
    pub fields: FieldConfig,
    pub export: ExportConfig,
}

impl EditorConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            FormError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string, then validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EditorConfig = toml::from_str(content)
            .map_err(|e| FormError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;
        let positive = [
            ("detection.line_tolerance", d.line_tolerance),
            ("detection.checkbox_row_tolerance", d.checkbox_row_tolerance),
            ("detection.checkbox_label_max_gap", d.checkbox_label_max_gap),
            ("detection.min_indicator_width", d.min_indicator_width),
            ("detection.min_field_height", d.min_field_height),
            ("detection.min_label_field_width", d.min_label_field_width),
            ("fields.min_width", self.fields.min_width),
            ("fields.min_height", self.fields.min_height),
            ("fields.checkbox_min_size", self.fields.checkbox_min_size),
            ("zoom.min", self.zoom.min),
            ("zoom.step", self.zoom.step),
            ("export.max_text_font_size", self.export.max_text_font_size),
            ("export.textarea_font_size", self.export.textarea_font_size),
            ("export.char_width_factor", self.export.char_width_factor),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(FormError::Config(format!(
                    "{} must be a positive number, got {}",
                    key, value
                )));
            }
        }

        if self.zoom.min > self.zoom.max {
            return Err(FormError::Config(format!(
                "zoom.min ({}) exceeds zoom.max ({})",
                self.zoom.min, self.zoom.max
            )));
        }

        if self.upload.max_bytes == 0 {
            return Err(FormError::Config("upload.max_bytes must be > 0".into()));
        }

        if self.export.default_filename.trim().is_empty() {
            return Err(FormError::Config(
                "export.default_filename must not be empty".into(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
    pub mime_type: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            mime_type: "application/pdf".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Max |dy| between a fragment and a line's first fragment
    pub line_tolerance: f64,
    /// Max |dy| between a checkbox glyph and its label
    pub checkbox_row_tolerance: f64,
    /// Max horizontal gap between a checkbox glyph and its label
    pub checkbox_label_max_gap: f64,
    pub min_indicator_width: f64,
    pub min_field_height: f64,
    pub min_label_field_width: f64,
    /// Space left free at the right edge of the page for label candidates
    pub right_margin: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 5.0,
            checkbox_row_tolerance: 10.0,
            checkbox_label_max_gap: 50.0,
            min_indicator_width: 100.0,
            min_field_height: 20.0,
            min_label_field_width: 150.0,
            right_margin: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 2.0,
            step: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub min_width: f64,
    pub min_height: f64,
    /// Checkboxes may be smaller than other fields in both dimensions
    pub checkbox_min_size: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            min_width: 20.0,
            min_height: 20.0,
            checkbox_min_size: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub default_filename: String,
    pub max_text_font_size: f64,
    pub text_padding: f64,
    pub textarea_font_size: f64,
    pub textarea_line_height: f64,
    /// Approximate glyph advance as a fraction of the font size
    pub char_width_factor: f64,
    pub max_checkbox_size: f64,
    pub checkbox_label_gap: f64,
    pub checkbox_label_width: f64,
    pub max_signature_font_size: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_filename: "edited-document.pdf".to_string(),
            max_text_font_size: 12.0,
            text_padding: 2.0,
            textarea_font_size: 10.0,
            textarea_line_height: 1.2,
            char_width_factor: 0.6,
            max_checkbox_size: 12.0,
            checkbox_label_gap: 5.0,
            checkbox_label_width: 200.0,
            max_signature_font_size: 14.0,
        }
    }
}
