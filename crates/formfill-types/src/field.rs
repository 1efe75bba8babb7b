use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Date,
    Checkbox,
    Textarea,
    Signature,
}

impl FieldType {
    pub const ALL: [FieldType; 7] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Tel,
        FieldType::Date,
        FieldType::Checkbox,
        FieldType::Textarea,
        FieldType::Signature,
    ];

    /// Get default dimensions for a manually placed field (width, height)
    pub fn default_dimensions(&self) -> (f64, f64) {
        match self {
            FieldType::Checkbox => (20.0, 20.0),
            FieldType::Signature => (200.0, 50.0),
            FieldType::Textarea => (150.0, 60.0),
            _ => (150.0, 30.0),
        }
    }

    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldType::Checkbox => FieldValue::Checked(false),
            _ => FieldValue::Text(String::new()),
        }
    }

    pub fn default_placeholder(&self) -> String {
        match self {
            FieldType::Signature => "Your signature...".to_string(),
            other => format!("Enter {}...", other.as_str()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Tel => "tel",
            FieldType::Date => "date",
            FieldType::Checkbox => "checkbox",
            FieldType::Textarea => "textarea",
            FieldType::Signature => "signature",
        }
    }

    /// Parse field type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Some(FieldType::Text),
            "email" => Some(FieldType::Email),
            "tel" | "phone" => Some(FieldType::Tel),
            "date" => Some(FieldType::Date),
            "checkbox" => Some(FieldType::Checkbox),
            "textarea" => Some(FieldType::Textarea),
            "signature" => Some(FieldType::Signature),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current content of a field: text for text-like types, a flag for checkboxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Checked(bool),
    Text(String),
}

impl FieldValue {
    /// Blank values are never drawn. Whitespace-only text counts as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Checked(checked) => !checked,
            FieldValue::Text(text) => text.trim().is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Checked(_) => None,
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, FieldValue::Checked(true))
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Checked(value)
    }
}

/// Axis-aligned box in PDF space, anchored at its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PdfRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// US Letter, the fallback when a page carries no usable MediaBox
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// 1-based page index
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub value: FieldValue,
    /// Shown in the overlay while the value is empty; never exported
    #[serde(default)]
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl Field {
    /// Create a new field with default dimensions for the field type
    pub fn new(field_type: FieldType, page: u32, x: f64, y: f64) -> Self {
        let (width, height) = field_type.default_dimensions();
        Self::new_with_rect(field_type, page, PdfRect::new(x, y, width, height))
    }

    /// Create a new field with custom geometry
    pub fn new_with_rect(field_type: FieldType, page: u32, rect: PdfRect) -> Self {
        Self {
            id: Self::generate_id(),
            field_type,
            page,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            value: field_type.default_value(),
            placeholder: field_type.default_placeholder(),
            label: None,
            required: false,
        }
    }

    /// Fresh identifier; v4 UUIDs are never reused within a session
    pub fn generate_id() -> String {
        format!("field_{}", Uuid::new_v4().simple())
    }

    pub fn with_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn rect(&self) -> PdfRect {
        PdfRect::new(self.x, self.y, self.width, self.height)
    }

    /// Merge the keys present in `patch` over this record
    pub fn apply(&mut self, patch: &FieldPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(ref value) = patch.value {
            self.value = value.clone();
        }
        if let Some(ref placeholder) = patch.placeholder {
            self.placeholder = placeholder.clone();
        }
        if let Some(ref label) = patch.label {
            self.label = Some(label.clone());
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
    }
}

/// Partial update for a stored field.
///
/// There is no key for `type` or `page`: changing either is modeled as
/// delete + create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub value: Option<FieldValue>,
    pub placeholder: Option<String>,
    pub label: Option<String>,
    pub required: Option<bool>,
}

impl FieldPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn value(value: impl Into<FieldValue>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }
}
