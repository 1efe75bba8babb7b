use crate::field::{Field, FieldType, FieldValue, PdfRect};
use serde::{Deserialize, Serialize};

/// Which detection rule produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternKind {
    Underscores,
    Brackets,
    Parentheses,
    Dots,
    Name,
    Email,
    Phone,
    Address,
    Date,
    Signature,
    Checkbox,
    YesNo,
    CheckboxGlyph,
}

/// A detector-produced field descriptor that has not been accepted yet.
///
/// Candidates carry no id; one is assigned when the user accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateField {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub value: FieldValue,
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Index of the clustered line the candidate came from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_index: Option<usize>,
    pub pattern: PatternKind,
}

impl CandidateField {
    pub fn rect(&self) -> PdfRect {
        PdfRect::new(self.x, self.y, self.width, self.height)
    }

    /// Turn this candidate into a field on `page` with a fresh id
    pub fn into_field(self, page: u32) -> Field {
        Field {
            id: Field::generate_id(),
            field_type: self.field_type,
            page,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            value: self.value,
            placeholder: self.placeholder,
            label: self.label,
            required: false,
        }
    }
}
