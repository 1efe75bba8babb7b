//! Declarative pattern table for field detection
//!
//! Adding a category means adding a row here; the detector itself only
//! iterates the tables.

use formfill_types::{FieldType, PatternKind};
use lazy_static::lazy_static;
use regex::Regex;

pub const DEFAULT_PLACEHOLDER: &str = "Enter text here";

/// Blank-space indicator searched anywhere inside a line
pub struct IndicatorPattern {
    pub kind: PatternKind,
    pub regex: Regex,
}

/// Semantic label that must be the last thing on its line
pub struct LabelPattern {
    pub kind: PatternKind,
    pub regex: Regex,
    pub field_type: FieldType,
    pub placeholder: &'static str,
}

lazy_static! {
    pub static ref INDICATOR_PATTERNS: Vec<IndicatorPattern> = vec![
        IndicatorPattern {
            kind: PatternKind::Underscores,
            regex: Regex::new(r"_{3,}").unwrap(),
        },
        IndicatorPattern {
            kind: PatternKind::Brackets,
            regex: Regex::new(r"\[[\s_]*\]").unwrap(),
        },
        IndicatorPattern {
            kind: PatternKind::Parentheses,
            regex: Regex::new(r"\([\s_]*\)").unwrap(),
        },
        IndicatorPattern {
            kind: PatternKind::Dots,
            regex: Regex::new(r"\.{3,}").unwrap(),
        },
    ];

    pub static ref LABEL_PATTERNS: Vec<LabelPattern> = vec![
        LabelPattern {
            kind: PatternKind::Name,
            regex: Regex::new(r"(?i)\b(name|full\s*name|first\s*name|last\s*name)\s*[:_\-]?\s*$")
                .unwrap(),
            field_type: FieldType::Text,
            placeholder: "Enter your name",
        },
        LabelPattern {
            kind: PatternKind::Email,
            regex: Regex::new(r"(?i)\b(email|e-mail|email\s*address)\s*[:_\-]?\s*$").unwrap(),
            field_type: FieldType::Email,
            placeholder: "Enter email address",
        },
        LabelPattern {
            kind: PatternKind::Phone,
            regex: Regex::new(r"(?i)\b(phone|telephone|tel|mobile|cell)\s*[:_\-]?\s*$").unwrap(),
            field_type: FieldType::Tel,
            placeholder: "Enter phone number",
        },
        LabelPattern {
            kind: PatternKind::Address,
            regex: Regex::new(r"(?i)\b(address|street|city|state|zip|postal)\s*[:_\-]?\s*$")
                .unwrap(),
            field_type: FieldType::Text,
            placeholder: "Enter address",
        },
        LabelPattern {
            kind: PatternKind::Date,
            regex: Regex::new(r"(?i)\b(date|born|birth|dob)\s*[:_\-]?\s*$").unwrap(),
            field_type: FieldType::Date,
            placeholder: "Select date",
        },
        LabelPattern {
            kind: PatternKind::Signature,
            regex: Regex::new(r"(?i)\b(signature|sign|signed)\s*[:_\-]?\s*$").unwrap(),
            field_type: FieldType::Signature,
            placeholder: "Click to sign",
        },
        LabelPattern {
            kind: PatternKind::Checkbox,
            regex: Regex::new(
                r"(?i)\b(check|select|choose|mark)\s*(one|all|applicable)?\s*[:_\-]?\s*$"
            )
            .unwrap(),
            field_type: FieldType::Checkbox,
            placeholder: DEFAULT_PLACEHOLDER,
        },
        LabelPattern {
            kind: PatternKind::YesNo,
            regex: Regex::new(r"(?i)\b(yes|no)\s*[:_\-]?\s*$").unwrap(),
            field_type: FieldType::Checkbox,
            placeholder: DEFAULT_PLACEHOLDER,
        },
    ];

    /// A fragment that is nothing but an empty box: `[ ]`, `☐` or `□`
    pub static ref CHECKBOX_GLYPH: Regex = Regex::new(r"^\s*(?:\[\s*\]|☐|□)\s*$").unwrap();
}

/// Field type a label category maps to
pub fn field_type_for(kind: PatternKind) -> FieldType {
    LABEL_PATTERNS
        .iter()
        .find(|p| p.kind == kind)
        .map(|p| p.field_type)
        .unwrap_or(FieldType::Text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_kinds(text: &str) -> Vec<PatternKind> {
        LABEL_PATTERNS
            .iter()
            .filter(|p| p.regex.is_match(text))
            .map(|p| p.kind)
            .collect()
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(field_type_for(PatternKind::Name), FieldType::Text);
        assert_eq!(field_type_for(PatternKind::Email), FieldType::Email);
        assert_eq!(field_type_for(PatternKind::Phone), FieldType::Tel);
        assert_eq!(field_type_for(PatternKind::Address), FieldType::Text);
        assert_eq!(field_type_for(PatternKind::Date), FieldType::Date);
        assert_eq!(field_type_for(PatternKind::Signature), FieldType::Signature);
        assert_eq!(field_type_for(PatternKind::Checkbox), FieldType::Checkbox);
        assert_eq!(field_type_for(PatternKind::YesNo), FieldType::Checkbox);
        assert_eq!(field_type_for(PatternKind::Dots), FieldType::Text);
    }

    #[test]
    fn test_labels_anchor_at_end_of_line() {
        assert_eq!(label_kinds("Full Name:"), vec![PatternKind::Name]);
        assert_eq!(label_kinds("E-mail -  "), vec![PatternKind::Email]);
        assert_eq!(label_kinds("Phone"), vec![PatternKind::Phone]);
        assert_eq!(label_kinds("Please check one:"), vec![PatternKind::Checkbox]);
        assert_eq!(label_kinds("Mark all"), vec![PatternKind::Checkbox]);
        assert!(label_kinds("Name of the tenant").is_empty());
        assert!(label_kinds("Emailing is fine").is_empty());
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        assert_eq!(label_kinds("DATE OF BIRTH:"), vec![PatternKind::Date]);
        assert_eq!(label_kinds("signature"), vec![PatternKind::Signature]);
    }

    #[test]
    fn test_indicators() {
        let find = |text: &str| -> Vec<PatternKind> {
            INDICATOR_PATTERNS
                .iter()
                .filter(|p| p.regex.is_match(text))
                .map(|p| p.kind)
                .collect()
        };
        assert_eq!(find("Name: ______"), vec![PatternKind::Underscores]);
        assert_eq!(find("[  ]"), vec![PatternKind::Brackets]);
        assert_eq!(find("( _ )"), vec![PatternKind::Parentheses]);
        assert_eq!(find("Total ........"), vec![PatternKind::Dots]);
        assert!(find("a__b..c").is_empty());
    }

    #[test]
    fn test_checkbox_glyph() {
        assert!(CHECKBOX_GLYPH.is_match("[ ]"));
        assert!(CHECKBOX_GLYPH.is_match(" [] "));
        assert!(CHECKBOX_GLYPH.is_match("☐"));
        assert!(CHECKBOX_GLYPH.is_match("□"));
        assert!(!CHECKBOX_GLYPH.is_match("[x]"));
        assert!(!CHECKBOX_GLYPH.is_match("☐ Yes"));
    }
}
