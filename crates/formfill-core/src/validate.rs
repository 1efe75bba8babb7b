//! Pre-export validation
//!
//! Only required-but-empty values and degenerate geometry are hard
//! errors. Malformed e-mail addresses and phone numbers are warnings and
//! do not block export.

use crate::error::{FormError, Result};
use formfill_types::{Field, FieldType};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref PHONE_PATTERN: Regex = Regex::new(r"^[\d\s\-()+]+$").unwrap();
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Hard errors become `ValidationFailure`; otherwise the warnings are returned
    pub fn into_result(self) -> Result<Vec<String>> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(FormError::ValidationFailure {
                errors: self.errors,
            })
        }
    }
}

/// Validate fields before export. Messages use 1-based positions.
pub fn validate_fields(fields: &[Field]) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let n = index + 1;

        if field.required && field.value.is_blank() {
            errors.push(format!(
                "Field {} ({}) is required but empty",
                n, field.field_type
            ));
        }

        if !(field.width > 0.0 && field.height > 0.0) {
            errors.push(format!(
                "Field {} ({}) has zero or negative size",
                n, field.field_type
            ));
        }

        if !(field.x.is_finite() && field.y.is_finite()) {
            errors.push(format!(
                "Field {} ({}) has an invalid position",
                n, field.field_type
            ));
        }

        let Some(text) = field.value.as_text().filter(|t| !t.is_empty()) else {
            continue;
        };
        match field.field_type {
            FieldType::Email if !EMAIL_PATTERN.is_match(text) => {
                warnings.push(format!("Field {}: Invalid email format", n));
            }
            FieldType::Tel if !PHONE_PATTERN.is_match(text) => {
                warnings.push(format!("Field {}: Invalid phone number format", n));
            }
            _ => {}
        }
    }

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_non_finite_position_is_an_error() {
        let fields = vec![
            Field::new(FieldType::Text, 1, f64::NAN, 10.0).with_value("x"),
            Field::new(FieldType::Text, 1, 10.0, f64::INFINITY).with_value("y"),
        ];
        let report = validate_fields(&fields);

        assert!(!report.is_valid);
        assert_eq!(
            report.errors,
            vec![
                "Field 1 (text) has an invalid position".to_string(),
                "Field 2 (text) has an invalid position".to_string(),
            ]
        );
    }

    #[test]
    fn test_invalid_email_is_only_a_warning() {
        let fields = vec![Field::new(FieldType::Email, 1, 0.0, 0.0).with_value("not-an-email")];
        let report = validate_fields(&fields);

        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings, vec!["Field 1: Invalid email format".to_string()]);
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_valid_email_and_phone() {
        let fields = vec![
            Field::new(FieldType::Email, 1, 0.0, 0.0).with_value("jane@example.com"),
            Field::new(FieldType::Tel, 1, 0.0, 0.0).with_value("+1 (555) 123-4567"),
        ];
        let report = validate_fields(&fields);
        assert!(report.is_valid);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_invalid_phone_warns() {
        let fields = vec![
            Field::new(FieldType::Text, 1, 0.0, 0.0),
            Field::new(FieldType::Tel, 1, 0.0, 0.0).with_value("call me"),
        ];
        let report = validate_fields(&fields);
        assert_eq!(
            report.warnings,
            vec!["Field 2: Invalid phone number format".to_string()]
        );
    }

    #[test]
    fn test_required_empty_is_hard_error() {
        let fields = vec![
            Field::new(FieldType::Text, 1, 0.0, 0.0).required(true),
            Field::new(FieldType::Checkbox, 1, 0.0, 0.0).required(true),
            Field::new(FieldType::Text, 1, 0.0, 0.0).required(true).with_value("ok"),
        ];
        let report = validate_fields(&fields);

        assert!(!report.is_valid);
        assert_eq!(
            report.errors,
            vec![
                "Field 1 (text) is required but empty".to_string(),
                "Field 2 (checkbox) is required but empty".to_string(),
            ]
        );
        assert!(matches!(
            report.into_result(),
            Err(FormError::ValidationFailure { .. })
        ));
    }

    #[test]
    fn test_empty_optional_fields_pass() {
        let fields = vec![
            Field::new(FieldType::Email, 1, 0.0, 0.0),
            Field::new(FieldType::Tel, 1, 0.0, 0.0),
        ];
        let report = validate_fields(&fields);
        assert!(report.is_valid);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_degenerate_size_is_error() {
        let mut field = Field::new(FieldType::Text, 1, 0.0, 0.0);
        field.width = 0.0;
        let report = validate_fields(&[field]);
        assert_eq!(
            report.errors,
            vec!["Field 1 (text) has zero or negative size".to_string()]
        );
    }
}
