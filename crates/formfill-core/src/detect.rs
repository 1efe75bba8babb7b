//! Heuristic form-field detection from positioned page text
//!
//! Three independent strategies run over the same page and their results
//! are concatenated without deduplication:
//!
//! 1. Indicator patterns (`___`, `[ ]`, `( )`, `...`) inside a line
//! 2. Labels (`Name:`, `Email:`, ...) ending a line, with the next fragment
//!    to the right taken as the input area
//! 3. Stand-alone checkbox glyphs with a label just to their right
//!
//! Detection is a pure function of the fragments and the page size.

use crate::config::DetectionConfig;
use crate::error::FormError;
use crate::lines::{cluster_lines, Line};
use crate::patterns::{CHECKBOX_GLYPH, DEFAULT_PLACEHOLDER, INDICATOR_PATTERNS, LABEL_PATTERNS};
use formfill_types::{CandidateField, FieldType, FieldValue, PageSize, PatternKind, TextFragment};
use std::collections::BTreeMap;

/// Text of one page as delivered by the rendering collaborator
#[derive(Debug, Clone)]
pub struct PageText {
    pub page: u32,
    pub size: PageSize,
    pub fragments: Vec<TextFragment>,
}

pub struct FieldDetector {
    config: DetectionConfig,
}

impl FieldDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Run every strategy over one page
    pub fn detect(&self, fragments: &[TextFragment], page: PageSize) -> Vec<CandidateField> {
        let lines = cluster_lines(fragments, self.config.line_tolerance);
        let mut candidates = Vec::new();

        for (line_index, line) in lines.iter().enumerate() {
            let text = line.text();
            candidates.extend(self.find_indicators(line, &text, line_index));
            candidates.extend(self.find_labeled(line, &text, line_index, page));
        }

        candidates.extend(self.find_checkboxes(fragments));
        candidates
    }

    /// Detect over many pages.
    ///
    /// A page whose text could not be extracted contributes no candidates;
    /// the failure is logged and the remaining pages are unaffected.
    pub fn detect_document<I>(&self, pages: I) -> BTreeMap<u32, Vec<CandidateField>>
    where
        I: IntoIterator<Item = Result<PageText, FormError>>,
    {
        let mut by_page = BTreeMap::new();
        for page in pages {
            match page {
                Ok(page) => {
                    let candidates = self.detect(&page.fragments, page.size);
                    tracing::debug!(
                        page = page.page,
                        fragments = page.fragments.len(),
                        candidates = candidates.len(),
                        "Detected candidate fields"
                    );
                    by_page.insert(page.page, candidates);
                }
                Err(FormError::TextExtractionFailure { page, reason }) => {
                    tracing::warn!(page, %reason, "Text extraction failed, skipping page");
                    by_page.insert(page, Vec::new());
                }
                Err(other) => {
                    tracing::warn!(error = %other, "Skipping page without text");
                }
            }
        }
        by_page
    }

    fn find_indicators(&self, line: &Line<'_>, text: &str, line_index: usize) -> Vec<CandidateField> {
        let mut found = Vec::new();
        for pattern in INDICATOR_PATTERNS.iter() {
            for m in pattern.regex.find_iter(text) {
                let Some(fragment) = line.fragment_at(m.start()) else {
                    continue;
                };
                found.push(CandidateField {
                    field_type: FieldType::Text,
                    x: fragment.x,
                    y: fragment.y,
                    width: fragment.width.max(self.config.min_indicator_width),
                    height: fragment.height.max(self.config.min_field_height),
                    value: FieldValue::Text(String::new()),
                    placeholder: DEFAULT_PLACEHOLDER.to_string(),
                    label: None,
                    line_index: Some(line_index),
                    pattern: pattern.kind,
                });
            }
        }
        found
    }

    fn find_labeled(
        &self,
        line: &Line<'_>,
        text: &str,
        line_index: usize,
        page: PageSize,
    ) -> Vec<CandidateField> {
        let mut found = Vec::new();
        for pattern in LABEL_PATTERNS.iter() {
            let Some(m) = pattern.regex.find(text) else {
                continue;
            };
            let Some(label) = line.fragment_at(m.start()) else {
                continue;
            };
            // Input area is the first fragment past the label's right edge
            let Some(input) = line.fragments.iter().find(|f| f.x > label.right()) else {
                continue;
            };

            found.push(CandidateField {
                field_type: pattern.field_type,
                x: input.x,
                y: input.y,
                width: self
                    .config
                    .min_label_field_width
                    .max(page.width - input.x - self.config.right_margin),
                height: input.height.max(self.config.min_field_height),
                value: pattern.field_type.default_value(),
                placeholder: pattern.placeholder.to_string(),
                label: Some(m.as_str().trim().to_string()),
                line_index: Some(line_index),
                pattern: pattern.kind,
            });
        }
        found
    }

    fn find_checkboxes(&self, fragments: &[TextFragment]) -> Vec<CandidateField> {
        let mut found = Vec::new();
        for (i, glyph) in fragments.iter().enumerate() {
            if !CHECKBOX_GLYPH.is_match(&glyph.text) {
                continue;
            }

            let label = fragments
                .iter()
                .enumerate()
                .filter(|(j, other)| {
                    *j != i
                        && (other.y - glyph.y).abs() <= self.config.checkbox_row_tolerance
                        && other.x > glyph.right()
                        && other.x - glyph.right() <= self.config.checkbox_label_max_gap
                })
                .map(|(_, other)| other)
                .min_by(|a, b| a.x.total_cmp(&b.x));

            if let Some(label) = label {
                found.push(CandidateField {
                    field_type: FieldType::Checkbox,
                    x: glyph.x,
                    y: glyph.y,
                    width: glyph.width,
                    height: glyph.height,
                    value: FieldValue::Checked(false),
                    placeholder: String::new(),
                    label: Some(label.text.clone()),
                    line_index: None,
                    pattern: PatternKind::CheckboxGlyph,
                });
            }
        }
        found
    }
}

impl Default for FieldDetector {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frag(text: &str, x: f64, y: f64, width: f64) -> TextFragment {
        TextFragment::new(text, x, y, width, 12.0)
    }

    fn detect(fragments: &[TextFragment]) -> Vec<CandidateField> {
        FieldDetector::default().detect(fragments, PageSize::LETTER)
    }

    #[test]
    fn test_underscore_indicator_single_fragment() {
        let fragments = vec![frag("Name: ___________", 72.0, 700.0, 90.0)];
        let candidates = detect(&fragments);

        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.field_type, FieldType::Text);
        assert_eq!(c.pattern, PatternKind::Underscores);
        assert_eq!((c.x, c.y), (72.0, 700.0));
        assert_eq!(c.width, 100.0);
        assert_eq!(c.height, 20.0);
        assert_eq!(c.placeholder, "Enter text here");
        assert_eq!(c.line_index, Some(0));
    }

    #[test]
    fn test_underscore_indicator_maps_to_its_fragment() {
        let fragments = vec![
            frag("Name:", 72.0, 700.0, 30.0),
            frag("___________", 110.0, 700.0, 140.0),
        ];
        let candidates = detect(&fragments);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].x, 110.0);
        assert_eq!(candidates[0].width, 140.0);
    }

    #[test]
    fn test_email_label_uses_next_fragment() {
        let fragments = vec![
            frag("Email:", 50.0, 600.0, 40.0),
            frag("", 200.0, 600.0, 10.0),
        ];
        let candidates = detect(&fragments);

        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.field_type, FieldType::Email);
        assert_eq!(c.x, 200.0);
        assert!(c.width >= 150.0);
        assert_eq!(c.width, 612.0 - 200.0 - 50.0);
        assert_eq!(c.label.as_deref(), Some("Email:"));
        assert_eq!(c.placeholder, "Enter email address");
    }

    #[test]
    fn test_label_width_floor() {
        let fragments = vec![
            frag("Phone:", 400.0, 600.0, 40.0),
            frag(" ", 500.0, 600.0, 5.0),
        ];
        let candidates = detect(&fragments);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].field_type, FieldType::Tel);
        assert_eq!(candidates[0].width, 150.0);
    }

    #[test]
    fn test_label_without_following_fragment_yields_nothing() {
        let fragments = vec![frag("Signature:", 50.0, 100.0, 60.0)];
        assert!(detect(&fragments).is_empty());
    }

    #[test]
    fn test_label_must_end_line() {
        let fragments = vec![
            frag("Name", 50.0, 600.0, 30.0),
            frag("of applicant", 90.0, 600.0, 70.0),
        ];
        assert!(detect(&fragments).is_empty());
    }

    #[test]
    fn test_yes_no_label_is_checkbox() {
        let fragments = vec![frag("Smoker? Yes", 50.0, 500.0, 60.0), frag(" ", 120.0, 500.0, 5.0)];
        let candidates = detect(&fragments);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].field_type, FieldType::Checkbox);
        assert_eq!(candidates[0].value, FieldValue::Checked(false));
        assert_eq!(candidates[0].pattern, PatternKind::YesNo);
    }

    #[test]
    fn test_checkbox_glyph_with_label() {
        let fragments = vec![
            frag("☐", 50.0, 400.0, 10.0),
            frag("I agree", 65.0, 402.0, 40.0),
            frag("far away", 200.0, 400.0, 40.0),
        ];
        let candidates: Vec<_> = detect(&fragments)
            .into_iter()
            .filter(|c| c.pattern == PatternKind::CheckboxGlyph)
            .collect();

        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.field_type, FieldType::Checkbox);
        assert_eq!((c.x, c.y, c.width), (50.0, 400.0, 10.0));
        assert_eq!(c.label.as_deref(), Some("I agree"));
    }

    #[test]
    fn test_checkbox_glyph_picks_closest_label() {
        let fragments = vec![
            frag("[ ]", 50.0, 400.0, 12.0),
            frag("second", 90.0, 400.0, 30.0),
            frag("first", 70.0, 395.0, 15.0),
        ];
        let glyphs: Vec<_> = detect(&fragments)
            .into_iter()
            .filter(|c| c.pattern == PatternKind::CheckboxGlyph)
            .collect();
        assert_eq!(glyphs.len(), 1);
        assert_eq!(glyphs[0].label.as_deref(), Some("first"));
    }

    #[test]
    fn test_bracket_glyph_also_yields_indicator_duplicate() {
        let fragments = vec![frag("[ ]", 50.0, 400.0, 12.0), frag("Yes", 70.0, 400.0, 20.0)];
        let kinds: Vec<_> = detect(&fragments).iter().map(|c| c.pattern).collect();
        assert!(kinds.contains(&PatternKind::Brackets));
        assert!(kinds.contains(&PatternKind::CheckboxGlyph));
    }

    #[test]
    fn test_checkbox_glyph_without_label_is_skipped() {
        let fragments = vec![frag("☐", 50.0, 400.0, 10.0), frag("too far", 120.0, 400.0, 30.0)];
        assert!(detect(&fragments).is_empty());
    }

    #[test]
    fn test_detection_is_repeatable() {
        let fragments = vec![
            frag("Name:", 72.0, 700.0, 30.0),
            frag("_____", 110.0, 700.0, 60.0),
            frag("Date:", 72.0, 650.0, 30.0),
            frag(" ", 120.0, 650.0, 5.0),
            frag("☐", 72.0, 600.0, 10.0),
            frag("Subscribe", 90.0, 600.0, 50.0),
        ];
        assert_eq!(detect(&fragments), detect(&fragments));
    }

    #[test]
    fn test_detect_document_swallows_extraction_failure() {
        let detector = FieldDetector::default();
        let pages = vec![
            Ok(PageText {
                page: 1,
                size: PageSize::LETTER,
                fragments: vec![frag("Name: _____", 72.0, 700.0, 60.0)],
            }),
            Err(FormError::TextExtractionFailure {
                page: 2,
                reason: "bad stream".into(),
            }),
        ];
        let by_page = detector.detect_document(pages);

        assert_eq!(by_page[&1].len(), 1);
        assert!(by_page[&2].is_empty());
    }
}
