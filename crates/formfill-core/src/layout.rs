//! Text fitting for flattened export
//!
//! Widths are estimated as `chars * font_size * char_width_factor` rather
//! than measured from glyph metrics, so long strings of wide glyphs can
//! still overflow slightly.

use chrono::{DateTime, NaiveDate};

const ELLIPSIS: &str = "...";

/// Characters that fit in `width` at `font_size`
pub fn max_chars(width: f64, font_size: f64, char_width_factor: f64) -> usize {
    let advance = font_size * char_width_factor;
    if !(advance > 0.0) || !(width > 0.0) {
        return 0;
    }
    (width / advance).floor() as usize
}

/// Cut `text` to at most `max` characters, marking the cut with `...`
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max < ELLIPSIS.len() {
        return ".".repeat(max);
    }
    let mut out: String = text.chars().take(max - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Single-line content for a box `width` wide
pub fn fit_single_line(text: &str, width: f64, font_size: f64, char_width_factor: f64) -> String {
    truncate_with_ellipsis(text, max_chars(width, font_size, char_width_factor))
}

/// Greedy word wrap into at most `max_lines` lines of `max_chars` each.
///
/// Words that do not fit after the last line are dropped without a
/// marker. A single word longer than a line is cut with `...`.
/// Newlines in `text` start a new line.
pub fn wrap_text(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    if max_lines == 0 {
        return lines;
    }

    'paragraphs: for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split(' ') {
            if lines.len() >= max_lines {
                break 'paragraphs;
            }
            let word_len = word.chars().count();
            let joined_len = if current.is_empty() {
                word_len
            } else {
                current_len + 1 + word_len
            };

            if joined_len <= max_chars {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_len = joined_len;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                if lines.len() >= max_lines {
                    break 'paragraphs;
                }
            }
            if word_len > max_chars {
                lines.push(truncate_with_ellipsis(word, max_chars));
            } else {
                current.push_str(word);
                current_len = word_len;
            }
        }

        if !current.is_empty() {
            if lines.len() >= max_lines {
                break;
            }
            lines.push(current);
        }
    }

    lines.truncate(max_lines);
    lines
}

/// Re-render a date value as `M/D/YYYY`; unparseable input is returned as is
pub fn format_date(value: &str) -> String {
    let trimmed = value.trim();
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];

    let parsed = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.date_naive())
        });

    match parsed {
        Some(date) => date.format("%-m/%-d/%Y").to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truncation_bound() {
        let value = "x".repeat(200);
        let fitted = fit_single_line(&value, 50.0, 12.0, 0.6);
        let limit = (50.0f64 / (12.0 * 0.6)).floor() as usize;

        assert!(fitted.ends_with("..."));
        assert!(fitted.chars().count() <= limit);
        assert_eq!(fitted, "xxx...");
    }

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(fit_single_line("Jane", 100.0, 12.0, 0.6), "Jane");
    }

    #[test]
    fn test_tiny_box_never_exceeds_limit() {
        assert_eq!(truncate_with_ellipsis("abcdef", 2), "..");
        assert_eq!(truncate_with_ellipsis("abcdef", 0), "");
        assert_eq!(max_chars(10.0, 0.0, 0.6), 0);
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let fitted = truncate_with_ellipsis("ééééééé", 5);
        assert_eq!(fitted, "éé...");
    }

    #[test]
    fn test_wrap_basic() {
        let lines = wrap_text("the quick brown fox jumps", 10, 5);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn test_wrap_drops_overflow() {
        let lines = wrap_text("one two three four five six", 8, 2);
        assert_eq!(lines, vec!["one two", "three"]);
    }

    #[test]
    fn test_wrap_long_word() {
        let lines = wrap_text("supercalifragilistic ok", 8, 3);
        assert_eq!(lines, vec!["super...", "ok"]);
    }

    #[test]
    fn test_wrap_long_word_after_text() {
        let lines = wrap_text("a supercalifragilistic b", 10, 5);
        assert_eq!(lines, vec!["a", "superca...", "b"]);

        let lines = wrap_text("a aaaaaaaaaaa", 4, 2);
        assert_eq!(lines, vec!["a", "a..."]);
    }

    #[test]
    fn test_wrap_newlines() {
        let lines = wrap_text("line one\nline two", 20, 5);
        assert_eq!(lines, vec!["line one", "line two"]);
    }

    #[test]
    fn test_wrap_zero_lines() {
        assert!(wrap_text("anything", 10, 0).is_empty());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05"), "3/5/2024");
        assert_eq!(format_date("2024-12-25T10:00:00Z"), "12/25/2024");
        assert_eq!(format_date("12/25/2024"), "12/25/2024");
        assert_eq!(format_date("next tuesday"), "next tuesday");
        assert_eq!(format_date(""), "");
    }
}
