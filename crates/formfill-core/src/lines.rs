//! Grouping of page text fragments into visual lines

use formfill_types::TextFragment;

/// Fragments sharing an approximate baseline, ordered left to right
#[derive(Debug, Clone, PartialEq)]
pub struct Line<'a> {
    pub fragments: Vec<&'a TextFragment>,
}

impl<'a> Line<'a> {
    /// Baseline of the line: the Y of its leftmost fragment
    pub fn y(&self) -> f64 {
        self.fragments.first().map(|f| f.y).unwrap_or(0.0)
    }

    /// Fragments joined with a single space, the unit offsets are measured in
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Fragment containing byte offset `offset` of [`Line::text`].
    ///
    /// The separator after a fragment belongs to no fragment.
    pub fn fragment_at(&self, offset: usize) -> Option<&'a TextFragment> {
        let mut start = 0;
        for fragment in &self.fragments {
            let end = start + fragment.text.len();
            if offset >= start && offset < end {
                return Some(fragment);
            }
            start = end + 1;
        }
        None
    }
}

/// Cluster fragments into lines.
///
/// A fragment joins the first open line (in creation order) whose *first*
/// fragment lies within `tolerance` on the Y axis; otherwise it opens a new
/// line. Fragments inside a line are sorted by X, lines by descending Y so
/// the output reads top to bottom.
pub fn cluster_lines(fragments: &[TextFragment], tolerance: f64) -> Vec<Line<'_>> {
    let mut lines: Vec<Vec<&TextFragment>> = Vec::new();

    for fragment in fragments {
        let existing = lines
            .iter_mut()
            .find(|line| (line[0].y - fragment.y).abs() <= tolerance);
        match existing {
            Some(line) => line.push(fragment),
            None => lines.push(vec![fragment]),
        }
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines.sort_by(|a, b| b[0].y.total_cmp(&a[0].y));

    lines
        .into_iter()
        .map(|fragments| Line { fragments })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Fragments on baselines 20pt apart, paired with a shuffled copy
    fn fragments_and_shuffle() -> impl Strategy<Value = (Vec<TextFragment>, Vec<TextFragment>)> {
        proptest::collection::vec((0u32..40, 0.0f64..500.0), 1..30).prop_flat_map(|rows| {
            let fragments: Vec<TextFragment> = rows
                .iter()
                .enumerate()
                .map(|(i, (row, x))| {
                    TextFragment::new(format!("t{}", i), *x, *row as f64 * 20.0, 10.0, 10.0)
                })
                .collect();
            (Just(fragments.clone()), Just(fragments).prop_shuffle())
        })
    }

    fn membership(lines: Vec<Line<'_>>) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|l| {
                let mut names: Vec<String> = l.fragments.iter().map(|f| f.text.clone()).collect();
                names.sort();
                names
            })
            .collect()
    }

    proptest! {
        /// Fragments on well-separated baselines cluster identically in any order
        #[test]
        fn membership_is_order_independent((fragments, shuffled) in fragments_and_shuffle()) {
            prop_assert_eq!(
                membership(cluster_lines(&fragments, 5.0)),
                membership(cluster_lines(&shuffled, 5.0))
            );
        }
    }
}
