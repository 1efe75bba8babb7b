//! Positioned text fragments from page content streams
//!
//! Runs the text-showing operators of each page through a small text-state
//! machine (`BT/ET`, `Tf`, `Td`, `TD`, `Tm`, `T*`, `TL`, `Tj`, `TJ`, `'`,
//! `"`, plus `cm` and `q/Q` for the CTM) and emits one fragment per shown
//! string. Glyph widths are not read from the font: every character is
//! taken as half an em wide, which is enough for line clustering and
//! field placement.

use crate::document::LopdfDocument;
use crate::page::{number, page_size};
use formfill_core::{FormError, PageText};
use formfill_types::TextFragment;
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

/// Approximate glyph advance in ems
const CHAR_WIDTH_EM: f64 = 0.5;

/// A `TJ` adjustment this negative (thousandths of an em) reads as a word gap
const TJ_SPACE_THRESHOLD: f64 = -100.0;

type Matrix = [f64; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

fn translation(tx: f64, ty: f64) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

#[derive(Debug, Clone)]
struct TextState {
    ctm: Matrix,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font_name: Option<String>,
    font_size: f64,
    leading: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            font_name: None,
            font_size: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = multiply(&translation(tx, ty), &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Emit a fragment at the current position and advance past it
    fn show(&mut self, text: String, advance_ems: f64) -> Option<TextFragment> {
        let advance = advance_ems * self.font_size;
        let rendering = multiply(&self.text_matrix, &self.ctm);
        let x_scale = rendering[0].hypot(rendering[1]);
        let y_scale = rendering[2].hypot(rendering[3]);

        self.text_matrix = multiply(&translation(advance, 0.0), &self.text_matrix);

        if text.is_empty() {
            return None;
        }
        let size = self.font_size * y_scale;
        let mut fragment = TextFragment::new(
            text,
            rendering[4],
            rendering[5],
            advance * x_scale,
            size,
        );
        fragment.font_name = self.font_name.clone();
        fragment.font_size = Some(size);
        Some(fragment)
    }
}

/// Decode a PDF string: UTF-16BE with BOM, then UTF-8, then Latin-1
fn decode_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        if let Ok(s) = String::from_utf16(&units) {
            return s;
        }
    }
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    bytes.iter().map(|&b| b as char).collect()
}

fn string_operand(operands: &[Object], index: usize) -> Option<String> {
    match operands.get(index)? {
        Object::String(bytes, _) => Some(decode_string(bytes)),
        _ => None,
    }
}

fn numbers<const N: usize>(operands: &[Object]) -> Option<[f64; N]> {
    if operands.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, operand) in out.iter_mut().zip(operands) {
        *slot = number(operand)?;
    }
    Some(out)
}

/// `TJ` array: concatenated text and total advance in ems
fn text_array(items: &[Object]) -> (String, f64) {
    let mut text = String::new();
    let mut advance = 0.0;
    for item in items {
        match item {
            Object::String(bytes, _) => {
                let s = decode_string(bytes);
                advance += s.chars().count() as f64 * CHAR_WIDTH_EM;
                text.push_str(&s);
            }
            other => {
                if let Some(adjust) = number(other) {
                    advance -= adjust / 1000.0;
                    if adjust < TJ_SPACE_THRESHOLD && !text.ends_with(' ') {
                        text.push(' ');
                    }
                }
            }
        }
    }
    (text, advance)
}

fn string_advance(text: &str) -> f64 {
    text.chars().count() as f64 * CHAR_WIDTH_EM
}

/// Fragments of one decoded content stream, in content order
pub fn fragments_from_content(content: &Content) -> Vec<TextFragment> {
    let mut fragments = Vec::new();
    let mut state = TextState::default();
    let mut saved: Vec<Matrix> = Vec::new();

    for op in &content.operations {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "q" => saved.push(state.ctm),
            "Q" => {
                if let Some(ctm) = saved.pop() {
                    state.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = numbers::<6>(operands) {
                    state.ctm = multiply(&m, &state.ctm);
                }
            }
            "BT" => {
                state.text_matrix = IDENTITY;
                state.line_matrix = IDENTITY;
            }
            "Tf" => {
                state.font_name = operands
                    .first()
                    .and_then(|o| o.as_name_str().ok())
                    .map(str::to_string);
                if let Some(size) = operands.get(1).and_then(number) {
                    state.font_size = size;
                }
            }
            "TL" => {
                if let Some([leading]) = numbers::<1>(operands) {
                    state.leading = leading;
                }
            }
            "Td" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    state.move_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    state.leading = -ty;
                    state.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = numbers::<6>(operands) {
                    state.line_matrix = m;
                    state.text_matrix = m;
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(text) = string_operand(operands, 0) {
                    let advance = string_advance(&text);
                    fragments.extend(state.show(text, advance));
                }
            }
            "'" => {
                state.next_line();
                if let Some(text) = string_operand(operands, 0) {
                    let advance = string_advance(&text);
                    fragments.extend(state.show(text, advance));
                }
            }
            "\"" => {
                state.next_line();
                if let Some(text) = string_operand(operands, 2) {
                    let advance = string_advance(&text);
                    fragments.extend(state.show(text, advance));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let (text, advance) = text_array(items);
                    fragments.extend(state.show(text, advance));
                }
            }
            _ => {}
        }
    }
    fragments
}

/// Extract one page; failures name the page and are meant to be non-fatal
pub fn extract_page(doc: &Document, page: u32, page_id: ObjectId) -> Result<PageText, FormError> {
    let failure = |reason: String| FormError::TextExtractionFailure { page, reason };

    let raw = doc
        .get_page_content(page_id)
        .map_err(|e| failure(e.to_string()))?;
    let content = Content::decode(&raw).map_err(|e| failure(e.to_string()))?;

    Ok(PageText {
        page,
        size: page_size(doc, page_id),
        fragments: fragments_from_content(&content),
    })
}

/// Extract every page, in page order
pub fn extract_pages(document: &LopdfDocument) -> Vec<Result<PageText, FormError>> {
    document
        .page_ids()
        .iter()
        .map(|(&page, &page_id)| extract_page(document.document(), page, page_id))
        .collect()
}
