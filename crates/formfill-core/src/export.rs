//! Flattened export: field values become static page content
//!
//! Export is split in two. [`render_field`] turns one field into draw
//! operations (pure, PDF space), and [`ExportPipeline`] applies those
//! operations through a [`DocumentBackend`], which knows how to load,
//! draw on and serialize a PDF. Nothing here writes PDF syntax itself.

use crate::config::ExportConfig;
use crate::error::{FormError, Result};
use crate::layout::{fit_single_line, format_date, max_chars, wrap_text};
use crate::validate::validate_fields;
use formfill_types::{DrawOp, Field, FieldType, PageSize, Rgb, StandardFont};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// ZapfDingbats code for a check mark
const CHECK_MARK: &str = "4";

/// An opened, mutable PDF document
pub trait PdfDocument {
    type Error: Display;

    /// Sizes of all pages; index 0 is page 1
    fn page_sizes(&self) -> Vec<PageSize>;

    /// Append `ops` to the content of 1-based `page`
    fn draw_page(&mut self, page: u32, ops: &[DrawOp]) -> std::result::Result<(), Self::Error>;

    fn save(self) -> std::result::Result<Vec<u8>, Self::Error>;
}

/// Opens documents from raw bytes
pub trait DocumentBackend {
    type Document: PdfDocument;
    type Error: Display;

    fn load(&self, bytes: &[u8]) -> std::result::Result<Self::Document, Self::Error>;
}

/// Draw operations grouped by 1-based page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawPlan {
    pages: BTreeMap<u32, Vec<DrawOp>>,
}

impl DrawPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, page: u32, ops: impl IntoIterator<Item = DrawOp>) {
        self.pages.entry(page).or_default().extend(ops);
    }

    pub fn operations_for_page(&self, page: u32) -> &[DrawOp] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn pages(&self) -> impl Iterator<Item = (u32, &[DrawOp])> {
        self.pages.iter().map(|(page, ops)| (*page, ops.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group fields by page; page 0 is treated as page 1
pub fn organize_fields_by_page(fields: &[Field]) -> BTreeMap<u32, Vec<&Field>> {
    let mut by_page: BTreeMap<u32, Vec<&Field>> = BTreeMap::new();
    for field in fields {
        by_page.entry(field.page.max(1)).or_default().push(field);
    }
    by_page
}

/// Draw operations for one field, in PDF space
pub fn render_field(field: &Field, config: &ExportConfig) -> Vec<DrawOp> {
    match field.field_type {
        FieldType::Text | FieldType::Email | FieldType::Tel => match text_value(field) {
            Some(text) => vec![single_line(text, field.x, field.y, field.width, field.height, config)],
            None => Vec::new(),
        },
        FieldType::Date => match text_value(field) {
            Some(text) => vec![single_line(
                &format_date(text),
                field.x,
                field.y,
                field.width,
                field.height,
                config,
            )],
            None => Vec::new(),
        },
        FieldType::Textarea => match text_value(field) {
            Some(text) => multi_line(text, field, config),
            None => Vec::new(),
        },
        FieldType::Checkbox => checkbox(field, config),
        FieldType::Signature => match text_value(field) {
            Some(text) => signature(text, field, config),
            None => Vec::new(),
        },
    }
}

fn text_value(field: &Field) -> Option<&str> {
    if field.value.is_blank() {
        return None;
    }
    field.value.as_text()
}

fn single_line(text: &str, x: f64, y: f64, width: f64, height: f64, config: &ExportConfig) -> DrawOp {
    let size = config.max_text_font_size.min(height * 0.6);
    DrawOp::Text {
        x: x + config.text_padding,
        y: y + (height - size) / 2.0,
        size,
        font: StandardFont::Helvetica,
        color: Rgb::BLACK,
        text: fit_single_line(text, width, size, config.char_width_factor),
    }
}

fn multi_line(text: &str, field: &Field, config: &ExportConfig) -> Vec<DrawOp> {
    let size = config.textarea_font_size;
    let line_height = size * config.textarea_line_height;
    let max_lines = (field.height / line_height).floor().max(0.0) as usize;
    let per_line = max_chars(field.width, size, config.char_width_factor);

    wrap_text(text, per_line, max_lines)
        .into_iter()
        .enumerate()
        .map(|(i, line)| DrawOp::Text {
            x: field.x + config.text_padding,
            y: field.y + field.height - (i as f64 + 1.0) * line_height,
            size,
            font: StandardFont::Helvetica,
            color: Rgb::BLACK,
            text: line,
        })
        .collect()
}

fn checkbox(field: &Field, config: &ExportConfig) -> Vec<DrawOp> {
    let size = field.width.min(field.height).min(config.max_checkbox_size);
    let box_y = field.y + (field.height - size) / 2.0;

    let mut ops = vec![DrawOp::Rectangle {
        x: field.x,
        y: box_y,
        width: size,
        height: size,
        border_color: Rgb::BLACK,
        border_width: 1.0,
    }];

    if field.value.is_checked() {
        ops.push(DrawOp::Text {
            x: field.x + 1.0,
            y: box_y + 1.0,
            size: size * 0.8,
            font: StandardFont::ZapfDingbats,
            color: Rgb::BLACK,
            text: CHECK_MARK.to_string(),
        });
    }

    if let Some(label) = field.label.as_deref().filter(|l| !l.trim().is_empty()) {
        ops.push(single_line(
            label,
            field.x + field.width + config.checkbox_label_gap,
            field.y,
            config.checkbox_label_width,
            field.height,
            config,
        ));
    }
    ops
}

fn signature(text: &str, field: &Field, config: &ExportConfig) -> Vec<DrawOp> {
    let size = config.max_signature_font_size.min(field.height * 0.7);
    vec![
        DrawOp::Line {
            start: (field.x, field.y),
            end: (field.x + field.width, field.y),
            thickness: 1.0,
            color: Rgb::BLACK,
        },
        DrawOp::Text {
            x: field.x + config.text_padding,
            y: field.y + config.text_padding,
            size,
            font: StandardFont::HelveticaBold,
            color: Rgb::SIGNATURE_INK,
            text: fit_single_line(text, field.width, size, config.char_width_factor),
        },
    ]
}

/// Result of a successful export, ready to hand to the file-save collaborator
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Validation warnings plus one entry per dropped field
    pub warnings: Vec<String>,
    pub operations: usize,
}

pub struct ExportPipeline<B: DocumentBackend> {
    backend: B,
    config: ExportConfig,
}

impl<B: DocumentBackend> ExportPipeline<B> {
    pub fn new(backend: B, config: ExportConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Build the draw plan for a document with `page_count` pages.
    ///
    /// Fields on pages the document does not have are dropped; the returned
    /// list names each of them.
    pub fn plan(&self, fields: &[Field], page_count: u32) -> (DrawPlan, Vec<String>) {
        let mut plan = DrawPlan::new();
        let mut dropped = Vec::new();

        for (page, page_fields) in organize_fields_by_page(fields) {
            if page > page_count {
                for field in page_fields {
                    tracing::warn!(id = %field.id, page, page_count, "Dropping field on missing page");
                    dropped.push(format!(
                        "Field {} ({}) is on page {} but the document has {} pages",
                        field.id, field.field_type, page, page_count
                    ));
                }
                continue;
            }
            for field in page_fields {
                plan.extend(page, render_field(field, &self.config));
            }
        }

        (plan, dropped)
    }

    /// Validate, draw every field into a copy of `source`, and serialize it.
    ///
    /// Hard validation errors abort before the document is touched. Any
    /// load, draw or save error aborts the whole export as one
    /// `ExportFailure`.
    pub fn export(
        &self,
        source: &[u8],
        fields: &[Field],
        filename: Option<&str>,
    ) -> Result<ExportedDocument> {
        let mut warnings = validate_fields(fields).into_result()?;

        let mut document = self
            .backend
            .load(source)
            .map_err(|e| FormError::ExportFailure(format!("could not load source: {}", e)))?;

        let page_count = document.page_sizes().len() as u32;
        let (plan, dropped) = self.plan(fields, page_count);
        warnings.extend(dropped);

        for (page, ops) in plan.pages() {
            if ops.is_empty() {
                continue;
            }
            tracing::debug!(page, operations = ops.len(), "Drawing fields");
            document
                .draw_page(page, ops)
                .map_err(|e| FormError::ExportFailure(format!("page {}: {}", page, e)))?;
        }

        let bytes = document
            .save()
            .map_err(|e| FormError::ExportFailure(format!("could not save: {}", e)))?;

        let filename = filename
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.config.default_filename)
            .to_string();
        tracing::info!(%filename, bytes = bytes.len(), operations = plan.len(), "Exported PDF");

        Ok(ExportedDocument {
            filename,
            bytes,
            warnings,
            operations: plan.len(),
        })
    }
}
