//! Stateful editor session
//!
//! Holds the open document and its fields in Rust. JavaScript only reads
//! files, forwards pointer events and triggers downloads.

use crate::download::download_pdf;
use formfill_core::geometry::{clamp_size, clamp_to_page, ScreenRect, Viewport};
use formfill_core::{
    EditorConfig, EditorSession, ExportPipeline, ExportedDocument, FormError, LoadTicket,
    ValidationReport,
};
use formfill_pdf::{extract_pages, LopdfBackend, LopdfDocument};
use formfill_types::{
    CandidateField, Field, FieldPatch, FieldType, FieldValue, PageSize, PdfRect,
};
use serde::Serialize;
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub name: String,
    pub page_count: u32,
    pub pages: Vec<PageSize>,
}

/// Render-only view of a field in overlay coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub page: u32,
    pub rect: ScreenRect,
    pub value: FieldValue,
    pub placeholder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub required: bool,
}

impl ScreenField {
    fn new(field: &Field, viewport: &Viewport) -> Self {
        Self {
            id: field.id.clone(),
            field_type: field.field_type,
            page: field.page,
            rect: viewport.to_screen(field.rect()),
            value: field.value.clone(),
            placeholder: field.placeholder.clone(),
            label: field.label.clone(),
            required: field.required,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportSummary<'a> {
    filename: &'a str,
    warnings: &'a [String],
    operations: usize,
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Browser-facing form editor session
#[wasm_bindgen]
pub struct FormFillSession {
    inner: EditorSession,
    pending: Option<LoadTicket>,
}

impl FormFillSession {
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            inner: EditorSession::new(config),
            pending: None,
        }
    }

    fn begin_load_internal(&mut self) -> u64 {
        let ticket = self.inner.begin_load();
        self.pending = Some(ticket);
        ticket.generation()
    }

    /// Finish the load started as `generation`.
    ///
    /// `Ok(None)` means another file was selected in the meantime and this
    /// one was discarded.
    fn finish_load_internal(
        &mut self,
        generation: u64,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<DocumentInfo>, String> {
        let Some(ticket) = self.pending.filter(|t| t.generation() == generation) else {
            tracing::warn!(generation, %name, "Ignoring load for a superseded file");
            return Ok(None);
        };

        let installed = self
            .inner
            .finish_load_bytes(ticket, &LopdfBackend, name, mime_type, bytes)
            .map_err(|e| e.to_string())?;
        if !installed {
            return Ok(None);
        }
        self.pending = None;
        Ok(self.document_info())
    }

    fn load_internal(
        &mut self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentInfo, String> {
        let generation = self.begin_load_internal();
        self.finish_load_internal(generation, name, mime_type, bytes)?
            .ok_or_else(|| "Load was superseded".to_string())
    }

    fn document_info(&self) -> Option<DocumentInfo> {
        let name = self.inner.document_name()?.to_string();
        let page_count = self.inner.page_count();
        Some(DocumentInfo {
            name,
            page_count,
            pages: (1..=page_count)
                .filter_map(|page| self.inner.page_size(page))
                .collect(),
        })
    }

    fn viewport(&self, page: u32, scale: f64) -> Result<Viewport, String> {
        let size = self
            .inner
            .page_size(page)
            .ok_or_else(|| format!("Page {} does not exist", page))?;
        Ok(Viewport::new(size, scale, &self.inner.config().zoom))
    }

    fn detect_internal(&mut self) -> Result<BTreeMap<u32, Vec<CandidateField>>, String> {
        let bytes = self
            .inner
            .document_bytes()
            .ok_or_else(|| "No document loaded".to_string())?;
        let document = LopdfDocument::load(bytes)
            .map_err(|e| FormError::DocumentLoadFailure(e.to_string()).to_string())?;
        let pages = extract_pages(&document);

        let ticket = self.inner.current_ticket();
        self.inner
            .finish_detection(ticket, pages)
            .cloned()
            .ok_or_else(|| "Document changed during detection".to_string())
    }

    fn accept_candidate_internal(&mut self, page: u32, index: usize) -> Result<String, String> {
        self.inner
            .accept_candidate(page, index)
            .ok_or_else(|| format!("No candidate {} on page {}", index, page))
    }

    fn add_field_internal(&mut self, field_type: &str, page: u32, x: f64, y: f64) -> Result<String, String> {
        let field_type = FieldType::parse(field_type)
            .ok_or_else(|| format!("Unknown field type: {}", field_type))?;
        if self.inner.page_size(page).is_none() {
            return Err(format!("Page {} does not exist", page));
        }
        Ok(self.inner.fields_mut().place(field_type, page, x, y))
    }

    /// Drop a new field with its top-left corner at a screen position
    fn add_field_at_screen_internal(
        &mut self,
        field_type: &str,
        page: u32,
        screen_x: f64,
        screen_y: f64,
        scale: f64,
    ) -> Result<String, String> {
        let field_type = FieldType::parse(field_type)
            .ok_or_else(|| format!("Unknown field type: {}", field_type))?;
        let viewport = self.viewport(page, scale)?;
        let (width, height) = field_type.default_dimensions();

        let rect = viewport.to_pdf(ScreenRect {
            x: screen_x,
            y: screen_y,
            width: width * viewport.scale,
            height: height * viewport.scale,
        });
        let rect = clamp_to_page(rect, viewport.page);
        Ok(self
            .inner
            .fields_mut()
            .add(Field::new_with_rect(field_type, page, rect)))
    }

    /// Drag: move a field's top-left corner to a screen position
    fn move_field_internal(&mut self, id: &str, screen_x: f64, screen_y: f64, scale: f64) -> Result<bool, String> {
        let Some(field) = self.inner.fields().get(id) else {
            return Ok(false);
        };
        let viewport = self.viewport(field.page, scale)?;
        let current = viewport.to_screen(field.rect());

        let moved = viewport.to_pdf(ScreenRect {
            x: screen_x,
            y: screen_y,
            ..current
        });
        let moved = clamp_to_page(moved, viewport.page);
        Ok(self
            .inner
            .fields_mut()
            .update(id, &FieldPatch::position(moved.x, moved.y)))
    }

    /// Resize from the bottom-right handle; the top-left corner stays put
    fn resize_field_internal(
        &mut self,
        id: &str,
        screen_width: f64,
        screen_height: f64,
        scale: f64,
    ) -> Result<bool, String> {
        let Some(field) = self.inner.fields().get(id) else {
            return Ok(false);
        };
        let field_type = field.field_type;
        let viewport = self.viewport(field.page, scale)?;
        let current = viewport.to_screen(field.rect());

        let (width, height) = clamp_size(
            field_type,
            screen_width / viewport.scale,
            screen_height / viewport.scale,
            &self.inner.config().fields,
        );
        let resized: PdfRect = viewport.to_pdf(ScreenRect {
            width: width * viewport.scale,
            height: height * viewport.scale,
            ..current
        });
        let patch = FieldPatch {
            y: Some(resized.y),
            ..FieldPatch::size(resized.width, resized.height)
        };
        Ok(self.inner.fields_mut().update(id, &patch))
    }

    fn update_field_internal(&mut self, id: &str, patch_json: &str) -> Result<bool, String> {
        let patch: FieldPatch = serde_json::from_str(patch_json)
            .map_err(|e| format!("Failed to parse field update: {}", e))?;
        Ok(self.inner.fields_mut().update(id, &patch))
    }

    fn fields_internal(&self, page: Option<u32>) -> Vec<Field> {
        match page {
            Some(page) => self
                .inner
                .fields()
                .list_by_page(page)
                .into_iter()
                .cloned()
                .collect(),
            None => self.inner.fields().list_all().to_vec(),
        }
    }

    fn screen_fields_internal(&self, page: u32, scale: f64) -> Result<Vec<ScreenField>, String> {
        let viewport = self.viewport(page, scale)?;
        Ok(self
            .inner
            .fields()
            .list_by_page(page)
            .into_iter()
            .map(|field| ScreenField::new(field, &viewport))
            .collect())
    }

    fn validate_internal(&self) -> ValidationReport {
        self.inner.validate()
    }

    fn export_internal(&self, filename: Option<&str>) -> Result<ExportedDocument, String> {
        let pipeline = ExportPipeline::new(LopdfBackend, self.inner.config().export.clone());
        self.inner
            .export(&pipeline, filename)
            .map_err(|e| e.to_string())
    }
}

#[wasm_bindgen]
impl FormFillSession {
    /// Create a session, optionally overriding defaults with a TOML config
    #[wasm_bindgen(constructor)]
    pub fn new(config_toml: Option<String>) -> Result<FormFillSession, JsValue> {
        let config = match config_toml {
            Some(toml) if !toml.trim().is_empty() => EditorConfig::from_toml_str(&toml)
                .map_err(|e| JsValue::from_str(&e.to_string()))?,
            _ => EditorConfig::default(),
        };
        Ok(Self::with_config(config))
    }

    /// Start loading a newly selected file. Pass the returned generation to
    /// `finishLoad` once the bytes have been read.
    #[wasm_bindgen(js_name = beginLoad)]
    pub fn begin_load(&mut self) -> u64 {
        self.begin_load_internal()
    }

    /// Returns document info, or `null` if a newer file was selected meanwhile
    #[wasm_bindgen(js_name = finishLoad)]
    pub fn finish_load(
        &mut self,
        generation: u64,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<JsValue, JsValue> {
        match self
            .finish_load_internal(generation, name, mime_type, bytes)
            .map_err(|e| JsValue::from_str(&e))?
        {
            Some(info) => to_js(&info),
            None => Ok(JsValue::NULL),
        }
    }

    /// Load in one step when the bytes are already available
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<JsValue, JsValue> {
        let info = self
            .load_internal(name, mime_type, bytes)
            .map_err(|e| JsValue::from_str(&e))?;
        to_js(&info)
    }

    #[wasm_bindgen(js_name = isLoaded)]
    pub fn is_loaded(&self) -> bool {
        self.inner.is_loaded()
    }

    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.inner.page_count()
    }

    /// Detected candidates keyed by page number
    #[wasm_bindgen(js_name = detectFields)]
    pub fn detect_fields(&mut self) -> Result<JsValue, JsValue> {
        let found = self.detect_internal().map_err(|e| JsValue::from_str(&e))?;
        to_js(&found)
    }

    #[wasm_bindgen(js_name = getCandidates)]
    pub fn get_candidates(&self, page: u32) -> Result<JsValue, JsValue> {
        to_js(&self.inner.candidates(page))
    }

    #[wasm_bindgen(js_name = acceptCandidate)]
    pub fn accept_candidate(&mut self, page: u32, index: usize) -> Result<String, JsValue> {
        self.accept_candidate_internal(page, index)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Add a field with default geometry at a PDF-space position
    #[wasm_bindgen(js_name = addField)]
    pub fn add_field(&mut self, field_type: &str, page: u32, x: f64, y: f64) -> Result<String, JsValue> {
        self.add_field_internal(field_type, page, x, y)
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = addFieldAtScreen)]
    pub fn add_field_at_screen(
        &mut self,
        field_type: &str,
        page: u32,
        screen_x: f64,
        screen_y: f64,
        scale: f64,
    ) -> Result<String, JsValue> {
        self.add_field_at_screen_internal(field_type, page, screen_x, screen_y, scale)
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = moveField)]
    pub fn move_field(&mut self, id: &str, screen_x: f64, screen_y: f64, scale: f64) -> Result<bool, JsValue> {
        self.move_field_internal(id, screen_x, screen_y, scale)
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = resizeField)]
    pub fn resize_field(
        &mut self,
        id: &str,
        screen_width: f64,
        screen_height: f64,
        scale: f64,
    ) -> Result<bool, JsValue> {
        self.resize_field_internal(id, screen_width, screen_height, scale)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Merge a JSON patch (`{"value": "..."}`, `{"x": 10, "y": 20}`, ...) into a field
    #[wasm_bindgen(js_name = updateField)]
    pub fn update_field(&mut self, id: &str, patch_json: &str) -> Result<bool, JsValue> {
        self.update_field_internal(id, patch_json)
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = deleteField)]
    pub fn delete_field(&mut self, id: &str) -> bool {
        self.inner.fields_mut().delete(id).is_some()
    }

    #[wasm_bindgen(js_name = clearFields)]
    pub fn clear_fields(&mut self) {
        self.inner.fields_mut().clear();
    }

    /// Stored fields in PDF space, optionally limited to one page
    #[wasm_bindgen(js_name = getFields)]
    pub fn get_fields(&self, page: Option<u32>) -> Result<JsValue, JsValue> {
        to_js(&self.fields_internal(page))
    }

    /// Fields of one page in overlay coordinates at `scale`
    #[wasm_bindgen(js_name = getScreenFields)]
    pub fn get_screen_fields(&self, page: u32, scale: f64) -> Result<JsValue, JsValue> {
        let fields = self
            .screen_fields_internal(page, scale)
            .map_err(|e| JsValue::from_str(&e))?;
        to_js(&fields)
    }

    #[wasm_bindgen]
    pub fn validate(&self) -> Result<JsValue, JsValue> {
        to_js(&self.validate_internal())
    }

    /// Export and return the flattened PDF bytes
    #[wasm_bindgen]
    pub fn export(&self, filename: Option<String>) -> Result<Vec<u8>, JsValue> {
        self.export_internal(filename.as_deref())
            .map(|exported| exported.bytes)
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Export and hand the file to the browser as a download.
    /// Returns `{ filename, warnings, operations }`.
    #[wasm_bindgen(js_name = exportAndDownload)]
    pub fn export_and_download(&self, filename: Option<String>) -> Result<JsValue, JsValue> {
        let exported = self
            .export_internal(filename.as_deref())
            .map_err(|e| JsValue::from_str(&e))?;
        download_pdf(&exported.bytes, &exported.filename)?;
        to_js(&ExportSummary {
            filename: &exported.filename,
            warnings: &exported.warnings,
            operations: exported.operations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Dictionary, Document, Object, Stream};
    use pretty_assertions::assert_eq;

    const PDF: &str = "application/pdf";

    fn create_test_pdf(content: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.as_bytes().to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
        });
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        });
        if let Ok(page) = doc.get_object_mut(page_id) {
            if let Ok(dict) = page.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn loaded_session() -> FormFillSession {
        let mut session = FormFillSession::with_config(EditorConfig::default());
        session
            .load_internal(
                "form.pdf",
                PDF,
                create_test_pdf("BT /F1 12 Tf 72 700 Td (Name: ___________) Tj ET"),
            )
            .unwrap();
        session
    }

    #[test]
    fn test_load_reports_pages() {
        let session = loaded_session();
        assert_eq!(
            session.document_info(),
            Some(DocumentInfo {
                name: "form.pdf".into(),
                page_count: 1,
                pages: vec![PageSize::LETTER],
            })
        );
    }

    #[test]
    fn test_superseded_load_is_ignored() {
        let mut session = FormFillSession::with_config(EditorConfig::default());
        let first = session.begin_load_internal();
        let second = session.begin_load_internal();

        let result = session
            .finish_load_internal(first, "old.pdf", PDF, create_test_pdf(""))
            .unwrap();
        assert!(result.is_none());
        assert!(!session.inner.is_loaded());

        let info = session
            .finish_load_internal(second, "new.pdf", PDF, create_test_pdf(""))
            .unwrap()
            .unwrap();
        assert_eq!(info.name, "new.pdf");
    }

    #[test]
    fn test_rejects_non_pdf_upload() {
        let mut session = FormFillSession::with_config(EditorConfig::default());
        let err = session
            .load_internal("photo.png", "image/png", create_test_pdf(""))
            .unwrap_err();
        assert!(err.starts_with("Invalid input file"));
    }

    #[test]
    fn test_detect_and_accept() {
        let mut session = loaded_session();
        let found = session.detect_internal().unwrap();
        assert_eq!(found[&1].len(), 1);

        let id = session.accept_candidate_internal(1, 0).unwrap();
        assert_eq!(session.fields_internal(Some(1))[0].id, id);
        assert!(session.accept_candidate_internal(1, 0).is_err());
    }

    #[test]
    fn test_add_field_validates_input() {
        let mut session = loaded_session();
        assert!(session.add_field_internal("signature", 1, 100.0, 100.0).is_ok());
        assert!(session.add_field_internal("radio", 1, 100.0, 100.0).is_err());
        assert!(session.add_field_internal("text", 2, 100.0, 100.0).is_err());
    }

    #[test]
    fn test_screen_drop_and_drag() {
        let mut session = loaded_session();
        let id = session
            .add_field_at_screen_internal("text", 1, 0.0, 0.0, 2.0)
            .unwrap();

        // Top-left of the screen is the top of the page
        let field = session.fields_internal(None)[0].clone();
        assert_eq!((field.x, field.y), (0.0, 792.0 - 30.0));
        assert_eq!((field.width, field.height), (150.0, 30.0));

        assert!(session.move_field_internal(&id, 200.0, 400.0, 2.0).unwrap());
        let field = session.fields_internal(None)[0].clone();
        assert_eq!((field.x, field.y), (100.0, 792.0 - 200.0 - 30.0));

        let screen = session.screen_fields_internal(1, 2.0).unwrap();
        assert_eq!(
            screen[0].rect,
            ScreenRect {
                x: 200.0,
                y: 400.0,
                width: 300.0,
                height: 60.0
            }
        );

        // Dragging past the page edge is clamped
        assert!(session.move_field_internal(&id, -50.0, 5000.0, 2.0).unwrap());
        let field = session.fields_internal(None)[0].clone();
        assert_eq!((field.x, field.y), (0.0, 0.0));

        assert!(!session.move_field_internal("missing", 0.0, 0.0, 1.0).unwrap());
    }

    #[test]
    fn test_resize_keeps_top_edge() {
        let mut session = loaded_session();
        let id = session.add_field_internal("text", 1, 100.0, 500.0).unwrap();
        assert!(session.resize_field_internal(&id, 200.0, 60.0, 1.0).unwrap());

        let field = session.fields_internal(None)[0].clone();
        assert_eq!((field.width, field.height), (200.0, 60.0));
        assert_eq!(field.y + field.height, 530.0);

        // Below the minimum size
        assert!(session.resize_field_internal(&id, 4.0, 4.0, 1.0).unwrap());
        let field = session.fields_internal(None)[0].clone();
        assert_eq!((field.width, field.height), (20.0, 20.0));
        assert_eq!(field.y + field.height, 530.0);
    }

    #[test]
    fn test_update_from_json() {
        let mut session = loaded_session();
        let id = session.add_field_internal("checkbox", 1, 10.0, 10.0).unwrap();

        assert!(session
            .update_field_internal(&id, r#"{"value": true, "label": "Agree"}"#)
            .unwrap());
        let field = session.fields_internal(None)[0].clone();
        assert_eq!(field.value, FieldValue::Checked(true));
        assert_eq!(field.label.as_deref(), Some("Agree"));

        assert!(session.update_field_internal(&id, "not json").is_err());
        assert!(!session.update_field_internal("missing", "{}").unwrap());
    }

    #[test]
    fn test_export_flattened_pdf() {
        let mut session = loaded_session();
        let id = session.add_field_internal("email", 1, 72.0, 600.0).unwrap();
        session
            .update_field_internal(&id, r#"{"value": "not-an-email"}"#)
            .unwrap();

        let report = session.validate_internal();
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);

        let exported = session.export_internal(None).unwrap();
        assert_eq!(exported.filename, "edited-document.pdf");
        assert!(exported.bytes.starts_with(b"%PDF-"));
        assert_eq!(exported.operations, 1);
    }

    #[test]
    fn test_export_without_document() {
        let session = FormFillSession::with_config(EditorConfig::default());
        assert!(session.export_internal(None).is_err());
    }
}
