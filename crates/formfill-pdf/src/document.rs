//! lopdf implementation of the export backend
//!
//! Drawing appends a new content stream to the page. The page's existing
//! content is wrapped in `q ... Q` first so that graphics state it leaves
//! behind cannot shift or recolor what we draw.

use crate::error::PdfBackendError;
use crate::page::{page_size, resolve};
use formfill_core::{DocumentBackend, PdfDocument};
use formfill_types::{DrawOp, PageSize, Rgb, StandardFont};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;

/// Loads documents with lopdf
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

impl DocumentBackend for LopdfBackend {
    type Document = LopdfDocument;
    type Error = PdfBackendError;

    fn load(&self, bytes: &[u8]) -> Result<LopdfDocument, PdfBackendError> {
        LopdfDocument::load(bytes)
    }
}

pub struct LopdfDocument {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
    fonts: BTreeMap<StandardFont, ObjectId>,
}

impl LopdfDocument {
    pub fn load(bytes: &[u8]) -> Result<Self, PdfBackendError> {
        let doc = Document::load_mem(bytes).map_err(|e| PdfBackendError::Parse(e.to_string()))?;
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages();
        Self {
            doc,
            pages,
            fonts: BTreeMap::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub(crate) fn page_ids(&self) -> &BTreeMap<u32, ObjectId> {
        &self.pages
    }

    fn page_id(&self, page: u32) -> Result<ObjectId, PdfBackendError> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(PdfBackendError::MissingPage(page))
    }

    /// Shared font object for `font`, created on first use
    fn font_object(&mut self, font: StandardFont) -> ObjectId {
        if let Some(id) = self.fonts.get(&font) {
            return *id;
        }
        let mut dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
        };
        if font != StandardFont::ZapfDingbats {
            dict.set("Encoding", "WinAnsiEncoding");
        }
        let id = self.doc.add_object(dict);
        self.fonts.insert(font, id);
        id
    }

    /// Register `fonts` in the page's /Resources /Font dictionary
    fn add_font_resources(
        &mut self,
        page_id: ObjectId,
        fonts: &[StandardFont],
    ) -> Result<(), PdfBackendError> {
        let resources_id = self.own_resources(page_id)?;

        let entries: Vec<(&'static str, ObjectId)> = fonts
            .iter()
            .map(|font| (font.resource_name(), self.font_object(*font)))
            .collect();

        let font_entry = self
            .doc
            .get_object(resources_id)?
            .as_dict()?
            .get(b"Font")
            .ok()
            .cloned();

        match font_entry {
            Some(Object::Reference(font_dict_id)) => {
                let font_dict = self.doc.get_object_mut(font_dict_id)?.as_dict_mut()?;
                for (name, id) in entries {
                    font_dict.set(name, Object::Reference(id));
                }
            }
            other => {
                let mut font_dict = match other {
                    Some(Object::Dictionary(dict)) => dict,
                    _ => Dictionary::new(),
                };
                for (name, id) in entries {
                    font_dict.set(name, Object::Reference(id));
                }
                self.doc
                    .get_object_mut(resources_id)?
                    .as_dict_mut()?
                    .set("Font", Object::Dictionary(font_dict));
            }
        }
        Ok(())
    }

    /// Make the page's resources an indirect object we can edit.
    ///
    /// Inline resources are moved out; inherited ones are copied so the
    /// parent's dictionary stays untouched.
    fn own_resources(&mut self, page_id: ObjectId) -> Result<ObjectId, PdfBackendError> {
        let direct = self
            .doc
            .get_object(page_id)?
            .as_dict()?
            .get(b"Resources")
            .ok()
            .cloned();

        if let Some(Object::Reference(id)) = direct {
            return Ok(id);
        }

        let dict = match direct {
            Some(Object::Dictionary(dict)) => dict,
            _ => crate::page::inherited_attribute(&self.doc, page_id, b"Resources")
                .and_then(|object| resolve(&self.doc, object).as_dict().ok())
                .cloned()
                .unwrap_or_default(),
        };
        let id = self.doc.add_object(dict);
        self.doc
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Resources", Object::Reference(id));
        Ok(id)
    }

    fn append_content(&mut self, page_id: ObjectId, content: Vec<u8>) -> Result<(), PdfBackendError> {
        let save_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let mut ours = b"\nQ\n".to_vec();
        ours.extend(content);
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), ours));

        let existing = self
            .doc
            .get_object(page_id)?
            .as_dict()?
            .get(b"Contents")
            .ok()
            .cloned();
        // An indirect /Contents may point at an array of streams
        let mut contents = match existing {
            Some(Object::Reference(id)) => match self.doc.get_object(id) {
                Ok(Object::Array(streams)) => streams.clone(),
                _ => vec![Object::Reference(id)],
            },
            Some(Object::Array(streams)) => streams,
            _ => Vec::new(),
        };
        contents.insert(0, Object::Reference(save_id));

        let page = self.doc.get_object_mut(page_id)?.as_dict_mut()?;
        contents.push(Object::Reference(content_id));
        page.set("Contents", Object::Array(contents));
        Ok(())
    }
}

impl PdfDocument for LopdfDocument {
    type Error = PdfBackendError;

    fn page_sizes(&self) -> Vec<PageSize> {
        self.pages
            .values()
            .map(|id| page_size(&self.doc, *id))
            .collect()
    }

    fn draw_page(&mut self, page: u32, ops: &[DrawOp]) -> Result<(), PdfBackendError> {
        if ops.is_empty() {
            return Ok(());
        }
        let page_id = self.page_id(page)?;

        let mut fonts: Vec<StandardFont> = ops.iter().filter_map(DrawOp::font).collect();
        fonts.sort();
        fonts.dedup();
        if !fonts.is_empty() {
            self.add_font_resources(page_id, &fonts)?;
        }

        let content: Content<Vec<Operation>> = Content {
            operations: ops.iter().flat_map(content_operations).collect(),
        };
        let encoded = content
            .encode()
            .map_err(|e| PdfBackendError::Content(e.to_string()))?;
        self.append_content(page_id, encoded)?;

        tracing::debug!(page, operations = ops.len(), "Appended field content");
        Ok(())
    }

    fn save(mut self) -> Result<Vec<u8>, PdfBackendError> {
        let mut output = Vec::new();
        self.doc
            .save_to(&mut output)
            .map_err(|e| PdfBackendError::Save(e.to_string()))?;
        Ok(output)
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn color_operands(color: Rgb) -> Vec<Object> {
    vec![
        Object::Real(color.r),
        Object::Real(color.g),
        Object::Real(color.b),
    ]
}

/// Standard fonts use WinAnsiEncoding; anything outside Latin-1 becomes `?`
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}

fn content_operations(op: &DrawOp) -> Vec<Operation> {
    match op {
        DrawOp::Text {
            x,
            y,
            size,
            font,
            color,
            text,
        } => vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font.resource_name().as_bytes().to_vec()), real(*size)],
            ),
            Operation::new("rg", color_operands(*color)),
            Operation::new("Td", vec![real(*x), real(*y)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_text(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ],
        DrawOp::Rectangle {
            x,
            y,
            width,
            height,
            border_color,
            border_width,
        } => vec![
            Operation::new("q", vec![]),
            Operation::new("RG", color_operands(*border_color)),
            Operation::new("w", vec![real(*border_width)]),
            Operation::new("re", vec![real(*x), real(*y), real(*width), real(*height)]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ],
        DrawOp::Line {
            start,
            end,
            thickness,
            color,
        } => vec![
            Operation::new("q", vec![]),
            Operation::new("RG", color_operands(*color)),
            Operation::new("w", vec![real(*thickness)]),
            Operation::new("m", vec![real(start.0), real(start.1)]),
            Operation::new("l", vec![real(end.0), real(end.1)]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ],
    }
}
