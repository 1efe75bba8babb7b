//! Editor session: one open document, its fields, and a generation guard
//!
//! Loads and exports may complete after the user has already picked
//! another file. Every load bumps the generation; a result carrying an
//! older [`LoadTicket`] is discarded instead of being merged into the new
//! document's state.

use crate::config::EditorConfig;
use crate::detect::{FieldDetector, PageText};
use crate::error::{FormError, Result};
use crate::export::{DocumentBackend, ExportPipeline, ExportedDocument, PdfDocument};
use crate::input::check_input_file;
use crate::store::FieldStore;
use crate::validate::{validate_fields, ValidationReport};
use formfill_types::{CandidateField, PageSize};
use std::collections::BTreeMap;

/// Generation token handed out when a load starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A parsed document ready to become the session's current one
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
    pub pages: Vec<PageSize>,
}

#[derive(Debug, Clone)]
struct OpenDocument {
    name: String,
    bytes: Vec<u8>,
    pages: Vec<PageSize>,
}

pub struct EditorSession {
    config: EditorConfig,
    generation: u64,
    document: Option<OpenDocument>,
    store: FieldStore,
    candidates: BTreeMap<u32, Vec<CandidateField>>,
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        let store = FieldStore::with_limits(config.fields.clone());
        Self {
            config,
            generation: 0,
            document: None,
            store,
            candidates: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Ticket for the currently open document
    pub fn current_ticket(&self) -> LoadTicket {
        LoadTicket {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Start loading a new file; invalidates every outstanding ticket
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        tracing::debug!(generation = self.generation, "Begin load");
        self.current_ticket()
    }

    /// Install a loaded document.
    ///
    /// Returns false if the ticket is stale, in which case nothing changes.
    /// Otherwise the previous document, fields and candidates are dropped.
    pub fn finish_load(&mut self, ticket: LoadTicket, loaded: LoadedDocument) -> bool {
        if !self.is_current(ticket) {
            tracing::warn!(
                stale = ticket.generation,
                current = self.generation,
                name = %loaded.name,
                "Discarding stale load result"
            );
            return false;
        }

        tracing::info!(name = %loaded.name, pages = loaded.pages.len(), "Loaded document");
        self.store.clear();
        self.candidates.clear();
        self.document = Some(OpenDocument {
            name: loaded.name,
            bytes: loaded.bytes,
            pages: loaded.pages,
        });
        true
    }

    /// Check, parse and install `bytes` in one step.
    ///
    /// On failure the previously open document stays open.
    pub fn load<B: DocumentBackend>(
        &mut self,
        backend: &B,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<LoadTicket> {
        check_input_file(&bytes, mime_type, &self.config.upload)?;
        let ticket = self.begin_load();
        let loaded = read_document(backend, name, bytes)?;
        self.finish_load(ticket, loaded);
        Ok(ticket)
    }

    /// Complete a load started with [`EditorSession::begin_load`] from raw bytes.
    ///
    /// Returns `Ok(false)` when the ticket went stale while the bytes were
    /// being read.
    pub fn finish_load_bytes<B: DocumentBackend>(
        &mut self,
        ticket: LoadTicket,
        backend: &B,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<bool> {
        check_input_file(&bytes, mime_type, &self.config.upload)?;
        let loaded = read_document(backend, name, bytes)?;
        Ok(self.finish_load(ticket, loaded))
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.name.as_str())
    }

    pub fn document_bytes(&self) -> Option<&[u8]> {
        self.document.as_ref().map(|d| d.bytes.as_slice())
    }

    pub fn page_count(&self) -> u32 {
        self.document.as_ref().map_or(0, |d| d.pages.len() as u32)
    }

    /// Size of 1-based `page`
    pub fn page_size(&self, page: u32) -> Option<PageSize> {
        let index = page.checked_sub(1)? as usize;
        self.document.as_ref()?.pages.get(index).copied()
    }

    pub fn fields(&self) -> &FieldStore {
        &self.store
    }

    pub fn fields_mut(&mut self) -> &mut FieldStore {
        &mut self.store
    }

    /// Run detection over extracted page text and keep the candidates.
    ///
    /// Results for a stale ticket are discarded and `None` is returned.
    pub fn finish_detection<I>(
        &mut self,
        ticket: LoadTicket,
        pages: I,
    ) -> Option<&BTreeMap<u32, Vec<CandidateField>>>
    where
        I: IntoIterator<Item = Result<PageText>>,
    {
        if !self.is_current(ticket) {
            tracing::warn!(
                stale = ticket.generation,
                current = self.generation,
                "Discarding stale detection result"
            );
            return None;
        }
        let detector = FieldDetector::new(self.config.detection.clone());
        self.candidates = detector.detect_document(pages);
        Some(&self.candidates)
    }

    pub fn candidates(&self, page: u32) -> &[CandidateField] {
        self.candidates.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Move candidate `index` of `page` into the field store
    pub fn accept_candidate(&mut self, page: u32, index: usize) -> Option<String> {
        let candidates = self.candidates.get_mut(&page)?;
        if index >= candidates.len() {
            return None;
        }
        let candidate = candidates.remove(index);
        Some(self.store.accept(candidate, page))
    }

    pub fn validate(&self) -> ValidationReport {
        validate_fields(self.store.list_all())
    }

    /// Export the current document with every stored field
    pub fn export<B: DocumentBackend>(
        &self,
        pipeline: &ExportPipeline<B>,
        filename: Option<&str>,
    ) -> Result<ExportedDocument> {
        let ticket = self.current_ticket();
        let bytes = self
            .document_bytes()
            .ok_or_else(|| FormError::ExportFailure("no document loaded".to_string()))?;
        let exported = pipeline.export(bytes, self.store.list_all(), filename)?;
        self.finish_export(ticket, exported)
            .ok_or_else(|| FormError::ExportFailure("document changed during export".to_string()))
    }

    /// Hand back an export result only if its document is still open
    pub fn finish_export(
        &self,
        ticket: LoadTicket,
        exported: ExportedDocument,
    ) -> Option<ExportedDocument> {
        if self.is_current(ticket) {
            Some(exported)
        } else {
            tracing::warn!(
                stale = ticket.generation,
                current = self.generation,
                filename = %exported.filename,
                "Discarding stale export result"
            );
            None
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

/// Parse `bytes` and collect page sizes; a document without pages is an error
fn read_document<B: DocumentBackend>(
    backend: &B,
    name: &str,
    bytes: Vec<u8>,
) -> Result<LoadedDocument> {
    let document = backend
        .load(&bytes)
        .map_err(|e| FormError::DocumentLoadFailure(e.to_string()))?;
    let pages = document.page_sizes();
    if pages.is_empty() {
        return Err(FormError::DocumentLoadFailure(
            "document has no pages".to_string(),
        ));
    }
    Ok(LoadedDocument {
        name: name.to_string(),
        bytes,
        pages,
    })
}
