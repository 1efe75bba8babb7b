//! lopdf-backed collaborators for formfill-core
//!
//! - [`LopdfBackend`] / [`LopdfDocument`]: load, list page sizes, draw
//!   field content and save, for the export pipeline
//! - [`extract_pages`]: positioned text fragments for field detection

pub mod document;
pub mod error;
pub mod extract;
pub mod page;

pub use document::{LopdfBackend, LopdfDocument};
pub use error::PdfBackendError;
pub use extract::{extract_page, extract_pages, fragments_from_content};

use formfill_core::{FieldDetector, FormError};
use formfill_types::CandidateField;
use std::collections::BTreeMap;

/// Parse `bytes` and run field detection over every page.
///
/// Only a document that cannot be parsed at all is an error; pages whose
/// text cannot be extracted just yield no candidates.
pub fn detect_fields(
    bytes: &[u8],
    detector: &FieldDetector,
) -> Result<BTreeMap<u32, Vec<CandidateField>>, FormError> {
    let document =
        LopdfDocument::load(bytes).map_err(|e| FormError::DocumentLoadFailure(e.to_string()))?;
    Ok(detector.detect_document(extract_pages(&document)))
}
