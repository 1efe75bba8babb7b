//! Form-field detection, placement and flattened export
//!
//! The pipeline, leaf first:
//! - `lines`: cluster positioned text fragments into visual lines
//! - `detect`: find candidate fields in those lines via the `patterns` table
//! - `store`: the user's confirmed fields
//! - `geometry`: screen <-> PDF coordinate conversion for the overlay
//! - `export`: validate, draw field values onto pages, serialize
//!
//! This crate never parses PDF itself. Loading, drawing and saving go
//! through the [`DocumentBackend`] trait.

pub mod config;
pub mod detect;
pub mod error;
pub mod export;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod lines;
pub mod patterns;
pub mod session;
pub mod store;
pub mod validate;

pub use config::EditorConfig;
pub use detect::{FieldDetector, PageText};
pub use error::{FormError, Result};
pub use export::{
    organize_fields_by_page, render_field, DocumentBackend, DrawPlan, ExportPipeline,
    ExportedDocument, PdfDocument,
};
pub use geometry::{to_pdf_space, to_screen_space, ScreenRect, Viewport};
pub use input::check_input_file;
pub use lines::{cluster_lines, Line};
pub use session::{EditorSession, LoadTicket, LoadedDocument};
pub use store::FieldStore;
pub use validate::{validate_fields, ValidationReport};
