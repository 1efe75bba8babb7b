//! Data model shared by the form-fill crates.
//!
//! All stored field geometry is in PDF space: origin at the page's
//! bottom-left corner, Y growing upward, unscaled points. Screen-space
//! values only exist transiently while rendering an overlay.

pub mod candidate;
pub mod draw;
pub mod field;
pub mod fragment;

pub use candidate::{CandidateField, PatternKind};
pub use draw::{DrawOp, Rgb, StandardFont};
pub use field::{Field, FieldPatch, FieldType, FieldValue, PageSize, PdfRect};
pub use fragment::TextFragment;
