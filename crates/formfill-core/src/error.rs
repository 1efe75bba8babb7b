use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    /// Wrong MIME type, oversized, or not a PDF at all
    #[error("Invalid input file: {0}")]
    InvalidInputFile(String),

    #[error("Failed to load PDF: {0}")]
    DocumentLoadFailure(String),

    /// Per-page and non-fatal: the page just yields no candidates
    #[error("Text extraction failed on page {page}: {reason}")]
    TextExtractionFailure { page: u32, reason: String },

    #[error("Validation failed: {}", .errors.join("; "))]
    ValidationFailure { errors: Vec<String> },

    #[error("Failed to export PDF: {0}")]
    ExportFailure(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FormError>;
