use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfBackendError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Page {0} does not exist")]
    MissingPage(u32),

    #[error("Failed to write page content: {0}")]
    Content(String),

    #[error("Failed to save PDF: {0}")]
    Save(String),
}

impl From<lopdf::Error> for PdfBackendError {
    fn from(e: lopdf::Error) -> Self {
        PdfBackendError::Content(e.to_string())
    }
}
