//! Checks applied to a selected file before any parsing is attempted

use crate::config::UploadConfig;
use crate::error::{FormError, Result};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Reject files by MIME type and size before reading their contents
pub fn check_upload(mime_type: &str, size: usize, config: &UploadConfig) -> Result<()> {
    if mime_type != config.mime_type {
        return Err(FormError::InvalidInputFile(format!(
            "expected {}, got {}",
            config.mime_type,
            if mime_type.is_empty() { "unknown type" } else { mime_type }
        )));
    }
    if size > config.max_bytes {
        return Err(FormError::InvalidInputFile(format!(
            "file is {} bytes, limit is {} bytes",
            size, config.max_bytes
        )));
    }
    Ok(())
}

/// Full pre-parse check: MIME type, size and the `%PDF-` header
pub fn check_input_file(bytes: &[u8], mime_type: &str, config: &UploadConfig) -> Result<()> {
    check_upload(mime_type, bytes.len(), config)?;
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(FormError::InvalidInputFile(
            "missing %PDF- header".to_string(),
        ));
    }
    Ok(())
}
