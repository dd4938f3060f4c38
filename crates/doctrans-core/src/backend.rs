use std::path::Path;

use thiserror::Error;

use crate::DocumentFormat;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for document text extraction backends.
///
/// Implementors read a document from disk and return its plain text, already
/// joined according to the rules in [`crate::text`]. Backends are blocking;
/// async callers should run them on a blocking thread.
pub trait DocumentBackend: Send + Sync {
    /// The format this backend reads.
    fn format(&self) -> DocumentFormat;

    /// Extract the full plain-text content of the file at `path`.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}
