use std::path::Path;

use mupdf::{Document, TextPageFlags};

use doctrans_core::{BackendError, DocumentBackend, DocumentFormat, join_pages};

/// MuPDF-based implementation of [`DocumentBackend`] for PDF files.
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency so
/// that DOCX-only consumers do not transitively depend on it.
///
/// Each page's text is read line by line, every line terminated by `\n`,
/// which matches MuPDF's plain-text output. Pages are then concatenated with
/// no separator and the whole result trimmed.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

/// Plain-text extraction options: keep ligatures and whitespace as written,
/// and drop text placed outside the page's media box.
fn text_page_flags() -> TextPageFlags {
    TextPageFlags::PRESERVE_LIGATURES
        | TextPageFlags::PRESERVE_WHITESPACE
        | TextPageFlags::MEDIABOX_CLIP
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }

    /// Extract the text of each page, in page order.
    pub fn page_texts(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let mut pages_text = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(text_page_flags())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
            }
            pages_text.push(page_text);
        }

        tracing::debug!(path = %path.display(), pages = pages_text.len(), "read PDF pages");
        Ok(pages_text)
    }
}

impl DocumentBackend for MupdfBackend {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        Ok(join_pages(self.page_texts(path)?))
    }
}
