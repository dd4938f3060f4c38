use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use doctrans_core::{DocumentBackend, DocumentFormat, ExtractedText, PipelineError, UploadedFile};

pub mod pipeline;

// Re-export domain types for convenience
pub use doctrans_core::{Session, SessionState};
pub use pipeline::{Pipeline, SessionError};

/// MIME types that say nothing about the content; the file name decides.
const GENERIC_TYPES: &[&str] = &["application/octet-stream", "binary/octet-stream"];

/// How far into a file the `%PDF-` header may start.
const PDF_HEADER_WINDOW: usize = 1024;

/// Turns uploads into extracted text.
///
/// Each upload is written to its own scoped temp file, handed to the backend
/// for its format, and removed again whether or not extraction succeeds.
#[derive(Clone)]
pub struct Ingestor {
    pdf: Arc<dyn DocumentBackend>,
    docx: Arc<dyn DocumentBackend>,
    temp_dir: Option<PathBuf>,
}

impl Ingestor {
    /// Ingestor using the default PDF (MuPDF) and DOCX backends. Temp files
    /// go to `temp_dir`, or the system temp dir when `None`.
    pub fn new(temp_dir: Option<PathBuf>) -> Self {
        Self::with_backends(
            default_pdf_backend(),
            Arc::new(doctrans_docx::DocxBackend::new()),
            temp_dir,
        )
    }

    pub fn with_backends(
        pdf: Arc<dyn DocumentBackend>,
        docx: Arc<dyn DocumentBackend>,
        temp_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            pdf,
            docx,
            temp_dir,
        }
    }

    fn backend_for(&self, format: DocumentFormat) -> &dyn DocumentBackend {
        match format {
            DocumentFormat::Pdf => self.pdf.as_ref(),
            DocumentFormat::Docx => self.docx.as_ref(),
        }
    }

    /// Extract the text of an upload. Blocking; see [`Ingestor::ingest_async`].
    pub fn ingest(&self, upload: &UploadedFile) -> Result<ExtractedText, PipelineError> {
        let format = detect_format(upload)?;
        check_magic(format, &upload.data)?;

        let suffix = format!(".{}", format.extension());
        let mut builder = tempfile::Builder::new();
        builder.prefix("doctrans-").suffix(&suffix);
        let mut temp = match self.temp_dir {
            Some(ref dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| PipelineError::ExtractionFailure(format!("failed to create temp file: {e}")))?;

        // From here on the temp file is removed when `temp` drops, on every
        // return path.
        temp.write_all(&upload.data)
            .and_then(|_| temp.flush())
            .map_err(|e| {
                PipelineError::ExtractionFailure(format!("failed to write temp file: {e}"))
            })?;

        tracing::debug!(
            file = %upload.file_name,
            %format,
            bytes = upload.data.len(),
            temp = %temp.path().display(),
            "extracting"
        );
        let result = self.backend_for(format).extract_text(temp.path());

        let temp_path = temp.path().to_path_buf();
        if let Err(e) = temp.close() {
            tracing::warn!(path = %temp_path.display(), error = %e, "failed to remove temp file");
        }

        let text = result.map_err(|e| {
            tracing::warn!(file = %upload.file_name, %format, error = %e, "extraction failed");
            PipelineError::from(e)
        })?;

        let text = ExtractedText::new(text);
        tracing::info!(
            file = %upload.file_name,
            %format,
            chars = text.char_count(),
            "extraction complete"
        );
        Ok(text)
    }

    /// [`Ingestor::ingest`] on the blocking thread pool (MuPDF is not async).
    pub async fn ingest_async(&self, upload: UploadedFile) -> Result<ExtractedText, PipelineError> {
        let ingestor = self.clone();
        tokio::task::spawn_blocking(move || ingestor.ingest(&upload))
            .await
            .map_err(|e| PipelineError::ExtractionFailure(format!("extraction task failed: {e}")))?
    }
}

/// Resolve an upload's format from its declared MIME type, falling back to
/// the file name's extension when no type, or only a generic one, was
/// declared.
pub fn detect_format(upload: &UploadedFile) -> Result<DocumentFormat, PipelineError> {
    let declared = upload
        .declared_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    match declared {
        Some(mime) if !is_generic(mime) => {
            DocumentFormat::from_mime(mime).ok_or_else(|| PipelineError::UnsupportedFormat {
                declared: mime.to_string(),
            })
        }
        _ => DocumentFormat::from_path(Path::new(&upload.file_name)).ok_or_else(|| {
            PipelineError::UnsupportedFormat {
                declared: declared.unwrap_or(&upload.file_name).to_string(),
            }
        }),
    }
}

fn is_generic(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or("").trim();
    GENERIC_TYPES.iter().any(|g| essence.eq_ignore_ascii_case(g))
}

/// Reject content that plainly isn't the declared format before any backend
/// sees it.
fn check_magic(format: DocumentFormat, data: &[u8]) -> Result<(), PipelineError> {
    let ok = match format {
        DocumentFormat::Pdf => {
            let window = &data[..data.len().min(PDF_HEADER_WINDOW)];
            window.windows(5).any(|w| w == b"%PDF-")
        }
        DocumentFormat::Docx => data.starts_with(b"PK"),
    };

    if ok {
        Ok(())
    } else {
        Err(PipelineError::ExtractionFailure(format!(
            "file doesn't appear to be a valid {}",
            format.extension().to_uppercase()
        )))
    }
}

#[cfg(feature = "pdf")]
fn default_pdf_backend() -> Arc<dyn DocumentBackend> {
    Arc::new(doctrans_pdf_mupdf::MupdfBackend::new())
}

#[cfg(not(feature = "pdf"))]
fn default_pdf_backend() -> Arc<dyn DocumentBackend> {
    Arc::new(NoPdfSupport)
}

#[cfg(not(feature = "pdf"))]
struct NoPdfSupport;

#[cfg(not(feature = "pdf"))]
impl DocumentBackend for NoPdfSupport {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract_text(&self, _path: &Path) -> Result<String, doctrans_core::BackendError> {
        Err(doctrans_core::BackendError::OpenError(
            "PDF support not compiled in (enable the `pdf` feature of doctrans-ingest)".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, declared: Option<&str>) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            declared_type: declared.map(String::from),
            data: Vec::new(),
        }
    }

    #[test]
    fn declared_type_decides() {
        assert_eq!(
            detect_format(&upload("scan.bin", Some("application/pdf"))).unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            detect_format(&upload("x", Some(doctrans_core::DOCX_MIME))).unwrap(),
            DocumentFormat::Docx
        );
    }

    #[test]
    fn declared_type_beats_extension() {
        let err = detect_format(&upload("report.pdf", Some("text/plain"))).unwrap_err();
        assert_eq!(
            err,
            PipelineError::UnsupportedFormat {
                declared: "text/plain".into()
            }
        );
    }

    #[test]
    fn generic_or_missing_type_falls_back_to_extension() {
        assert_eq!(
            detect_format(&upload("notes.docx", Some("application/octet-stream"))).unwrap(),
            DocumentFormat::Docx
        );
        assert_eq!(
            detect_format(&upload("paper.PDF", None)).unwrap(),
            DocumentFormat::Pdf
        );
        assert_eq!(
            detect_format(&upload("paper.pdf", Some("  "))).unwrap(),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = detect_format(&upload("notes.txt", None)).unwrap_err();
        assert_eq!(
            err,
            PipelineError::UnsupportedFormat {
                declared: "notes.txt".into()
            }
        );
    }

    #[test]
    fn magic_bytes() {
        assert!(check_magic(DocumentFormat::Pdf, b"%PDF-1.7\n...").is_ok());
        assert!(check_magic(DocumentFormat::Pdf, b"\xef\xbb\xbf%PDF-1.4").is_ok());
        assert!(check_magic(DocumentFormat::Pdf, b"PK\x03\x04").is_err());
        assert!(check_magic(DocumentFormat::Docx, b"PK\x03\x04rest").is_ok());
        assert!(check_magic(DocumentFormat::Docx, b"%PDF-1.4").is_err());
        assert!(check_magic(DocumentFormat::Docx, b"").is_err());
    }
}
