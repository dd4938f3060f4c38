use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod delivery;
pub mod session;
pub mod text;
pub mod translate;

// Re-export for convenience
pub use backend::{BackendError, DocumentBackend};
pub use delivery::{DOWNLOAD_CONTENT_TYPE, DOWNLOAD_FILE_NAME, DownloadArtifact};
pub use session::{Session, SessionEvent, SessionState, TransitionError};
pub use text::{join_pages, join_paragraphs};
pub use translate::{TARGET_LANGUAGE, TranslateError, Translator, translate_text};

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A document format this crate knows how to extract text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Resolve a format from a declared MIME type. Parameters such as
    /// `; charset=...` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case(PDF_MIME) {
            Some(Self::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_MIME) {
            Some(Self::Docx)
        } else {
            None
        }
    }

    /// Resolve a format from a file name's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Docx => DOCX_MIME,
        }
    }

    /// File extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// An uploaded document: raw bytes plus what the client said it was.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    /// MIME type declared by the client, if any.
    pub declared_type: Option<String>,
    pub data: Vec<u8>,
}

/// Plain text pulled out of a document. Page and paragraph boundaries are
/// not preserved beyond the line breaks the extractor emits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

/// Text returned by the translation service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslatedText(String);

impl TranslatedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// The user-visible failure kinds of the extract → translate pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Unsupported file format: {declared}. Please upload a PDF or DOCX file.")]
    UnsupportedFormat { declared: String },
    #[error("Text extraction failed: {0}")]
    ExtractionFailure(String),
    #[error("Translation failed: {0}")]
    TranslationFailure(String),
}

impl PipelineError {
    /// Stable machine-readable name, used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::ExtractionFailure(_) => "extraction_failure",
            Self::TranslationFailure(_) => "translation_failure",
        }
    }
}

impl From<BackendError> for PipelineError {
    fn from(e: BackendError) -> Self {
        Self::ExtractionFailure(e.to_string())
    }
}

impl From<TranslateError> for PipelineError {
    fn from(e: TranslateError) -> Self {
        Self::TranslationFailure(e.to_string())
    }
}

pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
pub const DEFAULT_BIND: &str = "0.0.0.0:5002";

/// Resolved runtime configuration.
///
/// Built from the TOML cascade in [`config_file`], then overridden by
/// environment variables; binaries apply their own flags last.
#[derive(Debug, Clone)]
pub struct Config {
    pub translate_endpoint: String,
    pub translate_timeout: Duration,
    /// Longest input, in characters, the translation service accepts.
    pub max_chars: usize,
    pub bind: String,
    pub max_upload_bytes: usize,
    /// Where upload temp files are created. `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translate_endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
            translate_timeout: Duration::from_secs(30),
            max_chars: 15_000,
            bind: DEFAULT_BIND.to_string(),
            max_upload_bytes: 50 * 1024 * 1024,
            temp_dir: None,
        }
    }
}

impl Config {
    /// Load the config file cascade and apply `DOCTRANS_*` environment
    /// overrides.
    pub fn load() -> Self {
        let file = config_file::load_config();
        Self::from_file(&file).with_env(|key| std::env::var(key).ok())
    }

    /// Build a config from file values, falling back to defaults.
    pub fn from_file(file: &config_file::ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(ref t) = file.translator {
            if let Some(ref endpoint) = t.endpoint {
                config.translate_endpoint = endpoint.clone();
            }
            if let Some(secs) = t.timeout_secs {
                config.translate_timeout = Duration::from_secs(secs);
            }
            if let Some(max) = t.max_chars {
                config.max_chars = max;
            }
        }
        if let Some(ref s) = file.server {
            if let Some(ref bind) = s.bind {
                config.bind = bind.clone();
            }
            if let Some(mb) = s.max_upload_mb {
                config.max_upload_bytes = mb.saturating_mul(1024 * 1024);
            }
        }
        if let Some(dir) = file.storage.as_ref().and_then(|s| s.temp_dir.as_ref()) {
            config.temp_dir = Some(PathBuf::from(dir));
        }

        config
    }

    /// Apply environment overrides using `lookup` to read variables.
    /// Unparseable numeric values are ignored.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(endpoint) = lookup("DOCTRANS_TRANSLATE_ENDPOINT") {
            self.translate_endpoint = endpoint;
        }
        if let Some(secs) = lookup("DOCTRANS_TRANSLATE_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.translate_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = lookup("DOCTRANS_MAX_CHARS").and_then(|v| v.parse().ok()) {
            self.max_chars = max;
        }
        if let Some(bind) = lookup("DOCTRANS_BIND") {
            self.bind = bind;
        }
        if let Some(mb) = lookup("DOCTRANS_MAX_UPLOAD_MB").and_then(|v| v.parse::<usize>().ok()) {
            self.max_upload_bytes = mb.saturating_mul(1024 * 1024);
        }
        if let Some(dir) = lookup("DOCTRANS_TEMP_DIR") {
            self.temp_dir = Some(PathBuf::from(dir));
        }
        self
    }
}
