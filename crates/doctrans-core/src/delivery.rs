use crate::TranslatedText;

pub const DOWNLOAD_FILE_NAME: &str = "translated_text.txt";
pub const DOWNLOAD_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// The downloadable form of a translation: UTF-8 bytes under a fixed name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl DownloadArtifact {
    pub fn from_translation(text: &TranslatedText) -> Self {
        Self {
            file_name: DOWNLOAD_FILE_NAME,
            content_type: DOWNLOAD_CONTENT_TYPE,
            bytes: text.as_str().as_bytes().to_vec(),
        }
    }

    /// `Content-Disposition` header value that makes browsers save the file.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}
