use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;

use doctrans_core::UploadedFile;

/// Name of the multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

/// A form that could not be read, with the status it should be reported as.
#[derive(Debug)]
pub struct UploadError {
    pub status: StatusCode,
    pub message: String,
}

impl UploadError {
    fn missing_file() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "No file uploaded".to_string(),
        }
    }

    /// Keep the multipart error's own status, so an oversized body stays a 413.
    fn from_multipart(context: &str, e: MultipartError) -> Self {
        Self {
            status: e.status(),
            message: format!("{}: {}", context, e.body_text()),
        }
    }
}

/// Parse a multipart form upload into the uploaded document.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadedFile, UploadError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::from_multipart("Failed to read form field", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == FILE_FIELD {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let declared_type = field.content_type().map(String::from);
            let data = field
                .bytes()
                .await
                .map_err(|e| UploadError::from_multipart("Failed to read file data", e))?
                .to_vec();

            file = Some(UploadedFile {
                file_name,
                declared_type,
                data,
            });
        } else {
            // Ignore unknown fields
            let _ = field.bytes().await;
        }
    }

    file.ok_or_else(UploadError::missing_file)
}
