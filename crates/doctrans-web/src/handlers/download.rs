use axum::Json;
use axum::http::header;
use axum::response::IntoResponse;

use doctrans_core::{DownloadArtifact, TranslatedText};

use crate::models::DownloadRequest;

/// Return the translated text as a `translated_text.txt` attachment.
pub async fn download(Json(req): Json<DownloadRequest>) -> impl IntoResponse {
    let artifact = DownloadArtifact::from_translation(&TranslatedText::new(req.text));

    (
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, artifact.content_disposition()),
        ],
        artifact.bytes,
    )
}
