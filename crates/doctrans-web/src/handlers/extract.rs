use axum::Json;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use doctrans_core::Session;

use crate::handlers::{error_response, upload_error};
use crate::models::ExtractResponse;
use crate::state::AppState;
use crate::upload;

/// Accept an uploaded document and return its extracted text.
pub async fn extract(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let upload = match upload::parse_multipart(multipart).await {
        Ok(upload) => upload,
        Err(e) => return upload_error(e),
    };

    let file_name = upload.file_name.clone();
    let format = doctrans_ingest::detect_format(&upload)
        .map(|f| f.to_string())
        .unwrap_or_default();

    let mut session = Session::new();
    if let Err(e) = state.pipeline.upload(&mut session, upload).await {
        return error_response(&session, &e);
    }

    let text = session
        .extracted_text()
        .cloned()
        .unwrap_or_default();

    Json(ExtractResponse {
        state: session.state().name(),
        file_name,
        format,
        chars: text.char_count(),
        text: text.into_string(),
    })
    .into_response()
}
