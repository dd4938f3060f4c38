use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use doctrans_core::{ExtractedText, Session, TARGET_LANGUAGE};

use crate::handlers::error_response;
use crate::models::{TranslateRequest, TranslateResponse};
use crate::state::AppState;

/// Translate text the page got back from `/api/extract`.
pub async fn translate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranslateRequest>,
) -> Response {
    let mut session = Session::resume(ExtractedText::new(req.text));

    if let Err(e) = state.pipeline.translate(&mut session).await {
        return error_response(&session, &e);
    }

    let translated = session
        .translated_text()
        .map(|t| t.as_str().to_string())
        .unwrap_or_default();

    Json(TranslateResponse {
        state: session.state().name(),
        target_language: TARGET_LANGUAGE,
        translated,
    })
    .into_response()
}
