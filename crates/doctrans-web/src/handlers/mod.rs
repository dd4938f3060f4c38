pub mod download;
pub mod extract;
pub mod health;
pub mod index;
pub mod translate;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use doctrans_core::{PipelineError, Session};
use doctrans_ingest::SessionError;

use crate::models::ErrorResponse;
use crate::upload::UploadError;

/// Map a failed session action to a status code and a JSON error body that
/// carries the session's resulting state.
pub fn error_response(session: &Session, err: &SessionError) -> Response {
    let (status, error_kind) = match err {
        SessionError::Pipeline(e @ PipelineError::UnsupportedFormat { .. }) => {
            (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.kind())
        }
        SessionError::Pipeline(e @ PipelineError::ExtractionFailure(_)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, e.kind())
        }
        SessionError::Pipeline(e @ PipelineError::TranslationFailure(_)) => {
            (StatusCode::BAD_GATEWAY, e.kind())
        }
        SessionError::Transition(_) => (StatusCode::CONFLICT, "invalid_action"),
    };

    (
        status,
        Json(ErrorResponse {
            state: session.state().name(),
            error_kind,
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// Error body for a form that never reached the pipeline.
pub fn upload_error(err: UploadError) -> Response {
    let error_kind = if err.status == StatusCode::PAYLOAD_TOO_LARGE {
        "payload_too_large"
    } else {
        "bad_request"
    };

    (
        err.status,
        Json(ErrorResponse {
            state: "idle",
            error_kind,
            error: err.message,
        }),
    )
        .into_response()
}
