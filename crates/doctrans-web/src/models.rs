use serde::{Deserialize, Serialize};

// ── Requests ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub text: String,
}

// ── Responses ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub state: &'static str,
    pub file_name: String,
    pub format: String,
    pub chars: usize,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub state: &'static str,
    pub target_language: &'static str,
    pub translated: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub state: &'static str,
    pub error_kind: &'static str,
    pub error: String,
}
