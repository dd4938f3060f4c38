use doctrans_ingest::Pipeline;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub pipeline: Pipeline,
    pub max_upload_bytes: usize,
}
