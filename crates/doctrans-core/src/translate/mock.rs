//! Mock translation service for testing.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{TranslateError, Translator};

/// A hand-rolled mock implementing [`Translator`] for tests.
///
/// Looks each input up in a fixed response table; unknown input comes back
/// wrapped as `[<dest>] <text>`. A failing mock returns
/// [`TranslateError::Service`] for every call. Calls are counted and the
/// last request is recorded.
#[derive(Default)]
pub struct MockTranslator {
    responses: HashMap<String, String>,
    failure: Option<String>,
    call_count: AtomicUsize,
    last_request: Mutex<Option<(String, String)>>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Map `input` to `output`.
    pub fn with_response(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.responses.insert(input.into(), output.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn last_text(&self) -> Option<String> {
        self.last_request
            .lock()
            .ok()
            .and_then(|r| r.as_ref().map(|(text, _)| text.clone()))
    }

    pub fn last_dest(&self) -> Option<String> {
        self.last_request
            .lock()
            .ok()
            .and_then(|r| r.as_ref().map(|(_, dest)| dest.clone()))
    }
}

impl Translator for MockTranslator {
    fn name(&self) -> &str {
        "Mock"
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        dest_lang: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, TranslateError>> + Send + 'a>> {
        Box::pin(async move {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut last) = self.last_request.lock() {
                *last = Some((text.to_string(), dest_lang.to_string()));
            }

            if let Some(ref message) = self.failure {
                return Err(TranslateError::Service(message.clone()));
            }

            Ok(self
                .responses
                .get(text)
                .cloned()
                .unwrap_or_else(|| format!("[{dest_lang}] {text}")))
        })
    }
}
