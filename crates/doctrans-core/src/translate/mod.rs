//! Translation service trait and the translation stage of the pipeline.

pub mod google;
pub mod mock;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::{ExtractedText, PipelineError, TranslatedText};

pub use google::GoogleTranslator;

/// Destination language for every translation (Telugu).
pub const TARGET_LANGUAGE: &str = "te";

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("translation service returned HTTP {0}")]
    Status(u16),
    #[error("text is too long to translate: {len} characters (limit {limit})")]
    TooLong { len: usize, limit: usize },
    #[error("unexpected response from translation service: {0}")]
    Malformed(String),
    #[error("{0}")]
    Service(String),
}

/// An external service that translates text into a target language.
///
/// One instance is built per process and shared; implementations must not
/// keep per-call state.
pub trait Translator: Send + Sync {
    /// Human-readable name of the service, for logs.
    fn name(&self) -> &str;

    /// Translate `text` into the language identified by `dest_lang`.
    fn translate<'a>(
        &'a self,
        text: &'a str,
        dest_lang: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, TranslateError>> + Send + 'a>>;
}

/// Translate extracted text into [`TARGET_LANGUAGE`] with a single service
/// call. Whitespace-only input short-circuits to an empty translation.
pub async fn translate_text(
    translator: &dyn Translator,
    text: &ExtractedText,
) -> Result<TranslatedText, PipelineError> {
    if text.as_str().trim().is_empty() {
        tracing::debug!("nothing to translate");
        return Ok(TranslatedText::default());
    }

    let chars = text.char_count();
    tracing::debug!(service = translator.name(), chars, dest = TARGET_LANGUAGE, "translating");

    let translated = translator
        .translate(text.as_str(), TARGET_LANGUAGE)
        .await
        .map_err(|e| {
            tracing::warn!(service = translator.name(), error = %e, "translation failed");
            PipelineError::from(e)
        })?;

    tracing::info!(
        service = translator.name(),
        chars,
        translated_chars = translated.chars().count(),
        "translation complete"
    );
    Ok(TranslatedText::new(translated))
}
