use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::{TranslateError, Translator};
use crate::Config;

/// Client for the public Google Translate web endpoint.
///
/// The source language is auto-detected. Text travels in the form body so
/// long documents do not hit URL length limits before the service's own
/// size limit.
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    max_chars: usize,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.translate_endpoint.clone(),
            timeout: config.translate_timeout,
            max_chars: config.max_chars,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "Google Translate"
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        dest_lang: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, TranslateError>> + Send + 'a>> {
        Box::pin(async move {
            let len = text.chars().count();
            if len > self.max_chars {
                return Err(TranslateError::TooLong {
                    len,
                    limit: self.max_chars,
                });
            }

            let resp = self
                .client
                .post(&self.endpoint)
                .query(&[("client", "gtx"), ("sl", "auto"), ("tl", dest_lang), ("dt", "t")])
                .form(&[("q", text)])
                .timeout(self.timeout)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                return Err(TranslateError::Status(status.as_u16()));
            }

            let data: serde_json::Value = resp.json().await?;
            parse_response(&data)
        })
    }
}

/// Pull the translation out of the endpoint's nested-array response.
///
/// The first element is a list of segments, each `[translated, original, ...]`;
/// the translation is the segments' first fields concatenated in order.
pub fn parse_response(data: &serde_json::Value) -> Result<String, TranslateError> {
    let segments = data
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| TranslateError::Malformed("missing translation segments".into()))?;

    let mut translated = String::new();
    for segment in segments {
        // Trailing transliteration segments have a null first field.
        if let Some(part) = segment.get(0).and_then(|p| p.as_str()) {
            translated.push_str(part);
        }
    }
    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Form, Query};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    use crate::ExtractedText;
    use crate::translate::translate_text;

    #[test]
    fn concatenates_segments_in_order() {
        let data = json!([
            [
                ["హలో ", "Hello ", null, null, 10],
                ["ప్రపంచం", "world", null, null, 10],
                [null, null, "halō prapan̄can̄"]
            ],
            null,
            "en"
        ]);
        assert_eq!(parse_response(&data).unwrap(), "హలో ప్రపంచం");
    }

    #[test]
    fn rejects_unexpected_shape() {
        let err = parse_response(&json!({"error": "bad request"})).unwrap_err();
        assert!(matches!(err, TranslateError::Malformed(_)));
    }

    #[tokio::test]
    async fn oversized_text_fails_without_a_request() {
        let config = Config {
            // Unroutable; the request must never be sent.
            translate_endpoint: "http://127.0.0.1:9/translate".into(),
            max_chars: 10,
            ..Config::default()
        };
        let translator = GoogleTranslator::new(reqwest::Client::new(), &config);

        let err = translator
            .translate("this is more than ten characters", "te")
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::TooLong { len: 32, limit: 10 }));
    }

    // ── Against a local HTTP server ──────────────────────────────

    type Seen = Arc<Mutex<Vec<(HashMap<String, String>, HashMap<String, String>)>>>;

    /// Serve `status` + `body` on an ephemeral port, recording each request's
    /// query and form fields. Returns the endpoint URL.
    async fn serve(status: StatusCode, body: serde_json::Value) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let recorder = seen.clone();
        let app = Router::new().route(
            "/translate_a/single",
            post(
                move |Query(query): Query<HashMap<String, String>>,
                      Form(form): Form<HashMap<String, String>>| {
                    let recorder = recorder.clone();
                    let body = body.clone();
                    async move {
                        recorder.lock().unwrap().push((query, form));
                        (status, Json(body))
                    }
                },
            ),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/translate_a/single"), seen)
    }

    fn translator_for(endpoint: String) -> GoogleTranslator {
        let config = Config {
            translate_endpoint: endpoint,
            ..Config::default()
        };
        GoogleTranslator::new(reqwest::Client::new(), &config)
    }

    #[tokio::test]
    async fn sends_text_as_form_field_with_target_in_query() {
        let (endpoint, seen) = serve(
            StatusCode::OK,
            json!([[["హలో ప్రపంచం", "Hello world", null, null, 10]], null, "en"]),
        )
        .await;
        let translator = translator_for(endpoint);

        let translated = translator.translate("Hello world", "te").await.unwrap();
        assert_eq!(translated, "హలో ప్రపంచం");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (query, form) = &seen[0];
        assert_eq!(query.get("client").map(String::as_str), Some("gtx"));
        assert_eq!(query.get("sl").map(String::as_str), Some("auto"));
        assert_eq!(query.get("tl").map(String::as_str), Some("te"));
        assert_eq!(query.get("dt").map(String::as_str), Some("t"));
        assert!(!query.contains_key("q"));
        assert_eq!(form.get("q").map(String::as_str), Some("Hello world"));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let (endpoint, seen) =
            serve(StatusCode::TOO_MANY_REQUESTS, json!({"error": "rate limited"})).await;
        let translator = translator_for(endpoint);

        let err = translator.translate("Hello world", "te").await.unwrap_err();
        assert!(matches!(err, TranslateError::Status(429)));

        let err = translate_text(&translator, &ExtractedText::new("Hello world"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "translation_failure");
        assert!(err.to_string().contains("429"));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unreachable_service_is_an_http_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let translator = translator_for(format!("http://{addr}/translate_a/single"));
        let err = translator.translate("Hello world", "te").await.unwrap_err();
        assert!(matches!(err, TranslateError::Http(_)));
    }
}
