//! Google Gemini generation client.
//!
//! Communicates with
//! `https://generativelanguage.googleapis.com/v1beta/models/{model}:streamGenerateContent`.
//!
//! Each narrative request is a single user turn: an optional `fileData` part
//! referencing the configured document, followed by the prompt text. The
//! response streams back as SSE chunks; [`GeminiClient`] folds the text
//! deltas into the final narrative string, so callers see one
//! request/response exchange per call.

use std::future::Future;

use serde_json::{Value, json};
use takeoff_types::{ApiUsage, GenerationError, GenerationEvent, TextGenerator};

use crate::{
    ApiConfig, ApiResponse, GEMINI_API_BASE_URL, Result, SseParseAction, SseParser,
    handle_response, http_client, mpsc, process_sse_stream,
    retry::{RetryConfig, send_with_retry},
    stream_idle_timeout, wire,
};

// Generation parameters carried over from the historical frontend.
const GENERATION_TEMPERATURE: f64 = 0.7;
const GENERATION_TOP_K: u32 = 40;
const GENERATION_TOP_P: f64 = 0.8;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Build the request body for one generation call.
///
/// Note: the generateContent API uses camelCase throughout
/// (`generationConfig`, `fileData`, `maxOutputTokens`).
fn build_request_body(config: &ApiConfig, prompt: &str) -> Value {
    let mut parts: Vec<Value> = Vec::new();

    // The reference document leads so the prompt reads in its context.
    if let Some(document) = config.reference_document() {
        parts.push(json!({
            "fileData": {
                "fileUri": document.uri,
                "mimeType": document.mime_type
            }
        }));
    }
    parts.push(json!({ "text": prompt }));

    json!({
        "contents": [{
            "role": "user",
            "parts": parts
        }],
        "generationConfig": {
            "temperature": GENERATION_TEMPERATURE,
            "topK": GENERATION_TOP_K,
            "topP": GENERATION_TOP_P,
            "maxOutputTokens": config.max_output_tokens()
        }
    })
}

/// Parser state for Gemini SSE streams.
#[derive(Default)]
struct GeminiParser;

impl SseParser for GeminiParser {
    fn parse(&mut self, json: &Value) -> SseParseAction {
        let response: wire::Response = match serde_json::from_value(json.clone()) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(%e, "Failed to parse Gemini SSE event");
                return SseParseAction::Continue;
            }
        };

        if let Some(error) = response.error {
            return SseParseAction::Error(error.message_or_default().to_string());
        }

        let mut events = Vec::new();
        let mut finish_action: Option<SseParseAction> = None;

        if let Some(usage) = response.usage_metadata {
            events.push(GenerationEvent::Usage(ApiUsage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            }));
        }

        if let Some(candidates) = response.candidates {
            for candidate in candidates {
                // Content parts are processed before the finish reason so a
                // chunk that carries both final text and finishReason doesn't
                // drop the text.
                if let Some(content) = candidate.content
                    && let Some(parts) = content.parts
                {
                    for part in parts {
                        if let Some(text) = part.text {
                            events.push(GenerationEvent::TextDelta(text));
                        }
                    }
                }

                if let Some(reason_str) = candidate.finish_reason {
                    let reason = wire::FinishReason::parse(&reason_str);
                    if reason.is_success() {
                        finish_action = Some(SseParseAction::Done);
                    } else if let Some(msg) = reason.error_message() {
                        finish_action = Some(SseParseAction::Error(msg.to_string()));
                    }
                }
            }
        }

        // Emit accumulated events first, then the terminal signal.
        if let Some(action) = finish_action {
            if events.is_empty() {
                return action;
            }
            match action {
                SseParseAction::Done => events.push(GenerationEvent::Done),
                SseParseAction::Error(msg) => events.push(GenerationEvent::Error(msg)),
                _ => {}
            }
            return SseParseAction::Emit(events);
        }

        if events.is_empty() {
            SseParseAction::Continue
        } else {
            SseParseAction::Emit(events)
        }
    }
}

/// Stream one generation call, emitting [`GenerationEvent`]s into `tx`.
pub async fn stream_generate(
    config: &ApiConfig,
    prompt: &str,
    tx: mpsc::Sender<GenerationEvent>,
) -> Result<()> {
    stream_generate_at(GEMINI_API_BASE_URL, http_client(), config, prompt, tx).await
}

pub(crate) async fn stream_generate_at(
    base_url: &str,
    client: &reqwest::Client,
    config: &ApiConfig,
    prompt: &str,
    tx: mpsc::Sender<GenerationEvent>,
) -> Result<()> {
    let retry_config = RetryConfig::default();
    let model = config.model().as_str();
    let url = format!("{base_url}/models/{model}:streamGenerateContent?alt=sse");

    let body = build_request_body(config, prompt);
    let api_key = config.api_key().to_string();

    let outcome = send_with_retry(
        || {
            client
                .post(&url)
                .header("x-goog-api-key", &api_key)
                .header("content-type", "application/json")
                .json(&body)
        },
        &retry_config,
    )
    .await;

    let response = match handle_response(outcome, &tx).await? {
        ApiResponse::Success(resp) => resp,
        ApiResponse::StreamTerminated => return Ok(()),
    };

    let mut parser = GeminiParser;
    process_sse_stream(response, &mut parser, &tx, stream_idle_timeout()).await
}

/// Fold a generation event stream into the final text.
async fn collect_text(mut rx: mpsc::Receiver<GenerationEvent>) -> Result<String, GenerationError> {
    let mut text = String::new();
    while let Some(event) = rx.recv().await {
        match event {
            GenerationEvent::TextDelta(delta) => text.push_str(&delta),
            GenerationEvent::Usage(usage) => {
                tracing::debug!(
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "Generation usage"
                );
            }
            GenerationEvent::Done => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(GenerationError::EmptyResponse);
                }
                return Ok(trimmed.to_string());
            }
            GenerationEvent::Error(message) => return Err(GenerationError::Service(message)),
        }
    }
    Err(GenerationError::Disconnected)
}

/// Gemini-backed [`TextGenerator`].
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: ApiConfig,
}

impl GeminiClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }
}

impl TextGenerator for GeminiClient {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send {
        let config = self.config.clone();
        let prompt = prompt.to_string();
        async move {
            let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
            tokio::spawn(async move {
                if let Err(e) = stream_generate(&config, &prompt, tx.clone()).await {
                    tracing::warn!("Generation request failed: {e}");
                    let _ = tx.send(GenerationEvent::Error(e.to_string())).await;
                }
            });
            collect_text(rx).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApiKey, DocumentRef, ModelName};

    fn config() -> ApiConfig {
        ApiConfig::new(ApiKey::new("test"), ModelName::default_model())
    }

    #[test]
    fn builds_request_with_generation_config() {
        let body = build_request_body(&config(), "hello");

        let gen_config = body.get("generationConfig").unwrap();
        assert_eq!(gen_config["temperature"], 0.7);
        assert_eq!(gen_config["topK"], 40);
        assert_eq!(gen_config["topP"], 0.8);
        assert_eq!(gen_config["maxOutputTokens"], 2048);
    }

    #[test]
    fn builds_single_user_turn_with_prompt_text() {
        let body = build_request_body(&config(), "write about 2040");

        let contents = body.get("contents").unwrap().as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["role"], "user");
        let parts = contents[0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], "write about 2040");
    }

    #[test]
    fn reference_document_leads_the_parts() {
        let config = config()
            .with_reference_document(DocumentRef::pdf("https://example.invalid/files/abc"));

        let body = build_request_body(&config, "prompt");

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["fileData"]["fileUri"], "https://example.invalid/files/abc");
        assert_eq!(parts[0]["fileData"]["mimeType"], "application/pdf");
        assert_eq!(parts[1]["text"], "prompt");
    }

    #[test]
    fn parser_emits_text_deltas() {
        let mut parser = GeminiParser;
        let chunk = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "By 2040, " }] }
            }]
        });

        match parser.parse(&chunk) {
            SseParseAction::Emit(events) => {
                assert_eq!(events, vec![GenerationEvent::TextDelta("By 2040, ".to_string())]);
            }
            other => panic!("expected Emit, got {other:?}"),
        }
    }

    #[test]
    fn parser_keeps_text_arriving_with_the_finish_reason() {
        let mut parser = GeminiParser;
        let chunk = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "the end." }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 3 }
        });

        match parser.parse(&chunk) {
            SseParseAction::Emit(events) => {
                assert_eq!(events.len(), 3);
                assert!(matches!(&events[0], GenerationEvent::Usage(u) if u.input_tokens == 10));
                assert_eq!(events[1], GenerationEvent::TextDelta("the end.".to_string()));
                assert_eq!(events[2], GenerationEvent::Done);
            }
            other => panic!("expected Emit, got {other:?}"),
        }
    }

    #[test]
    fn parser_surfaces_safety_blocks_as_errors() {
        let mut parser = GeminiParser;
        let chunk = json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        });

        match parser.parse(&chunk) {
            SseParseAction::Error(msg) => assert!(msg.contains("safety")),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[test]
    fn parser_surfaces_api_error_payloads() {
        let mut parser = GeminiParser;
        let chunk = json!({
            "error": { "message": "API key not valid", "code": 400 }
        });

        match parser.parse(&chunk) {
            SseParseAction::Error(msg) => assert_eq!(msg, "API key not valid"),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[test]
    fn parser_skips_empty_chunks() {
        let mut parser = GeminiParser;
        assert!(matches!(
            parser.parse(&json!({ "candidates": [] })),
            SseParseAction::Continue
        ));
    }

    #[tokio::test]
    async fn collect_text_folds_deltas_in_order() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(GenerationEvent::TextDelta("Digital ".to_string())).await.unwrap();
        tx.send(GenerationEvent::TextDelta("minds.".to_string())).await.unwrap();
        tx.send(GenerationEvent::Done).await.unwrap();
        drop(tx);

        assert_eq!(collect_text(rx).await.unwrap(), "Digital minds.");
    }

    #[tokio::test]
    async fn collect_text_trims_surrounding_whitespace() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(GenerationEvent::TextDelta("\n  narrative  \n".to_string())).await.unwrap();
        tx.send(GenerationEvent::Done).await.unwrap();
        drop(tx);

        assert_eq!(collect_text(rx).await.unwrap(), "narrative");
    }

    #[tokio::test]
    async fn collect_text_rejects_empty_output() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(GenerationEvent::Done).await.unwrap();
        drop(tx);

        assert_eq!(collect_text(rx).await, Err(GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn collect_text_propagates_service_errors() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(GenerationEvent::TextDelta("partial".to_string())).await.unwrap();
        tx.send(GenerationEvent::Error("quota exceeded".to_string())).await.unwrap();
        drop(tx);

        assert_eq!(
            collect_text(rx).await,
            Err(GenerationError::Service("quota exceeded".to_string()))
        );
    }

    #[tokio::test]
    async fn collect_text_detects_a_dead_stream() {
        let (tx, rx) = mpsc::channel::<GenerationEvent>(8);
        drop(tx);

        assert_eq!(collect_text(rx).await, Err(GenerationError::Disconnected));
    }
}
