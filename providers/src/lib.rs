//! Gemini API client with unified streaming support.
//!
//! # Architecture
//!
//! - [`gemini`] - the generation client: request building, SSE parsing, and
//!   the [`takeoff_types::TextGenerator`] implementation the orchestrator
//!   consumes
//! - [`files`] - reference-document upload to the Files API
//! - [`retry`] - HTTP retry policy with exponential backoff
//! - [`wire`] - typed structures for the Gemini wire format
//!
//! The generation client emits events through a
//! [`tokio::sync::mpsc::Sender<GenerationEvent>`] channel. Most API errors
//! during streaming are delivered as [`GenerationEvent::Error`] events rather
//! than `Result::Err` returns, so partial output can be observed before the
//! failure. Low-level failures that prevent reading the HTTP response stream
//! may still return `Err`.

pub mod files;
pub mod gemini;
pub mod retry;
pub mod wire;

pub(crate) use anyhow::Result;
use std::borrow::Cow;
use std::sync::OnceLock;
use std::time::Duration;
use takeoff_types::GenerationEvent;
use thiserror::Error;
pub(crate) use tokio::sync::mpsc;

/// Canonical Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STREAM_IDLE_TIMEOUT_SECS: u64 = 60;

// reqwest only exposes tcp_keepalive (idle time); interval and retries use
// platform defaults.
const TCP_KEEPALIVE_SECS: u64 = 60;

const POOL_MAX_IDLE_PER_HOST: usize = 16;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_SSE_BUFFER_BYTES: usize = 4 * 1024 * 1024;

const MAX_SSE_PARSE_ERRORS: usize = 3;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder().build().unwrap_or_else(|e| {
            tracing::error!("Failed to build HTTP client: {e}. Falling back to minimal client.");
            reqwest::Client::builder()
                .https_only(true)
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("minimal HTTP client must build; cannot proceed without TLS")
        })
    })
}

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .https_only(true)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
}

pub fn http_client_with_timeout(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

// ============================================================================
// API configuration
// ============================================================================

/// Google API key.
///
/// `Debug` is manually implemented to redact the key value, preventing
/// accidental credential disclosure in logs or error messages.
#[derive(Clone)]
pub struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

impl ApiKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelParseError {
    #[error("model name cannot be empty")]
    Empty,
    #[error("Gemini model must start with gemini- (got {0})")]
    GeminiPrefix(String),
}

/// Validated Gemini model name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelName(Cow<'static, str>);

impl ModelName {
    /// Model the historical frontend pinned.
    pub const DEFAULT: &'static str = "gemini-2.0-flash-exp";

    pub fn parse(raw: &str) -> Result<Self, ModelParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ModelParseError::Empty);
        }
        if !trimmed.to_ascii_lowercase().starts_with("gemini-") {
            return Err(ModelParseError::GeminiPrefix(trimmed.to_string()));
        }
        Ok(Self(Cow::Owned(trimmed.to_string())))
    }

    #[must_use]
    pub const fn default_model() -> Self {
        Self(Cow::Borrowed(Self::DEFAULT))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl std::fmt::Display for ModelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Reference document attached to every generation request.
///
/// Created by uploading a file through [`files::upload_document`] and wiring
/// the returned URI into the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub uri: String,
    pub mime_type: String,
}

impl DocumentRef {
    #[must_use]
    pub fn new(uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: mime_type.into(),
        }
    }

    #[must_use]
    pub fn pdf(uri: impl Into<String>) -> Self {
        Self::new(uri, "application/pdf")
    }
}

/// Credentials, model selection, and per-request tuning for the client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    api_key: ApiKey,
    model: ModelName,
    reference_document: Option<DocumentRef>,
    max_output_tokens: u32,
}

const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

impl ApiConfig {
    #[must_use]
    pub fn new(api_key: ApiKey, model: ModelName) -> Self {
        Self {
            api_key,
            model,
            reference_document: None,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    #[must_use]
    pub fn with_reference_document(mut self, document: DocumentRef) -> Self {
        self.reference_document = Some(document);
        self
    }

    #[must_use]
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    #[must_use]
    pub const fn model(&self) -> &ModelName {
        &self.model
    }

    #[must_use]
    pub const fn reference_document(&self) -> Option<&DocumentRef> {
        self.reference_document.as_ref()
    }

    #[must_use]
    pub const fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }
}

// ============================================================================
// SSE stream processing
// ============================================================================

fn find_sse_event_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = buffer.windows(2).position(|w| w == b"\n\n");
    let crlf = buffer.windows(4).position(|w| w == b"\r\n\r\n");
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a <= b { (a, 2) } else { (b, 4) }),
        (Some(a), None) => Some((a, 2)),
        (None, Some(b)) => Some((b, 4)),
        (None, None) => None,
    }
}

fn drain_next_sse_event(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let (pos, delim_len) = find_sse_event_boundary(buffer)?;
    let event = buffer[..pos].to_vec();
    buffer.drain(..pos + delim_len);
    Some(event)
}

fn extract_sse_data(event: &str) -> Option<String> {
    let mut data = String::new();
    let mut found = false;

    for line in event.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some(mut rest) = line.strip_prefix("data:") {
            if let Some(stripped) = rest.strip_prefix(' ') {
                rest = stripped;
            }

            if found {
                data.push('\n');
            }
            data.push_str(rest);
            found = true;
        }
    }

    if found { Some(data) } else { None }
}

#[derive(Debug)]
pub(crate) enum SseParseAction {
    /// Continue processing, no event to emit
    Continue,
    /// Emit these events and continue
    Emit(Vec<GenerationEvent>),
    /// Stream is done (finishReason signalled success)
    Done,
    Error(String),
}

pub(crate) trait SseParser {
    fn parse(&mut self, json: &serde_json::Value) -> SseParseAction;
}

pub(crate) fn stream_idle_timeout() -> Duration {
    static TIMEOUT: OnceLock<Duration> = OnceLock::new();
    *TIMEOUT.get_or_init(|| {
        let timeout = std::env::var("TAKEOFF_STREAM_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_STREAM_IDLE_TIMEOUT_SECS);
        Duration::from_secs(timeout)
    })
}

pub(crate) async fn send_event(tx: &mpsc::Sender<GenerationEvent>, event: GenerationEvent) -> bool {
    tx.send(event).await.is_ok()
}

/// Process an SSE stream using a parser for the payload format.
///
/// Handles the transport-level concerns common to every streamed response:
/// idle-stream timeout, buffer size limits, UTF-8 validation, event boundary
/// detection, and a parse-error threshold.
pub(crate) async fn process_sse_stream<P: SseParser>(
    response: reqwest::Response,
    parser: &mut P,
    tx: &mpsc::Sender<GenerationEvent>,
    idle_timeout: Duration,
) -> Result<()> {
    use futures_util::StreamExt;

    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();
    let mut parse_errors = 0usize;

    loop {
        let Ok(next) = tokio::time::timeout(idle_timeout, stream.next()).await else {
            let _ = send_event(tx, GenerationEvent::Error("Stream idle timeout".to_string())).await;
            return Ok(());
        };

        let Some(chunk) = next else { break };
        let chunk = chunk?;
        buffer.extend_from_slice(&chunk);

        // Bound on buffer growth for a lost event delimiter.
        if buffer.len() > MAX_SSE_BUFFER_BYTES {
            let _ = send_event(
                tx,
                GenerationEvent::Error("SSE buffer exceeded maximum size (4 MiB)".to_string()),
            )
            .await;
            return Ok(());
        }

        while let Some(event) = drain_next_sse_event(&mut buffer) {
            if event.is_empty() {
                continue;
            }

            let Ok(event) = std::str::from_utf8(&event) else {
                let _ = send_event(
                    tx,
                    GenerationEvent::Error("Received invalid UTF-8 from SSE stream".to_string()),
                )
                .await;
                return Ok(());
            };

            let Some(data) = extract_sse_data(event) else {
                continue;
            };

            match serde_json::from_str::<serde_json::Value>(&data) {
                Ok(json) => {
                    parse_errors = 0;
                    match parser.parse(&json) {
                        SseParseAction::Continue => {}
                        SseParseAction::Emit(events) => {
                            for event in events {
                                let is_terminal = matches!(
                                    &event,
                                    GenerationEvent::Done | GenerationEvent::Error(_)
                                );
                                if !send_event(tx, event).await {
                                    return Ok(());
                                }
                                if is_terminal {
                                    return Ok(());
                                }
                            }
                        }
                        SseParseAction::Done => {
                            let _ = send_event(tx, GenerationEvent::Done).await;
                            return Ok(());
                        }
                        SseParseAction::Error(msg) => {
                            let _ = send_event(tx, GenerationEvent::Error(msg)).await;
                            return Ok(());
                        }
                    }
                }
                Err(e) => {
                    parse_errors = parse_errors.saturating_add(1);
                    tracing::warn!(%e, payload_bytes = data.len(), "Invalid SSE JSON payload");
                    if parse_errors >= MAX_SSE_PARSE_ERRORS {
                        let _ = send_event(
                            tx,
                            GenerationEvent::Error(format!("Invalid stream payload: {e}")),
                        )
                        .await;
                        return Ok(());
                    }
                }
            }
        }
    }

    // Premature EOF: connection closed without a completion signal.
    let _ = send_event(
        tx,
        GenerationEvent::Error("Connection closed before stream completed".to_string()),
    )
    .await;
    Ok(())
}

pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

#[derive(Debug)]
pub(crate) enum ApiResponse {
    Success(reqwest::Response),
    StreamTerminated,
}

pub(crate) async fn handle_response(
    outcome: retry::RetryOutcome,
    tx: &mpsc::Sender<GenerationEvent>,
) -> Result<ApiResponse> {
    let response = match outcome {
        retry::RetryOutcome::Success(resp) | retry::RetryOutcome::HttpError(resp) => resp,
        retry::RetryOutcome::ConnectionError { attempts, source } => {
            let _ = send_event(
                tx,
                GenerationEvent::Error(format!(
                    "Request failed after {attempts} attempts: {source}"
                )),
            )
            .await;
            return Ok(ApiResponse::StreamTerminated);
        }
        retry::RetryOutcome::NonRetryable(e) => {
            let _ = send_event(tx, GenerationEvent::Error(format!("Request failed: {e}"))).await;
            return Ok(ApiResponse::StreamTerminated);
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        let error_text = read_capped_error_body(response).await;
        let _ = send_event(
            tx,
            GenerationEvent::Error(format!("API error {status}: {error_text}")),
        )
        .await;
        return Ok(ApiResponse::StreamTerminated);
    }

    Ok(ApiResponse::Success(response))
}
