//! Typed structures for the Gemini wire format.
//!
//! Gemini doesn't tag SSE events by type the way other APIs do: each chunk
//! is a complete response object with candidates. Deserializing into these
//! structs keeps parse errors at the serde boundary instead of scattered
//! through the stream-handling logic.

use serde::Deserialize;

/// Token usage data returned by the API.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub candidates: Option<Vec<Candidate>>,
    pub error: Option<ErrorInfo>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Content {
    pub parts: Option<Vec<Part>>,
}

/// A content part in a response candidate.
#[derive(Debug, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorInfo {
    pub message: Option<String>,
    pub code: Option<i32>,
}

impl ErrorInfo {
    #[must_use]
    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or("Unknown error")
    }
}

/// Known Gemini finish reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Language,
    Blocklist,
    ProhibitedContent,
    Spii,
    Other,
    Unknown,
}

impl FinishReason {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "STOP" => Self::Stop,
            "MAX_TOKENS" => Self::MaxTokens,
            "SAFETY" => Self::Safety,
            "RECITATION" => Self::Recitation,
            "LANGUAGE" => Self::Language,
            "BLOCKLIST" => Self::Blocklist,
            "PROHIBITED_CONTENT" => Self::ProhibitedContent,
            "SPII" => Self::Spii,
            "OTHER" => Self::Other,
            _ => Self::Unknown,
        }
    }

    /// Whether this reason ends the stream successfully.
    ///
    /// `MAX_TOKENS` counts as success: the narrative is truncated but usable.
    /// `Unknown` neither succeeds nor errors, so the stream keeps reading.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Stop | Self::MaxTokens)
    }

    /// Error message if this is an error reason, None otherwise.
    #[must_use]
    pub const fn error_message(self) -> Option<&'static str> {
        match self {
            Self::Stop | Self::MaxTokens | Self::Unknown => None,
            Self::Safety => Some("Content filtered by safety settings"),
            Self::Recitation => Some("Response blocked: recitation"),
            Self::Language => Some("Unsupported language"),
            Self::Blocklist => Some("Response blocked: blocklisted terms"),
            Self::ProhibitedContent => Some("Response blocked: prohibited content"),
            Self::Spii => Some("Response blocked: sensitive personal information"),
            Self::Other => Some("Generation stopped for an unspecified reason"),
        }
    }
}
