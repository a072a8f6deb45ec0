//! The seam between the narrative orchestrator and a generation service.

use std::future::Future;

use thiserror::Error;

/// Failure modes for a single narrative generation call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The generation service reported a failure: API error, transport
    /// failure after retries, content filter, idle timeout.
    #[error("{0}")]
    Service(String),
    /// The call completed but produced no text.
    #[error("model returned an empty narrative")]
    EmptyResponse,
    /// The response stream closed without a completion signal.
    #[error("narrative stream ended without a completion signal")]
    Disconnected,
}

/// A collaborator that turns one prompt into one block of generated text.
///
/// From the caller's perspective each call is request/response: the future
/// suspends until the full text is available. The orchestrator is generic
/// over this trait, so tests substitute a scripted fake for the live client.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}
