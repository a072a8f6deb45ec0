//! Event vocabulary for streaming generation and timeline runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Token accounting reported by the generation service for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApiUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl ApiUsage {
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.input_tokens > 0 || self.output_tokens > 0
    }
}

/// Events emitted while a single generation call streams its response.
///
/// `Done` and `Error` are terminal: the producer sends at most one of them
/// and then closes the channel. Service failures arrive as `Error` events
/// rather than `Result::Err` so partial output can be observed first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    /// Incremental text content from the model.
    TextDelta(String),
    /// Token consumption metrics.
    Usage(ApiUsage),
    /// Stream completed successfully.
    Done,
    /// Stream terminated with an error.
    Error(String),
}

/// Year-keyed narrative texts accumulated over one timeline run.
///
/// Append-only for the lifetime of the run that owns it, and discarded when
/// the run ends. Iteration order is ascending by year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NarrativeSet(BTreeMap<i32, String>);

impl NarrativeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: i32, narrative: impl Into<String>) {
        self.0.insert(year, narrative.into());
    }

    #[must_use]
    pub fn get(&self, year: i32) -> Option<&str> {
        self.0.get(&year).map(String::as_str)
    }

    /// Narratives for years strictly before `year`, ascending.
    pub fn years_before(&self, year: i32) -> impl Iterator<Item = (i32, &str)> {
        self.0.range(..year).map(|(y, text)| (*y, text.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &str)> {
        self.0.iter().map(|(y, text)| (*y, text.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Progress events for one timeline run, shaped for event-stream delivery.
///
/// The orchestrator emits one `Progress` per completed year and exactly one
/// terminal event (`Complete` or `Error`), then closes the channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TimelineEvent {
    Progress { progress: u8 },
    Complete { narratives: NarrativeSet },
    Error { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_event_wire_shape() {
        let json = serde_json::to_string(&TimelineEvent::Progress { progress: 67 }).unwrap();
        assert_eq!(json, r#"{"type":"progress","progress":67}"#);
    }

    #[test]
    fn complete_event_wire_shape() {
        let mut narratives = NarrativeSet::new();
        narratives.insert(2030, "The first settlements.");

        let json = serde_json::to_string(&TimelineEvent::Complete { narratives }).unwrap();
        assert_eq!(
            json,
            r#"{"type":"complete","narratives":{"2030":"The first settlements."}}"#
        );
    }

    #[test]
    fn error_event_wire_shape() {
        let json = serde_json::to_string(&TimelineEvent::Error {
            error: "generation failed".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"error","error":"generation failed"}"#);
    }

    #[test]
    fn narrative_set_orders_years() {
        let mut narratives = NarrativeSet::new();
        narratives.insert(2050, "c");
        narratives.insert(2030, "a");
        narratives.insert(2040, "b");

        let years: Vec<i32> = narratives.iter().map(|(y, _)| y).collect();
        assert_eq!(years, vec![2030, 2040, 2050]);
    }

    #[test]
    fn years_before_excludes_the_year_itself() {
        let mut narratives = NarrativeSet::new();
        narratives.insert(2030, "a");
        narratives.insert(2040, "b");
        narratives.insert(2050, "c");

        let earlier: Vec<i32> = narratives.years_before(2050).map(|(y, _)| y).collect();
        assert_eq!(earlier, vec![2030, 2040]);
    }
}
