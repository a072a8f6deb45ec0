//! The narrative timeline orchestrator.

use serde::Deserialize;
use takeoff_types::{
    GenerationError, NarrativeSet, Scenario, ScenarioError, TextGenerator, TimelineEvent,
};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::prompt::build_narrative_prompt;

/// Suggested capacity for the timeline event channel. One run emits at most
/// one event per year plus a terminal event, so consumers that drain after
/// completion can size the channel from the year count instead.
pub const TIMELINE_EVENT_CHANNEL_CAPACITY: usize = 64;

/// A request for one narrative timeline run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRequest {
    pub scenario: Scenario,
    /// Years to narrate. Treated as an ordered set: sorted ascending,
    /// duplicates dropped. Must be non-empty.
    pub years: Vec<i32>,
    /// The consumer's present year, surfaced in the prompt parameter block.
    pub current_year: i32,
}

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("years must be a non-empty list")]
    EmptyYears,
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("narrative generation failed for year {year}: {source}")]
    Generation {
        year: i32,
        #[source]
        source: GenerationError,
    },
}

struct ValidatedTimeline {
    scenario: Scenario,
    years: Vec<i32>,
    current_year: i32,
}

impl TimelineRequest {
    fn validate(self) -> Result<ValidatedTimeline, TimelineError> {
        if self.years.is_empty() {
            return Err(TimelineError::EmptyYears);
        }
        self.scenario.validate()?;

        let mut years = self.years;
        years.sort_unstable();
        years.dedup();

        Ok(ValidatedTimeline {
            scenario: self.scenario,
            years,
            current_year: self.current_year,
        })
    }
}

/// Run one timeline: generate a narrative per year, strictly in order,
/// streaming progress through `tx`.
///
/// Each prompt embeds every earlier narrative, so the years form an explicit
/// ordering dependency and never run concurrently. Emits one
/// [`TimelineEvent::Progress`] per completed year and exactly one terminal
/// event: [`TimelineEvent::Complete`] with the full mapping, or
/// [`TimelineEvent::Error`] if any year fails. A failure aborts the rest of
/// the run with no partial-result recovery and no retry at this layer.
///
/// Cancellation is cooperative: before each external call the orchestrator
/// checks whether the consumer is still listening and stops quietly if not.
pub async fn stream_timeline<G: TextGenerator>(
    generator: &G,
    request: TimelineRequest,
    tx: mpsc::Sender<TimelineEvent>,
) -> Result<(), TimelineError> {
    let ValidatedTimeline {
        scenario,
        years,
        current_year,
    } = request.validate()?;

    let total = years.len();
    let mut narratives = NarrativeSet::new();

    for (index, year) in years.into_iter().enumerate() {
        if tx.is_closed() {
            tracing::debug!(year, "Timeline consumer disconnected, stopping generation");
            return Ok(());
        }

        let prompt = build_narrative_prompt(&scenario, year, current_year, &narratives);
        tracing::debug!(year, prompt_bytes = prompt.len(), "Requesting narrative");

        match generator.generate(&prompt).await {
            Ok(text) => narratives.insert(year, text.trim().to_string()),
            Err(source) => {
                tracing::warn!(year, error = %source, "Narrative generation failed");
                let _ = tx
                    .send(TimelineEvent::Error {
                        error: source.to_string(),
                    })
                    .await;
                return Err(TimelineError::Generation { year, source });
            }
        }

        let progress = (((index + 1) as f64 / total as f64) * 100.0).round() as u8;
        if tx.send(TimelineEvent::Progress { progress }).await.is_err() {
            return Ok(());
        }
    }

    let _ = tx.send(TimelineEvent::Complete { narratives }).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Mutex;

    /// Scripted generator: records prompts, optionally fails on one call.
    #[derive(Default)]
    struct FakeGenerator {
        prompts: Mutex<Vec<String>>,
        fail_on_call: Option<usize>,
    }

    impl FakeGenerator {
        fn failing_on(call: usize) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail_on_call: Some(call),
            }
        }

        fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn prompt(&self, call: usize) -> String {
            self.prompts.lock().unwrap()[call].clone()
        }
    }

    impl TextGenerator for FakeGenerator {
        fn generate(
            &self,
            prompt: &str,
        ) -> impl Future<Output = Result<String, GenerationError>> + Send {
            let call = {
                let mut prompts = self.prompts.lock().unwrap();
                prompts.push(prompt.to_string());
                prompts.len() - 1
            };
            let fail = self.fail_on_call == Some(call);
            async move {
                if fail {
                    Err(GenerationError::Service("scripted failure".to_string()))
                } else {
                    Ok(format!("Account {call}."))
                }
            }
        }
    }

    fn request(years: Vec<i32>) -> TimelineRequest {
        TimelineRequest {
            scenario: Scenario::default(),
            years,
            current_year: 2025,
        }
    }

    async fn drain(mut rx: mpsc::Receiver<TimelineEvent>) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn three_years_emit_progress_then_complete() {
        let generator = FakeGenerator::default();
        let (tx, rx) = mpsc::channel(16);

        stream_timeline(&generator, request(vec![2030, 2040, 2050]), tx)
            .await
            .unwrap();

        let events = drain(rx).await;
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], TimelineEvent::Progress { progress: 33 });
        assert_eq!(events[1], TimelineEvent::Progress { progress: 67 });
        assert_eq!(events[2], TimelineEvent::Progress { progress: 100 });

        match &events[3] {
            TimelineEvent::Complete { narratives } => {
                assert_eq!(narratives.len(), 3);
                assert_eq!(narratives.get(2030), Some("Account 0."));
                assert_eq!(narratives.get(2040), Some("Account 1."));
                assert_eq!(narratives.get(2050), Some("Account 2."));
            }
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn middle_year_failure_aborts_the_run() {
        let generator = FakeGenerator::failing_on(1);
        let (tx, rx) = mpsc::channel(16);

        let result = stream_timeline(&generator, request(vec![2030, 2040, 2050]), tx).await;

        assert!(matches!(
            result,
            Err(TimelineError::Generation { year: 2040, .. })
        ));
        // 2050 is never attempted.
        assert_eq!(generator.call_count(), 2);

        let events = drain(rx).await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], TimelineEvent::Progress { progress: 33 });
        match &events[1] {
            TimelineEvent::Error { error } => assert!(error.contains("scripted failure")),
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn prompts_accumulate_earlier_narratives() {
        let generator = FakeGenerator::default();
        let (tx, rx) = mpsc::channel(16);

        stream_timeline(&generator, request(vec![2030, 2040, 2050]), tx)
            .await
            .unwrap();
        drain(rx).await;

        let first = generator.prompt(0);
        assert!(!first.contains("Account"));

        let third = generator.prompt(2);
        assert!(third.contains("2030: Account 0."));
        assert!(third.contains("2040: Account 1."));
    }

    #[tokio::test]
    async fn years_are_sorted_and_deduplicated() {
        let generator = FakeGenerator::default();
        let (tx, rx) = mpsc::channel(16);

        stream_timeline(&generator, request(vec![2050, 2030, 2030, 2040]), tx)
            .await
            .unwrap();

        assert_eq!(generator.call_count(), 3);
        // First prompt targets the earliest year.
        assert!(generator.prompt(0).contains("for the year 2030"));

        let events = drain(rx).await;
        match events.last().unwrap() {
            TimelineEvent::Complete { narratives } => assert_eq!(narratives.len(), 3),
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn single_year_reports_full_progress() {
        let generator = FakeGenerator::default();
        let (tx, rx) = mpsc::channel(16);

        stream_timeline(&generator, request(vec![2060]), tx)
            .await
            .unwrap();

        let events = drain(rx).await;
        assert_eq!(events[0], TimelineEvent::Progress { progress: 100 });
    }

    #[tokio::test]
    async fn empty_years_are_rejected_before_any_event() {
        let generator = FakeGenerator::default();
        let (tx, rx) = mpsc::channel(16);

        let result = stream_timeline(&generator, request(Vec::new()), tx).await;

        assert!(matches!(result, Err(TimelineError::EmptyYears)));
        assert_eq!(generator.call_count(), 0);
        assert!(drain(rx).await.is_empty());
    }

    #[tokio::test]
    async fn invalid_scenario_is_rejected_before_any_event() {
        let generator = FakeGenerator::default();
        let (tx, rx) = mpsc::channel(16);

        let mut bad = request(vec![2030]);
        bad.scenario.expected_value.max_capacity = 1.0;

        let result = stream_timeline(&generator, bad, tx).await;

        assert!(matches!(result, Err(TimelineError::Scenario(_))));
        assert_eq!(generator.call_count(), 0);
        assert!(drain(rx).await.is_empty());
    }

    #[tokio::test]
    async fn dropped_receiver_stops_generation() {
        let generator = FakeGenerator::default();
        let (tx, rx) = mpsc::channel(16);
        drop(rx);

        let result = stream_timeline(&generator, request(vec![2030, 2040]), tx).await;

        assert!(result.is_ok());
        assert_eq!(generator.call_count(), 0);
    }
}
