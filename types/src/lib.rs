//! Core domain types for the takeoff modeling engine.
//!
//! This crate contains pure domain types with no IO, no async runtime, and
//! minimal dependencies. Everything here can be used from any layer of the
//! workspace: the scenario model and its validation, plotted time-series
//! points, the narrative/timeline event vocabulary, and the [`TextGenerator`]
//! seam the orchestrator uses to talk to a generation service.

mod event;
mod generate;
mod scenario;

pub use event::{ApiUsage, GenerationEvent, NarrativeSet, TimelineEvent};
pub use generate::{GenerationError, TextGenerator};
pub use scenario::{
    Altitude, AltitudeKind, ExpectedValue, MoralConsideration, MoralConsiderationKind,
    Progression, ProgressionKind, Scenario, ScenarioError, Speed, SpeedKind, Timing,
};

use serde::{Deserialize, Serialize};

/// A single plotted sample: fractional year on the x axis, welfare capacity
/// in human-equivalents on the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub x: f64,
    pub y: f64,
}

impl TimeSeriesPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
