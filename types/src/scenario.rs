//! The takeoff scenario model.
//!
//! A [`Scenario`] is a value object: built once (from defaults, a config
//! file, or an API request), validated, and then treated as read-only by the
//! curve engine and the narrative orchestrator. Field and variant names
//! follow the camelCase wire shape the historical frontend produced, so
//! existing scenario JSON deserializes unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How quickly the takeoff unfolds once it starts.
///
/// Descriptive only: the curve math does not branch on it, but the narrative
/// prompt spells it out for the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedKind {
    Slow,
    #[default]
    Moderate,
    Fast,
}

impl SpeedKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Moderate => "moderate",
            Self::Fast => "fast",
        }
    }

    /// Human tempo label used in narrative prompts.
    #[must_use]
    pub const fn tempo(self) -> &'static str {
        match self {
            Self::Slow => "Years/Decades",
            Self::Moderate => "Months/Years",
            Self::Fast => "Days/Weeks",
        }
    }
}

/// Qualitative altitude/launch-height band. Descriptive only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AltitudeKind {
    #[default]
    Low,
    Medium,
    High,
}

/// How capability progress unfolds. Descriptive only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressionKind {
    #[default]
    Gradual,
    Sudden,
}

impl ProgressionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gradual => "gradual",
            Self::Sudden => "sudden",
        }
    }

    /// Human progression label used in narrative prompts.
    #[must_use]
    pub const fn style(self) -> &'static str {
        match self {
            Self::Gradual => "steady progress",
            Self::Sudden => "sudden jumps",
        }
    }
}

/// How moral consideration tracks raw capacity growth over the plotted
/// domain. Unlike the other vocabulary enums, this one drives curve math.
///
/// The enum is closed: an unknown type fails at deserialization, so no
/// undefined branch exists at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoralConsiderationKind {
    /// Recognition tracks capacity throughout.
    Coupled,
    /// Recognition is a flat constant, independent of capacity.
    Uncoupled,
    /// Recognition tracks capacity, then decays past the domain midpoint.
    Decoupling,
    /// Recognition sits on a low plateau, then catches up late.
    #[default]
    Delayed,
}

impl MoralConsiderationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coupled => "coupled",
            Self::Uncoupled => "uncoupled",
            Self::Decoupling => "decoupling",
            Self::Delayed => "delayed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Speed {
    #[serde(rename = "type", default)]
    pub kind: SpeedKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Altitude {
    #[serde(rename = "type", default)]
    pub kind: AltitudeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progression {
    #[serde(rename = "type", default)]
    pub kind: ProgressionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    /// Before this year both series pin to their floor values.
    #[serde(default = "default_start_year")]
    pub start_year: i32,
    /// Whether existential security was achieved before the takeoff.
    /// Contextual: feeds the narrative prompt only.
    #[serde(default)]
    pub existential_security_aligned: bool,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            start_year: default_start_year(),
            existential_security_aligned: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoralConsideration {
    #[serde(rename = "type", default)]
    pub kind: MoralConsiderationKind,
    /// Fraction of computed capacity treated as morally recognized, in [0,1].
    #[serde(default = "default_moral_level")]
    pub level: f64,
}

impl Default for MoralConsideration {
    fn default() -> Self {
        Self {
            kind: MoralConsiderationKind::default(),
            level: default_moral_level(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedValue {
    /// Confidence weighting in [0,100], applied as credence/100.
    #[serde(default = "default_credence")]
    pub credence: f64,
    /// Capacity floor at and before the start year. Positive.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: f64,
    /// Asymptotic capacity ceiling. Must exceed `initial_capacity`.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: f64,
    /// Capacity checkpoint ten years after the start year. Must lie strictly
    /// between `initial_capacity` and `max_capacity` for the logistic solver
    /// to produce a finite growth rate.
    #[serde(default = "default_ten_year_capacity")]
    pub capacity_after_ten_years: f64,
}

impl Default for ExpectedValue {
    fn default() -> Self {
        Self {
            credence: default_credence(),
            initial_capacity: default_initial_capacity(),
            max_capacity: default_max_capacity(),
            capacity_after_ten_years: default_ten_year_capacity(),
        }
    }
}

const fn default_start_year() -> i32 {
    2025
}

const fn default_moral_level() -> f64 {
    0.5
}

const fn default_credence() -> f64 {
    50.0
}

const fn default_initial_capacity() -> f64 {
    1e6
}

const fn default_max_capacity() -> f64 {
    1e10
}

const fn default_ten_year_capacity() -> f64 {
    9e9
}

/// A parameterized takeoff hypothesis.
///
/// The default scenario matches the historical frontend defaults: a moderate
/// takeoff starting in 2025, gradual progression, delayed moral
/// consideration at level 0.5, credence 50, growing from 1e6 toward 1e10
/// human-equivalents.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub speed: Speed,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub max_altitude: Altitude,
    #[serde(default)]
    pub launch_height: Altitude,
    #[serde(default)]
    pub progression: Progression,
    #[serde(default)]
    pub moral_consideration: MoralConsideration,
    #[serde(default)]
    pub expected_value: ExpectedValue,
}

/// Rejection reasons for a malformed scenario.
#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("scenario field {0} is not a finite number")]
    NonFinite(&'static str),
    #[error("initialCapacity must be positive (got {0})")]
    InitialCapacity(f64),
    #[error("maxCapacity ({max}) must exceed initialCapacity ({initial})")]
    CapacityBounds { initial: f64, max: f64 },
    #[error(
        "capacityAfterTenYears ({value}) must lie strictly between \
         initialCapacity ({initial}) and maxCapacity ({max})"
    )]
    TenYearCheckpoint { value: f64, initial: f64, max: f64 },
    #[error("credence must be within 0-100 (got {0})")]
    Credence(f64),
    #[error("moral consideration level must be within 0-1 (got {0})")]
    MoralLevel(f64),
}

impl Scenario {
    /// Check every numeric invariant the curve engine relies on.
    ///
    /// Called at every curve entry point so invalid inputs fail fast with a
    /// descriptive error instead of surfacing as NaN/Infinity series.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let ev = &self.expected_value;
        let checks = [
            ("expectedValue.credence", ev.credence),
            ("expectedValue.initialCapacity", ev.initial_capacity),
            ("expectedValue.maxCapacity", ev.max_capacity),
            (
                "expectedValue.capacityAfterTenYears",
                ev.capacity_after_ten_years,
            ),
            ("moralConsideration.level", self.moral_consideration.level),
        ];
        for (field, value) in checks {
            if !value.is_finite() {
                return Err(ScenarioError::NonFinite(field));
            }
        }

        if ev.initial_capacity <= 0.0 {
            return Err(ScenarioError::InitialCapacity(ev.initial_capacity));
        }
        if ev.max_capacity <= ev.initial_capacity {
            return Err(ScenarioError::CapacityBounds {
                initial: ev.initial_capacity,
                max: ev.max_capacity,
            });
        }
        if ev.capacity_after_ten_years <= ev.initial_capacity
            || ev.capacity_after_ten_years >= ev.max_capacity
        {
            return Err(ScenarioError::TenYearCheckpoint {
                value: ev.capacity_after_ten_years,
                initial: ev.initial_capacity,
                max: ev.max_capacity,
            });
        }
        if !(0.0..=100.0).contains(&ev.credence) {
            return Err(ScenarioError::Credence(ev.credence));
        }
        let level = self.moral_consideration.level;
        if !(0.0..=1.0).contains(&level) {
            return Err(ScenarioError::MoralLevel(level));
        }

        Ok(())
    }
}
