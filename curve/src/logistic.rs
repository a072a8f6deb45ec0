//! The curve engine.
//!
//! Capacity growth is a standard logistic S-curve anchored at three points:
//! the start year (capacity floor), a midpoint five years in, and a
//! checkpoint ten years in whose capacity the scenario specifies directly.
//! The growth-rate constant is solved in closed form from those anchors,
//! then the curve is sampled across the plotted domain.

use takeoff_types::{MoralConsiderationKind, Scenario, ScenarioError, TimeSeriesPoint};
use thiserror::Error;

/// Samples per series.
pub const CURVE_POINTS: usize = 100;
/// First plotted year (inclusive).
pub const DOMAIN_START_YEAR: f64 = 2025.0;
/// Last plotted year (exclusive).
pub const DOMAIN_END_YEAR: f64 = 2085.0;
/// Display floor for emitted capacity values, in human-equivalents.
pub const CAPACITY_FLOOR: f64 = 1e6;

/// Years from takeoff start to the logistic midpoint.
const MIDPOINT_OFFSET_YEARS: f64 = 5.0;
/// Years from takeoff start to the scenario's capacity checkpoint.
const CHECKPOINT_OFFSET_YEARS: f64 = 10.0;

/// Constant recognized capacity for the `uncoupled` profile, pre-level.
const UNCOUPLED_CAPACITY: f64 = 1e8;
/// Plateau capacity for the `delayed` profile, pre-level.
const DELAYED_PLATEAU_CAPACITY: f64 = 1e7;
/// Progress at the center of the `delayed` profile's catch-up transition.
const DELAYED_TRANSITION_POINT: f64 = 0.7;
/// Transition half-width, in progress units.
const DELAYED_TRANSITION_WIDTH: f64 = 0.05;

/// Failures surfaced by the curve engine instead of NaN/Infinity samples.
#[derive(Debug, Error, PartialEq)]
pub enum CurveError {
    #[error("ten-year capacity ratio {target} falls outside the open interval (0, 1)")]
    TargetOutOfRange { target: f64 },
    #[error("logistic growth rate is not finite (target {target}, time span {time_span})")]
    NonFiniteRate { target: f64, time_span: f64 },
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

/// Solve for the logistic growth-rate constant `k`.
///
/// Derives `k` such that a logistic curve between `min_cap` and `max_cap`,
/// centered at `mid_year`, passes through `cap_at_ten_years` at
/// `start_year + 10`.
pub fn solve_growth_rate(
    start_year: f64,
    mid_year: f64,
    min_cap: f64,
    max_cap: f64,
    cap_at_ten_years: f64,
) -> Result<f64, CurveError> {
    let target = (cap_at_ten_years - min_cap) / (max_cap - min_cap);
    if !(target > 0.0 && target < 1.0) {
        return Err(CurveError::TargetOutOfRange { target });
    }

    let time_span = start_year + CHECKPOINT_OFFSET_YEARS - mid_year;
    let rate = -(1.0 / target - 1.0).ln() / time_span;
    if !rate.is_finite() {
        return Err(CurveError::NonFiniteRate { target, time_span });
    }

    Ok(rate)
}

/// Evaluate the raw (unweighted) logistic capacity at `year`.
///
/// The midpoint is pinned five years after the scenario's start year.
pub fn capacity_at(year: f64, scenario: &Scenario) -> Result<f64, CurveError> {
    let ev = &scenario.expected_value;
    let start_year = f64::from(scenario.timing.start_year);
    let mid_year = start_year + MIDPOINT_OFFSET_YEARS;

    let rate = solve_growth_rate(
        start_year,
        mid_year,
        ev.initial_capacity,
        ev.max_capacity,
        ev.capacity_after_ten_years,
    )?;

    Ok(ev.initial_capacity
        + (ev.max_capacity - ev.initial_capacity) / (1.0 + (-rate * (year - mid_year)).exp()))
}

/// Expected-capacity series: 100 points over [2025, 2085).
///
/// Before the scenario's start year each point is `(x, initialCapacity)`
/// exactly. From the start year on, the logistic value is weighted by
/// credence and the moral-consideration level, then clamped to the display
/// floor.
pub fn expected_capacity_series(scenario: &Scenario) -> Result<Vec<TimeSeriesPoint>, CurveError> {
    scenario.validate()?;

    let step = (DOMAIN_END_YEAR - DOMAIN_START_YEAR) / CURVE_POINTS as f64;
    let start_year = f64::from(scenario.timing.start_year);
    let credence = scenario.expected_value.credence / 100.0;
    let level = scenario.moral_consideration.level;

    let mut points = Vec::with_capacity(CURVE_POINTS);
    for index in 0..CURVE_POINTS {
        let x = DOMAIN_START_YEAR + index as f64 * step;
        if x < start_year {
            points.push(TimeSeriesPoint::new(
                x,
                scenario.expected_value.initial_capacity,
            ));
            continue;
        }

        let weighted = capacity_at(x, scenario)? * credence * level;
        points.push(TimeSeriesPoint::new(x, weighted.max(CAPACITY_FLOOR)));
    }

    Ok(points)
}

/// Moral-consideration series: 100 points over the same domain.
///
/// The expected-capacity series is computed once and reused as the base
/// signal. `progress` is the sample index over the point count, not a
/// function of the year. Points before the start year pin to the floor.
pub fn moral_consideration_series(
    scenario: &Scenario,
) -> Result<Vec<TimeSeriesPoint>, CurveError> {
    let base = expected_capacity_series(scenario)?;

    let start_year = f64::from(scenario.timing.start_year);
    let level = scenario.moral_consideration.level;
    let kind = scenario.moral_consideration.kind;

    let mut points = Vec::with_capacity(CURVE_POINTS);
    for (index, base_point) in base.iter().enumerate() {
        let x = base_point.x;
        if x < start_year {
            points.push(TimeSeriesPoint::new(x, CAPACITY_FLOOR));
            continue;
        }

        let progress = index as f64 / CURVE_POINTS as f64;
        let y = recognized_capacity(kind, base_point.y, level, progress);
        points.push(TimeSeriesPoint::new(x, y.max(CAPACITY_FLOOR)));
    }

    Ok(points)
}

fn recognized_capacity(
    kind: MoralConsiderationKind,
    base_y: f64,
    level: f64,
    progress: f64,
) -> f64 {
    match kind {
        MoralConsiderationKind::Coupled => base_y * level,
        MoralConsiderationKind::Uncoupled => UNCOUPLED_CAPACITY * level,
        MoralConsiderationKind::Decoupling => {
            if progress < 0.5 {
                base_y * level
            } else {
                // Halves roughly every 0.1 progress past the midpoint.
                base_y * level * 0.5_f64.powf((progress - 0.5) * 10.0)
            }
        }
        MoralConsiderationKind::Delayed => {
            let plateau = DELAYED_PLATEAU_CAPACITY * level;
            let full = base_y * level;
            let lower = DELAYED_TRANSITION_POINT - DELAYED_TRANSITION_WIDTH;
            let upper = DELAYED_TRANSITION_POINT + DELAYED_TRANSITION_WIDTH;
            if progress < lower {
                plateau
            } else if progress > upper {
                full
            } else {
                let t = (progress - lower) / (2.0 * DELAYED_TRANSITION_WIDTH);
                plateau * (1.0 - t) + full * t
            }
        }
    }
}
