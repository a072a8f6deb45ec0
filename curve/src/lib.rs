//! Welfare-capacity projections for takeoff scenarios.
//!
//! # Architecture
//!
//! Two small, pure modules:
//!
//! - [`logistic`] - the curve engine: derives a logistic growth rate from a
//!   scenario's capacity anchors and evaluates the raw and morally-weighted
//!   capacity series over the plotted domain
//! - [`format`] - magnitude labels for capacity values
//!
//! Everything is a deterministic function of its inputs, with no internal
//! state. Both modules are safe for unrestricted concurrent use.

pub mod format;
pub mod logistic;

pub use format::{NonPositiveValueError, format_power_of_ten, format_welfare_capacity};
pub use logistic::{
    CAPACITY_FLOOR, CURVE_POINTS, CurveError, DOMAIN_END_YEAR, DOMAIN_START_YEAR, capacity_at,
    expected_capacity_series, moral_consideration_series, solve_growth_rate,
};
