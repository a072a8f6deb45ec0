//! Magnitude labels for welfare-capacity values.

use thiserror::Error;

/// Powers of ten get short labels only in this band; everything else falls
/// back to `10^n` notation.
const LABELED_POWERS: [(i32, &str); 9] = [
    (6, "1M"),
    (7, "10M"),
    (8, "100M"),
    (9, "1B"),
    (10, "10B"),
    (11, "100B"),
    (12, "1T"),
    (13, "10T"),
    (14, "100T"),
];

/// log10 is undefined at or below zero.
#[derive(Debug, Error, PartialEq)]
#[error("power-of-ten label requires a positive finite value (got {0})")]
pub struct NonPositiveValueError(pub f64);

/// Label an axis value by its order of magnitude.
///
/// Exact powers of ten from 1e6 through 1e14 map to fixed labels ("1M" ..
/// "100T"); every other value renders as `10^n` with `n = floor(log10)`.
pub fn format_power_of_ten(value: f64) -> Result<String, NonPositiveValueError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(NonPositiveValueError(value));
    }

    let mut power = value.log10().floor() as i32;
    // log10 can land a hair under the true value at exact powers; settle the
    // floor against exact comparisons instead of trusting it.
    if pow10(power + 1) <= value {
        power += 1;
    } else if pow10(power) > value {
        power -= 1;
    }

    if pow10(power) == value
        && let Some((_, label)) = LABELED_POWERS.iter().find(|(p, _)| *p == power)
    {
        return Ok((*label).to_string());
    }

    Ok(format!("10^{power}"))
}

fn pow10(power: i32) -> f64 {
    10f64.powi(power)
}

/// Render a capacity value with its unit suffix.
///
/// Billions and millions get one decimal place; smaller values render as an
/// integer count.
#[must_use]
pub fn format_welfare_capacity(value: f64) -> String {
    if value >= 1e9 {
        format!("{:.1}B human-equivalents", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.1}M human-equivalents", value / 1e6)
    } else {
        format!("{value:.0} human-equivalents")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_exact_powers() {
        assert_eq!(format_power_of_ten(1e6).unwrap(), "1M");
        assert_eq!(format_power_of_ten(1e7).unwrap(), "10M");
        assert_eq!(format_power_of_ten(1e8).unwrap(), "100M");
        assert_eq!(format_power_of_ten(1e9).unwrap(), "1B");
        assert_eq!(format_power_of_ten(1e10).unwrap(), "10B");
        assert_eq!(format_power_of_ten(1e11).unwrap(), "100B");
        assert_eq!(format_power_of_ten(1e12).unwrap(), "1T");
        assert_eq!(format_power_of_ten(1e13).unwrap(), "10T");
        assert_eq!(format_power_of_ten(1e14).unwrap(), "100T");
    }

    #[test]
    fn non_exact_values_fall_back_to_floor_power() {
        assert_eq!(format_power_of_ten(5_000_000.0).unwrap(), "10^6");
        assert_eq!(format_power_of_ten(2e9).unwrap(), "10^9");
        assert_eq!(format_power_of_ten(999_999.0).unwrap(), "10^5");
    }

    #[test]
    fn powers_outside_the_labeled_band_fall_back() {
        assert_eq!(format_power_of_ten(1e5).unwrap(), "10^5");
        assert_eq!(format_power_of_ten(1e15).unwrap(), "10^15");
        assert_eq!(format_power_of_ten(1.0).unwrap(), "10^0");
    }

    #[test]
    fn rejects_non_positive_values() {
        assert!(format_power_of_ten(0.0).is_err());
        assert!(format_power_of_ten(-10.0).is_err());
        assert!(format_power_of_ten(f64::NAN).is_err());
    }

    #[test]
    fn capacity_renders_billions_with_one_decimal() {
        assert_eq!(format_welfare_capacity(2.5e9), "2.5B human-equivalents");
        assert_eq!(format_welfare_capacity(1e9), "1.0B human-equivalents");
    }

    #[test]
    fn capacity_renders_millions_with_one_decimal() {
        assert_eq!(format_welfare_capacity(1.5e6), "1.5M human-equivalents");
        assert_eq!(format_welfare_capacity(999_999_999.0), "1000.0M human-equivalents");
    }

    #[test]
    fn small_capacity_renders_as_a_count() {
        assert_eq!(format_welfare_capacity(500.0), "500 human-equivalents");
        assert_eq!(format_welfare_capacity(0.0), "0 human-equivalents");
    }
}
