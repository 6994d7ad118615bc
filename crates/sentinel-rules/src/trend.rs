// crates/sentinel-rules/src/trend.rs
// ============================================================================
// Module: Trend Magnitude
// Description: Slope/percent-change/absolute-change computation over a numeric series.
// Purpose: Give TREND rules a single, reproducible magnitude formula per `trend_type`.
// Dependencies: sentinel_core::TrendType
// ============================================================================

//! ## Overview
//! Every function here takes the already-windowed series (the engine applies
//! `window` before calling in). All three return a *signed* magnitude; the
//! caller applies the `direction` qualifier.

use sentinel_core::TrendDirection;
use sentinel_core::TrendType;

/// Ordinary-least-squares slope of `series` against its point index.
///
/// Returns `0.0` if the series has fewer than two points or the index
/// variance is zero (a guard that can't actually trigger for ≥2 distinct
/// indices, but keeps the formula total).
#[must_use]
pub fn slope(series: &[f64]) -> f64 {
    let n = series.len();
    if n < 2 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss, reason = "series lengths are small rule-window sizes")]
    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = series.iter().sum::<f64>() / n_f;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (index, &y) in series.iter().enumerate() {
        #[allow(clippy::cast_precision_loss, reason = "index is bounded by series length")]
        let x = index as f64;
        let dx = x - mean_x;
        numerator += dx * (y - mean_y);
        denominator += dx * dx;
    }

    if denominator == 0.0 { 0.0 } else { numerator / denominator }
}

/// Percent change from the first to the last point in `series`.
///
/// When the start value is zero, returns `100.0`/`-100.0` matching the sign
/// of the end value, or `0.0` if the end value is also zero.
#[must_use]
pub fn percent_change(series: &[f64]) -> f64 {
    let (Some(&start), Some(&end)) = (series.first(), series.last()) else {
        return 0.0;
    };
    if start == 0.0 {
        return if end > 0.0 {
            100.0
        } else if end < 0.0 {
            -100.0
        } else {
            0.0
        };
    }
    (end - start) / start * 100.0
}

/// Absolute change from the first to the last point in `series`.
#[must_use]
pub fn absolute_change(series: &[f64]) -> f64 {
    let (Some(&start), Some(&end)) = (series.first(), series.last()) else {
        return 0.0;
    };
    end - start
}

/// Computes the signed magnitude of `series` under `trend_type`.
#[must_use]
pub fn magnitude(series: &[f64], trend_type: TrendType) -> f64 {
    match trend_type {
        TrendType::Slope => slope(series),
        TrendType::PercentChange => percent_change(series),
        TrendType::AbsoluteChange => absolute_change(series),
    }
}

/// Whether `value` satisfies `direction` at or above `threshold`.
#[must_use]
pub fn satisfies_direction(value: f64, threshold: f64, direction: TrendDirection) -> bool {
    match direction {
        TrendDirection::Increasing => value > 0.0 && value >= threshold,
        TrendDirection::Decreasing => value < 0.0 && value.abs() >= threshold,
        TrendDirection::Any => value.abs() >= threshold,
    }
}
