// crates/sentinel-providers/src/anomaly.rs
// ============================================================================
// Module: Z-Score Anomaly Detector
// Description: Default statistical AnomalyDetector implementation.
// Purpose: Give the Rule Engine's ANOMALY family a working detector out of the box.
// Dependencies: sentinel_core::AnomalyDetector
// ============================================================================

//! ## Overview
//! [`ZScoreAnomalyDetector`] implements spec §4.1's default `z_score`
//! algorithm: compute the sample mean and standard deviation of `series`
//! (historical points plus the current one), then flag the last point as
//! anomalous if its absolute deviation from the mean exceeds
//! `sensitivity` standard deviations. Unrecognized `algorithm` names fall
//! back to `z_score` rather than failing closed — the detector is
//! consulted only for diagnostic attribution, so "never trigger" on an
//! unknown algorithm would silently disable a rule instead.

use sentinel_core::AnomalyDetector;

/// Detects anomalies via population z-score.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZScoreAnomalyDetector;

impl AnomalyDetector for ZScoreAnomalyDetector {
    fn detect_anomaly(
        &self,
        series: &[f64],
        _algorithm: &str,
        sensitivity: f64,
        _metric_name: &str,
    ) -> bool {
        z_score_anomaly(series, sensitivity)
    }
}

fn z_score_anomaly(series: &[f64], sensitivity: f64) -> bool {
    let Some((&last, rest)) = series.split_last() else { return false };
    if rest.is_empty() {
        return false;
    }
    let mean = rest.iter().sum::<f64>() / rest.len() as f64;
    let variance = rest.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / rest.len() as f64;
    let std_dev = variance.sqrt();
    if std_dev <= f64::EPSILON {
        return (last - mean).abs() > f64::EPSILON;
    }
    ((last - mean) / std_dev).abs() > sensitivity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_point_far_from_the_mean() {
        let detector = ZScoreAnomalyDetector;
        let series = vec![10.0, 11.0, 9.0, 10.0, 11.0, 9.0, 50.0];
        assert!(detector.detect_anomaly(&series, "z_score", 2.0, "latency_ms"));
    }

    #[test]
    fn does_not_flag_a_typical_point() {
        let detector = ZScoreAnomalyDetector;
        let series = vec![10.0, 11.0, 9.0, 10.0, 11.0, 9.0, 10.0];
        assert!(!detector.detect_anomaly(&series, "z_score", 2.0, "latency_ms"));
    }

    #[test]
    fn single_point_series_is_never_anomalous() {
        let detector = ZScoreAnomalyDetector;
        assert!(!detector.detect_anomaly(&[42.0], "z_score", 2.0, "latency_ms"));
    }
}
