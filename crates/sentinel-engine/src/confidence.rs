// crates/sentinel-engine/src/confidence.rs
// ============================================================================
// Module: Confidence Scorer (C6)
// Description: Computes a four-factor confidence score for a candidate healing action.
// Purpose: Let the Resolution Selector and Approval Manager rank and gate candidates numerically.
// Dependencies: sentinel_core::ConfidenceScore
// ============================================================================

//! ## Overview
//! [`ConfidenceScorer::score`] implements spec §4.6's weighted formula
//! exactly:
//! `overall = 0.4·historical_success + 0.3·pattern_match + 0.2·data_characteristics + 0.1·contextual`,
//! with each factor and the overall clamped to `[0,1]`. Weights are
//! configurable and need not sum to 1; only the final clamp is mandatory.

use std::collections::HashMap;

use sentinel_core::ConfidenceScore;
use serde_json::Value;

/// Factor weights for the overall score. Defaults match spec §4.6 exactly.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceWeights {
    /// Weight applied to the historical-success factor (default 0.4).
    pub historical_success: f64,
    /// Weight applied to the pattern-match factor (default 0.3).
    pub pattern_match: f64,
    /// Weight applied to the data-characteristics factor (default 0.2).
    pub data_characteristics: f64,
    /// Weight applied to the contextual factor (default 0.1).
    pub contextual: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            historical_success: 0.4,
            pattern_match: 0.3,
            data_characteristics: 0.2,
            contextual: 0.1,
        }
    }
}

/// One prior attempt of a healing action, used to compute the
/// historical-success factor.
#[derive(Debug, Clone, Copy)]
pub struct HistoricalOutcome {
    /// Whether that attempt succeeded.
    pub succeeded: bool,
    /// Recency weight in `[0,1]`; more recent attempts should weigh more.
    pub recency_weight: f64,
}

/// A known pattern a candidate action may be matched against, for the
/// pattern-match factor.
#[derive(Debug, Clone, Copy)]
pub struct PatternMatch {
    /// Similarity of the current issue to the matched pattern, `[0,1]`.
    pub issue_similarity: f64,
    /// Similarity of the candidate action to the pattern's canonical action, `[0,1]`.
    pub action_similarity: f64,
}

/// Discrete data-characteristic levels, each mapped to a configured score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataLevel {
    /// Below a notable threshold.
    Low,
    /// Typical, unremarkable.
    Medium,
    /// Above a notable threshold.
    High,
}

/// Per-level score table for one data characteristic (volume, criticality,
/// complexity), config-driven per spec §4.6.
#[derive(Debug, Clone)]
pub struct DataCharacteristicTable(HashMap<DataLevel, f64>);

impl Default for DataCharacteristicTable {
    fn default() -> Self {
        Self(HashMap::from([
            (DataLevel::Low, 0.2),
            (DataLevel::Medium, 0.5),
            (DataLevel::High, 0.9),
        ]))
    }
}

impl DataCharacteristicTable {
    /// Looks up `level`'s configured score, defaulting to a neutral 0.5 if
    /// the table has no entry for it.
    #[must_use]
    pub fn score(&self, level: DataLevel) -> f64 {
        self.0.get(&level).copied().unwrap_or(0.5)
    }
}

/// Contextual factors: time-of-day, environment, maintenance window.
#[derive(Debug, Clone)]
pub struct ContextualFactors {
    /// Whether `now` falls within business hours for this deployment.
    pub business_hours: bool,
    /// Deployment environment tag (`"prod"`, `"stg"`, `"dev"`).
    pub environment: String,
    /// Whether a maintenance window is currently active.
    pub maintenance_window: bool,
}

/// Input to one [`ConfidenceScorer::score`] call.
pub struct ScoringInput<'a> {
    /// Prior attempts of this action type with matching key parameters.
    pub history: &'a [HistoricalOutcome],
    /// The matched pattern, if the issue was matched to one.
    pub pattern: Option<PatternMatch>,
    /// Data-characteristic levels present in this evaluation (volume,
    /// criticality, complexity); scored and averaged.
    pub data_levels: &'a [DataLevel],
    /// Contextual factors for this evaluation.
    pub contextual: &'a ContextualFactors,
}

/// Computes [`ConfidenceScore`]s per spec §4.6.
pub struct ConfidenceScorer {
    weights: ConfidenceWeights,
    data_table: DataCharacteristicTable,
    /// Samples below this count fall back to the neutral historical prior.
    min_history_samples: usize,
}

/// Neutral prior returned when too few historical samples exist.
const NEUTRAL_PRIOR: f64 = 0.5;
/// Default minimum sample count before trusting the historical factor.
pub const DEFAULT_MIN_HISTORY_SAMPLES: usize = 5;

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self {
            weights: ConfidenceWeights::default(),
            data_table: DataCharacteristicTable::default(),
            min_history_samples: DEFAULT_MIN_HISTORY_SAMPLES,
        }
    }
}

impl ConfidenceScorer {
    /// Builds a scorer with explicit weights, data table, and history floor.
    #[must_use]
    pub fn new(
        weights: ConfidenceWeights,
        data_table: DataCharacteristicTable,
        min_history_samples: usize,
    ) -> Self {
        Self { weights, data_table, min_history_samples }
    }

    /// Computes the four factors and the weighted overall for `input`.
    #[must_use]
    pub fn score(&self, input: &ScoringInput<'_>) -> ConfidenceScore {
        let historical_success_factor = self.historical_success(input.history);
        let pattern_match_factor = pattern_match(input.pattern);
        let data_characteristics_factor = self.data_characteristics(input.data_levels);
        let contextual_factor = contextual(input.contextual);

        let overall_score = clamp01(
            self.weights.historical_success * historical_success_factor
                + self.weights.pattern_match * pattern_match_factor
                + self.weights.data_characteristics * data_characteristics_factor
                + self.weights.contextual * contextual_factor,
        );

        ConfidenceScore {
            historical_success_factor: clamp01(historical_success_factor),
            pattern_match_factor: clamp01(pattern_match_factor),
            data_characteristics_factor: clamp01(data_characteristics_factor),
            contextual_factor: clamp01(contextual_factor),
            overall_score,
        }
    }

    /// Recency-weighted success rate, or the neutral prior if `history` has
    /// fewer than `min_history_samples` entries.
    fn historical_success(&self, history: &[HistoricalOutcome]) -> f64 {
        if history.len() < self.min_history_samples {
            return NEUTRAL_PRIOR;
        }
        let total_weight: f64 = history.iter().map(|outcome| outcome.recency_weight).sum();
        if total_weight <= 0.0 {
            return NEUTRAL_PRIOR;
        }
        let weighted_successes: f64 = history
            .iter()
            .filter(|outcome| outcome.succeeded)
            .map(|outcome| outcome.recency_weight)
            .sum();
        weighted_successes / total_weight
    }

    /// Mean of the configured score for each present data-characteristic
    /// level, or the neutral prior if none were supplied.
    fn data_characteristics(&self, levels: &[DataLevel]) -> f64 {
        if levels.is_empty() {
            return NEUTRAL_PRIOR;
        }
        let sum: f64 = levels.iter().map(|&level| self.data_table.score(level)).sum();
        sum / levels.len() as f64
    }
}

/// Mean of issue- and action-similarity when a pattern was matched; the
/// neutral prior otherwise.
fn pattern_match(pattern: Option<PatternMatch>) -> f64 {
    pattern.map_or(NEUTRAL_PRIOR, |pattern| {
        (pattern.issue_similarity + pattern.action_similarity) / 2.0
    })
}

/// Penalizes off-hours and non-prod environments slightly, rewards an
/// active maintenance window (healing during planned maintenance is lower
/// risk, so it's scored as higher confidence).
fn contextual(factors: &ContextualFactors) -> f64 {
    let mut score = NEUTRAL_PRIOR;
    score += if factors.business_hours { 0.1 } else { -0.1 };
    score += match factors.environment.as_str() {
        "prod" => 0.1,
        "stg" => 0.0,
        _ => -0.1,
    };
    if factors.maintenance_window {
        score += 0.2;
    }
    score
}

/// Converts free-form context values into [`DataLevel`]s by comparing
/// against enumerated thresholds, for callers building [`ScoringInput`]
/// straight from an alert's context map.
#[must_use]
pub fn data_level_from_volume(volume: f64) -> DataLevel {
    if volume < 1_000.0 {
        DataLevel::Low
    } else if volume < 1_000_000.0 {
        DataLevel::Medium
    } else {
        DataLevel::High
    }
}

/// Reads a string-valued context field and maps `"low"|"medium"|"high"` to
/// a [`DataLevel`], defaulting to `Medium` for anything else (including a
/// missing or non-string field).
#[must_use]
pub fn data_level_from_label(context: &sentinel_core::Context, field: &str) -> DataLevel {
    match context.get(field).and_then(Value::as_str) {
        Some("low") => DataLevel::Low,
        Some("high") => DataLevel::High,
        _ => DataLevel::Medium,
    }
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
