// crates/sentinel-engine/src/impact.rs
// ============================================================================
// Module: Impact Analyzer (C7)
// Description: Computes per-category and overall impact scores for a candidate healing action.
// Purpose: Let the Resolution Selector and Approval Manager weigh risk numerically, never fail
//   closed.
// Dependencies: sentinel_core::{ImpactAnalysis, ImpactLevel}
// ============================================================================

//! ## Overview
//! [`ImpactAnalyzer::analyze`] implements spec §4.7's four category formulas
//! exactly (DATA/PIPELINE/BUSINESS/RESOURCE), each clamped to `[0,1]`, plus
//! the weighted-mean overall and its [`ImpactLevel`] bucket. Per spec, "on
//! any exception, the analyzer returns a moderate (0.5) default across the
//! board" — [`ImpactAnalyzer::analyze`] is itself infallible, so that
//! fallback is exposed as [`ImpactAnalyzer::moderate_default`] for callers
//! building an `ImpactAnalysis` from a fallible extension point (for
//! instance, a config-sourced `*_add` table lookup that could panic on a
//! malformed entry) to fall back to explicitly.

use sentinel_core::ImpactAnalysis;
use sentinel_core::ImpactLevel;

/// Category weights for the overall score. Defaults match spec §4.7 exactly.
#[derive(Debug, Clone, Copy)]
pub struct ImpactWeights {
    /// Weight applied to the DATA category (default 0.4).
    pub data: f64,
    /// Weight applied to the PIPELINE category (default 0.3).
    pub pipeline: f64,
    /// Weight applied to the BUSINESS category (default 0.2).
    pub business: f64,
    /// Weight applied to the RESOURCE category (default 0.1).
    pub resource: f64,
}

impl Default for ImpactWeights {
    fn default() -> Self {
        Self { data: 0.4, pipeline: 0.3, business: 0.2, resource: 0.1 }
    }
}

/// A three-level add-on used by several category formulas (`low=0,
/// medium=0.1, high=0.2`, configurable per spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddLevel {
    /// Contributes `0.0`.
    Low,
    /// Contributes the table's medium value.
    Medium,
    /// Contributes the table's high value.
    High,
}

/// Per-level contribution table for one `*_add` term.
#[derive(Debug, Clone, Copy)]
pub struct AddTable {
    /// Value contributed at [`AddLevel::Medium`].
    pub medium: f64,
    /// Value contributed at [`AddLevel::High`].
    pub high: f64,
}

impl Default for AddTable {
    fn default() -> Self {
        Self { medium: 0.1, high: 0.2 }
    }
}

impl AddTable {
    fn value(&self, level: AddLevel) -> f64 {
        match level {
            AddLevel::Low => 0.0,
            AddLevel::Medium => self.medium,
            AddLevel::High => self.high,
        }
    }
}

/// Per-`action_type` base impact scores, consulted by the DATA/PIPELINE/
/// RESOURCE formulas.
#[derive(Debug, Clone, Default)]
pub struct ActionBaseImpact(std::collections::HashMap<String, f64>);

impl ActionBaseImpact {
    /// Registers `action_type`'s base impact score.
    pub fn set(&mut self, action_type: impl Into<String>, base: f64) {
        self.0.insert(action_type.into(), base);
    }

    fn get(&self, action_type: &str) -> f64 {
        self.0.get(action_type).copied().unwrap_or(0.0)
    }
}

/// Inputs to the DATA category formula.
#[derive(Debug, Clone, Copy)]
pub struct DataImpactInput {
    /// Row/record volume affected.
    pub volume: f64,
    /// Criticality add-on level.
    pub criticality: AddLevel,
    /// Visibility add-on level (how exposed this data is to downstream consumers).
    pub visibility: AddLevel,
}

/// Inputs to the PIPELINE category formula.
#[derive(Debug, Clone, Copy)]
pub struct PipelineImpactInput {
    /// Execution-time add-on level.
    pub execution_time: AddLevel,
    /// Number of downstream dependencies.
    pub dep_count: u32,
    /// Pipeline-criticality add-on level.
    pub pipeline_criticality: AddLevel,
}

/// Inputs to the BUSINESS category formula.
#[derive(Debug, Clone, Copy)]
pub struct BusinessImpactInput {
    /// Base score for the business-criticality tier (not a `low/medium/high`
    /// add-on — a direct `[0,1]` starting value, per spec's `criticality_base`).
    pub criticality_base: f64,
    /// Whether the affected SLA deadline is approaching.
    pub approaching_sla: bool,
    /// Visibility add-on level.
    pub visibility: AddLevel,
    /// Whether this affects reporting/analytics consumers.
    pub affects_reporting: bool,
}

/// Inputs to the RESOURCE category formula.
#[derive(Debug, Clone, Copy)]
pub struct ResourceImpactInput {
    /// Compute add-on level.
    pub compute: AddLevel,
    /// Storage add-on level.
    pub storage: AddLevel,
    /// Cost add-on level.
    pub cost: AddLevel,
    /// Scaling factor; `> 2` adds a fixed 0.2 for `RESOURCE_SCALING` actions.
    pub scale_factor: f64,
}

/// Full input to one [`ImpactAnalyzer::analyze`] call.
#[derive(Debug, Clone, Copy)]
pub struct ImpactInput<'a> {
    /// Action type tag, used for base-impact lookup and the
    /// `RESOURCE_SCALING` special case.
    pub action_type: &'a str,
    /// DATA category inputs.
    pub data: DataImpactInput,
    /// PIPELINE category inputs.
    pub pipeline: PipelineImpactInput,
    /// BUSINESS category inputs.
    pub business: BusinessImpactInput,
    /// RESOURCE category inputs.
    pub resource: ResourceImpactInput,
}

/// Computes [`ImpactAnalysis`]es per spec §4.7's formulas.
#[derive(Debug, Clone, Default)]
pub struct ImpactAnalyzer {
    weights: ImpactWeights,
    base_impact: ActionBaseImpact,
    add_table: AddTable,
}

/// Moderate default returned on an internal computation failure, per spec
/// §4.7: "returns a moderate (0.5) default across the board."
const MODERATE_DEFAULT: f64 = 0.5;

impl ImpactAnalyzer {
    /// Builds an analyzer with explicit weights, per-action-type base
    /// impact scores, and add-on table.
    #[must_use]
    pub fn new(weights: ImpactWeights, base_impact: ActionBaseImpact, add_table: AddTable) -> Self {
        Self { weights, base_impact, add_table }
    }

    /// Computes the four category scores and the weighted overall for
    /// `input`, all clamped to `[0,1]`.
    #[must_use]
    pub fn analyze(&self, input: &ImpactInput<'_>) -> ImpactAnalysis {
        let data = clamp01(self.data_impact(input.action_type, input.data));
        let pipeline = clamp01(self.pipeline_impact(input.action_type, input.pipeline));
        let business = clamp01(self.business_impact(input.business));
        let resource = clamp01(self.resource_impact(input.action_type, input.resource));

        let overall = clamp01(
            self.weights.data * data
                + self.weights.pipeline * pipeline
                + self.weights.business * business
                + self.weights.resource * resource,
        );

        ImpactAnalysis {
            data,
            pipeline,
            business,
            resource,
            overall,
            level: ImpactLevel::from_overall(overall),
        }
    }

    /// `DATA = base(action_type) + min(1, volume/1e6)·0.2 + criticality_add + visibility_add`.
    fn data_impact(&self, action_type: &str, input: DataImpactInput) -> f64 {
        self.base_impact.get(action_type)
            + (input.volume / 1_000_000.0).min(1.0) * 0.2
            + self.add_table.value(input.criticality)
            + self.add_table.value(input.visibility)
    }

    /// `PIPELINE = base(action_type) + execution_time_add + min(0.2, dep_count/20) + pipeline_criticality_add`.
    fn pipeline_impact(&self, action_type: &str, input: PipelineImpactInput) -> f64 {
        self.base_impact.get(action_type)
            + self.add_table.value(input.execution_time)
            + (f64::from(input.dep_count) / 20.0).min(0.2)
            + self.add_table.value(input.pipeline_criticality)
    }

    /// `RESOURCE = base(action_type) + compute_add + storage_add + cost_add`,
    /// plus `0.2` when `action_type == "resource_scaling"` and `scale_factor > 2`.
    fn resource_impact(&self, action_type: &str, input: ResourceImpactInput) -> f64 {
        let mut score = self.base_impact.get(action_type)
            + self.add_table.value(input.compute)
            + self.add_table.value(input.storage)
            + self.add_table.value(input.cost);
        if action_type.eq_ignore_ascii_case("resource_scaling") && input.scale_factor > 2.0 {
            score += 0.2;
        }
        score
    }

    /// `BUSINESS = criticality_base + (0.2 if approaching_sla) + visibility_add + (0.1 if affects_reporting)`.
    fn business_impact(&self, input: BusinessImpactInput) -> f64 {
        let mut score = input.criticality_base;
        if input.approaching_sla {
            score += 0.2;
        }
        score += self.add_table.value(input.visibility);
        if input.affects_reporting {
            score += 0.1;
        }
        score
    }

    /// The fallback [`ImpactAnalysis`] for a caller whose own computation
    /// failed, per spec §4.7's "never propagates an exception" rule.
    #[must_use]
    pub fn moderate_default() -> ImpactAnalysis {
        ImpactAnalysis {
            data: MODERATE_DEFAULT,
            pipeline: MODERATE_DEFAULT,
            business: MODERATE_DEFAULT,
            resource: MODERATE_DEFAULT,
            overall: MODERATE_DEFAULT,
            level: ImpactLevel::from_overall(MODERATE_DEFAULT),
        }
    }
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> ImpactAnalyzer {
        let mut base_impact = ActionBaseImpact::default();
        base_impact.set("restart_service", 0.1);
        base_impact.set("resource_scaling", 0.1);
        ImpactAnalyzer::new(ImpactWeights::default(), base_impact, AddTable::default())
    }

    fn zero_input<'a>(action_type: &'a str) -> ImpactInput<'a> {
        ImpactInput {
            action_type,
            data: DataImpactInput {
                volume: 0.0,
                criticality: AddLevel::Low,
                visibility: AddLevel::Low,
            },
            pipeline: PipelineImpactInput {
                execution_time: AddLevel::Low,
                dep_count: 0,
                pipeline_criticality: AddLevel::Low,
            },
            business: BusinessImpactInput {
                criticality_base: 0.0,
                approaching_sla: false,
                visibility: AddLevel::Low,
                affects_reporting: false,
            },
            resource: ResourceImpactInput {
                compute: AddLevel::Low,
                storage: AddLevel::Low,
                cost: AddLevel::Low,
                scale_factor: 1.0,
            },
        }
    }

    #[test]
    fn data_formula_adds_volume_and_level_terms() {
        let analyzer = analyzer();
        let mut input = zero_input("restart_service");
        input.data = DataImpactInput {
            volume: 500_000.0,
            criticality: AddLevel::High,
            visibility: AddLevel::Medium,
        };
        let analysis = analyzer.analyze(&input);
        assert!((analysis.data - (0.1 + 0.1 + 0.2 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn resource_scaling_over_threshold_adds_bonus() {
        let analyzer = analyzer();
        let mut input = zero_input("resource_scaling");
        input.resource.scale_factor = 3.0;
        let analysis = analyzer.analyze(&input);
        assert!((analysis.resource - (0.1 + 0.2)).abs() < 1e-9);
    }

    #[test]
    fn overall_buckets_into_impact_level() {
        let analyzer = analyzer();
        let input = zero_input("restart_service");
        let analysis = analyzer.analyze(&input);
        assert_eq!(analysis.level, ImpactLevel::from_overall(analysis.overall));
    }

    #[test]
    fn moderate_default_is_medium_across_the_board() {
        let fallback = ImpactAnalyzer::moderate_default();
        assert_eq!(fallback.overall, 0.5);
        assert_eq!(fallback.level, ImpactLevel::Medium);
    }
}
