//! Quota and ROI forecasting
//!
//! Three delivery scenarios are priced from the optimized effort. The
//! recommended scenario is the best ROI among those within the caller's
//! constraints, or the cheapest one if none fit.

use crate::collaborators::QuotaForecaster;
use crate::error::StageError;
use crate::model::{OptimizationResult, RoiAnalysis, RoiScenario};
use crate::types::{CostConstraints, IntentOptions};
use async_trait::async_trait;

struct ScenarioTemplate {
    name: &'static str,
    approach: &'static str,
    hours_factor: f64,
    vibes_per_op: f64,
    specs_per_op: f64,
}

const SCENARIOS: [ScenarioTemplate; 3] = [
    ScenarioTemplate {
        name: "conservative",
        approach: "Traditional delivery without AI assistance",
        hours_factor: 1.0,
        vibes_per_op: 0.0,
        specs_per_op: 0.0,
    },
    ScenarioTemplate {
        name: "balanced",
        approach: "Spec-driven delivery with AI-assisted implementation",
        hours_factor: 0.6,
        vibes_per_op: 2.0,
        specs_per_op: 1.0,
    },
    ScenarioTemplate {
        name: "accelerated",
        approach: "Vibe-heavy rapid prototyping followed by hardening",
        hours_factor: 0.4,
        vibes_per_op: 6.0,
        specs_per_op: 0.5,
    },
];

/// Value multiplier ceiling for very large user bases
const MAX_VOLUME_MULTIPLIER: f64 = 3.0;

/// Prices delivery scenarios from effort points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiForecaster {
    /// Dollars per engineering hour
    pub hourly_rate: f64,
    /// Engineering hours per effort point
    pub hours_per_point: f64,
    /// Expected first-year return as a multiple of baseline cost
    pub return_multiple: f64,
}

impl Default for RoiForecaster {
    fn default() -> Self {
        Self {
            hourly_rate: 120.0,
            hours_per_point: 6.0,
            return_multiple: 2.5,
        }
    }
}

impl RoiForecaster {
    /// Forecast synchronously
    ///
    /// # Errors
    /// `StageError::Validation` if there are no operations to price
    pub fn project(
        &self,
        optimization: &OptimizationResult,
        options: &IntentOptions,
    ) -> Result<RoiAnalysis, StageError> {
        if optimization.optimized_operations.is_empty() {
            return Err(StageError::Validation(
                "optimization result has no operations to price".into(),
            ));
        }

        #[allow(clippy::cast_precision_loss)]
        let op_count = optimization.optimized_operations.len() as f64;
        let baseline_hours = f64::from(optimization.total_effort()) * self.hours_per_point;

        #[allow(clippy::cast_precision_loss)]
        let volume_multiplier = options
            .expected_user_volume
            .map_or(1.0, |v| (1.0 + v as f64 / 10_000.0).min(MAX_VOLUME_MULTIPLIER));
        let expected_return = baseline_hours * self.hourly_rate * self.return_multiple * volume_multiplier;
        let constraints = options.cost_constraints.clone().unwrap_or_default();

        let scenarios: Vec<RoiScenario> = SCENARIOS
            .iter()
            .map(|template| {
                let hours = baseline_hours * template.hours_factor;
                let cost = hours * self.hourly_rate;
                let (roi_percent, payback_months) = if cost > 0.0 && expected_return > 0.0 {
                    (
                        (expected_return - cost) / cost * 100.0,
                        cost / (expected_return / 12.0),
                    )
                } else {
                    (0.0, 0.0)
                };
                let vibes = count(op_count * template.vibes_per_op);
                let specs = count(op_count * template.specs_per_op);

                RoiScenario {
                    name: template.name.to_string(),
                    approach: template.approach.to_string(),
                    estimated_hours: hours,
                    estimated_cost_dollars: cost,
                    expected_return_dollars: expected_return,
                    roi_percent,
                    payback_months,
                    vibes,
                    specs,
                    within_budget: fits(&constraints, cost, vibes, specs),
                }
            })
            .collect();

        let recommended = scenarios
            .iter()
            .filter(|s| s.within_budget)
            .max_by(|a, b| a.roi_percent.total_cmp(&b.roi_percent))
            .or_else(|| {
                scenarios
                    .iter()
                    .min_by(|a, b| a.estimated_cost_dollars.total_cmp(&b.estimated_cost_dollars))
            })
            .map(|s| s.name.clone())
            .unwrap_or_default();

        Ok(RoiAnalysis {
            scenarios,
            recommended,
        })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(value: f64) -> u32 {
    value.ceil().max(0.0) as u32
}

fn fits(constraints: &CostConstraints, cost: f64, vibes: u32, specs: u32) -> bool {
    constraints.max_cost_dollars.map_or(true, |max| cost <= max)
        && constraints.max_vibes.map_or(true, |max| vibes <= max)
        && constraints.max_specs.map_or(true, |max| specs <= max)
}

#[async_trait]
impl QuotaForecaster for RoiForecaster {
    async fn forecast(
        &self,
        optimization: &OptimizationResult,
        options: &IntentOptions,
    ) -> Result<RoiAnalysis, StageError> {
        self.project(optimization, options)
    }
}
