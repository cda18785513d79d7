//! Consulting summary templates

use crate::collaborators::SummaryGenerator;
use crate::error::StageError;
use crate::model::{BusinessAnalysis, ConsultingSummary, OptimizationResult, RoiAnalysis};
use async_trait::async_trait;

/// Fills a fixed summary template from upstream outputs
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSummarizer;

impl TemplateSummarizer {
    /// Summarize synchronously
    #[must_use]
    pub fn compose(
        analysis: Option<&BusinessAnalysis>,
        optimization: &OptimizationResult,
        roi: &RoiAnalysis,
    ) -> ConsultingSummary {
        let recommended = roi.recommended_scenario();
        let op_count = optimization.optimized_operations.len();

        let executive_summary = match recommended {
            Some(scenario) => format!(
                "{op_count} workstream(s) after optimization ({:.0}% effort saved). \
                 Recommended approach: {} at an estimated ${:.0}, \
                 {:.0}% first-year ROI with payback in {:.1} months.",
                optimization.efficiency_gain_percent,
                scenario.approach,
                scenario.estimated_cost_dollars,
                scenario.roi_percent,
                scenario.payback_months,
            ),
            None => format!(
                "{op_count} workstream(s) after optimization ({:.0}% effort saved). \
                 No delivery scenario could be priced.",
                optimization.efficiency_gain_percent,
            ),
        };

        let mut key_findings = vec![format!(
            "Scope reduced from {} to {} operations",
            optimization.original_operation_count, op_count
        )];
        if let Some(analysis) = analysis {
            key_findings.push(format!(
                "{} requirements identified, complexity {}/10",
                analysis.requirements.len(),
                analysis.complexity_score
            ));
        }
        let over_budget = roi.scenarios.iter().filter(|s| !s.within_budget).count();
        if over_budget > 0 {
            key_findings.push(format!(
                "{over_budget} of {} scenarios exceed the cost constraints",
                roi.scenarios.len()
            ));
        }

        let mut recommendations = Vec::new();
        if let Some(scenario) = recommended {
            recommendations.push(format!("Proceed with the {} scenario", scenario.name));
        }
        if let Some(analysis) = analysis {
            recommendations.push(analysis.recommended_approach.clone());
        }
        if optimization.optimizations.iter().any(|o| o.kind == "merge") {
            recommendations.push("Staff merged workstreams with a single owner".to_string());
        }

        let next_steps = optimization
            .optimized_operations
            .iter()
            .take(3)
            .map(|op| format!("Kick off: {}", op.name))
            .chain(std::iter::once(
                "Review the specification with stakeholders".to_string(),
            ))
            .collect();

        ConsultingSummary {
            executive_summary,
            key_findings,
            recommendations,
            next_steps,
        }
    }
}

#[async_trait]
impl SummaryGenerator for TemplateSummarizer {
    async fn summarize(
        &self,
        analysis: Option<&BusinessAnalysis>,
        optimization: &OptimizationResult,
        roi: &RoiAnalysis,
    ) -> Result<ConsultingSummary, StageError> {
        Ok(Self::compose(analysis, optimization, roi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{CategoryOptimizer, KeywordInterpreter, RequirementsAnalyzer, RoiForecaster};
    use crate::types::IntentOptions;

    #[test]
    fn summary_reflects_inputs() {
        let options = IntentOptions::default();
        let intent =
            KeywordInterpreter::parse("Add search and an API for partners", &options).unwrap();
        let analysis = RequirementsAnalyzer::derive(&intent).unwrap();
        let optimization = CategoryOptimizer::plan(&intent.operations, Some(&analysis)).unwrap();
        let roi = RoiForecaster::default().project(&optimization, &options).unwrap();

        let summary = TemplateSummarizer::compose(Some(&analysis), &optimization, &roi);
        assert!(summary.executive_summary.contains("workstream"));
        assert_eq!(summary.key_findings.len(), 2);
        assert!(summary.recommendations.iter().any(|r| r.contains("merged")));
        assert_eq!(summary.next_steps.last().unwrap(), "Review the specification with stakeholders");
    }

    #[test]
    fn works_without_analysis() {
        let options = IntentOptions::default();
        let intent = KeywordInterpreter::parse("Add login", &options).unwrap();
        let optimization = CategoryOptimizer::plan(&intent.operations, None).unwrap();
        let roi = RoiForecaster::default().project(&optimization, &options).unwrap();

        let summary = TemplateSummarizer::compose(None, &optimization, &roi);
        assert_eq!(summary.key_findings.len(), 1);
        assert_eq!(summary.next_steps.len(), 2);
    }
}
