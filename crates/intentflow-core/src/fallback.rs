//! Substitute values for stages that failed recoverably
//!
//! Every fallback is deterministic and deliberately thin, so a degraded
//! result is obvious to a reader and never mistaken for real analysis.
//! Fallback values are never written to the cache.

use crate::model::{
    AnalysisOperation, BusinessAnalysis, Complexity, ConsultingSummary, DesignSection,
    GeneratedDocument, OptimizationResult, ParsedIntent, Priority, Requirement, RoiAnalysis,
    RoiScenario, SpecDocument, SpecTask,
};
use crate::stages::{bullets, first_sentence, kebab_case};
use crate::types::{DocumentKind, IntentOptions};
use chrono::Utc;

const UNAVAILABLE: &str = "Automated analysis was unavailable; review manually";

/// Hours per effort point assumed by the fallback estimate
const FALLBACK_HOURS_PER_POINT: f64 = 8.0;

/// Rate assumed by the fallback estimate
const FALLBACK_HOURLY_RATE: f64 = 150.0;

fn default_operation() -> AnalysisOperation {
    AnalysisOperation::new("op-default", "General delivery", "general", 5)
        .with_description("Scope and deliver the requested capability")
        .with_priority(Priority::High)
}

/// Single generic operation derived from the raw text
#[must_use]
pub fn parsed_intent(raw: &str, options: &IntentOptions) -> ParsedIntent {
    ParsedIntent {
        business_goal: first_sentence(raw, 160),
        operations: vec![default_operation()],
        keywords: Vec::new(),
        stakeholders: vec!["Product owner".to_string()],
        complexity: Complexity::Medium,
        expected_user_volume: options.expected_user_volume,
        sensitivity: options.sensitivity(),
    }
}

/// One requirement per operation, no metrics
#[must_use]
pub fn analysis(intent: &ParsedIntent) -> BusinessAnalysis {
    BusinessAnalysis {
        requirements: intent
            .operations
            .iter()
            .enumerate()
            .map(|(i, op)| Requirement {
                id: format!("REQ-{}", i + 1),
                statement: format!("THE SYSTEM SHALL provide {}", op.name.to_lowercase()),
                priority: op.priority,
                operation_id: op.id.clone(),
            })
            .collect(),
        stakeholders: intent.stakeholders.clone(),
        success_metrics: Vec::new(),
        complexity_score: 5,
        recommended_approach: UNAVAILABLE.to_string(),
    }
}

/// Operations unchanged
#[must_use]
pub fn optimization(operations: &[AnalysisOperation]) -> OptimizationResult {
    let optimized_operations = if operations.is_empty() {
        vec![default_operation()]
    } else {
        operations.to_vec()
    };
    OptimizationResult {
        original_operation_count: operations.len(),
        optimized_operations,
        optimizations: Vec::new(),
        efficiency_gain_percent: 0.0,
    }
}

/// Single pessimistic scenario with no claimed return
#[must_use]
pub fn roi(optimization: &OptimizationResult) -> RoiAnalysis {
    let hours = f64::from(optimization.total_effort()) * FALLBACK_HOURS_PER_POINT;
    let scenario = RoiScenario {
        name: "manual-estimate".to_string(),
        approach: UNAVAILABLE.to_string(),
        estimated_hours: hours,
        estimated_cost_dollars: hours * FALLBACK_HOURLY_RATE,
        expected_return_dollars: 0.0,
        roi_percent: 0.0,
        payback_months: 0.0,
        vibes: 0,
        specs: 0,
        within_budget: true,
    };
    RoiAnalysis {
        recommended: scenario.name.clone(),
        scenarios: vec![scenario],
    }
}

/// Summary that only restates counts
#[must_use]
pub fn summary(optimization: &OptimizationResult) -> ConsultingSummary {
    ConsultingSummary {
        executive_summary: format!(
            "{} operation(s) identified. {UNAVAILABLE}.",
            optimization.optimized_operations.len()
        ),
        key_findings: Vec::new(),
        recommendations: vec![UNAVAILABLE.to_string()],
        next_steps: vec!["Re-run the analysis once the service recovers".to_string()],
    }
}

/// Requirements only, one catch-all task
#[must_use]
pub fn specification(intent: &ParsedIntent, analysis: &BusinessAnalysis) -> SpecDocument {
    SpecDocument {
        feature_name: kebab_case(&intent.business_goal, 5),
        requirements: analysis.requirements.clone(),
        design: vec![DesignSection {
            title: "Overview".to_string(),
            body: intent.business_goal.clone(),
        }],
        tasks: vec![SpecTask {
            id: "1.1".to_string(),
            title: "Draft design and task breakdown manually".to_string(),
            requirement_refs: analysis.requirements.iter().map(|r| r.id.clone()).collect(),
        }],
    }
}

/// Outline document listing the goal and operations
#[must_use]
pub fn document(kind: DocumentKind, intent: &ParsedIntent) -> GeneratedDocument {
    let names: Vec<&str> = intent.operations.iter().map(|op| op.name.as_str()).collect();
    GeneratedDocument {
        kind,
        title: format!("{} (outline)", kind.title()),
        content: format!(
            "# {}: {}\n\n{UNAVAILABLE}.\n\n## Scope\n\n{}",
            kind.title(),
            intent.business_goal,
            bullets(&names)
        ),
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_chain_is_well_formed() {
        let options = IntentOptions::default();
        let intent = parsed_intent("Something vague. More words.", &options);
        assert_eq!(intent.business_goal, "Something vague");
        assert_eq!(intent.operations.len(), 1);

        let analysis = analysis(&intent);
        assert_eq!(analysis.requirements.len(), 1);

        let optimization = optimization(&intent.operations);
        assert_eq!(optimization.optimized_operations, intent.operations);

        let roi = roi(&optimization);
        assert_eq!(roi.recommended_scenario().unwrap().roi_percent, 0.0);

        let summary = summary(&optimization);
        assert!(summary.executive_summary.contains("unavailable"));

        let spec = specification(&intent, &analysis);
        assert_eq!(spec.tasks[0].requirement_refs, vec!["REQ-1"]);
    }

    #[test]
    fn outline_document_lists_operations() {
        let intent = parsed_intent("Build a thing", &IntentOptions::default());
        let doc = document(DocumentKind::TaskPlan, &intent);
        assert_eq!(doc.kind, DocumentKind::TaskPlan);
        assert!(doc.content.contains("- General delivery"));
    }

    #[test]
    fn deterministic() {
        let options = IntentOptions::default();
        assert_eq!(
            parsed_intent("Build a thing", &options),
            parsed_intent("Build a thing", &options)
        );
    }

    #[test]
    fn empty_operations_still_yield_one() {
        assert_eq!(optimization(&[]).optimized_operations.len(), 1);
    }
}
