//! Requirements analysis

use crate::collaborators::BusinessAnalyzer;
use crate::error::StageError;
use crate::model::{BusinessAnalysis, Complexity, ParsedIntent, Requirement};
use async_trait::async_trait;

/// Turns each operation into an EARS-style requirement
#[derive(Debug, Clone, Copy, Default)]
pub struct RequirementsAnalyzer;

impl RequirementsAnalyzer {
    /// Analyze synchronously
    ///
    /// # Errors
    /// `StageError::Validation` if the intent has no operations
    pub fn derive(intent: &ParsedIntent) -> Result<BusinessAnalysis, StageError> {
        if intent.operations.is_empty() {
            return Err(StageError::Validation(
                "parsed intent has no operations to analyze".into(),
            ));
        }

        let requirements: Vec<Requirement> = intent
            .operations
            .iter()
            .enumerate()
            .map(|(i, op)| Requirement {
                id: format!("REQ-{}", i + 1),
                statement: format!(
                    "WHEN a user needs {} THE SYSTEM SHALL {}",
                    op.name.to_lowercase(),
                    op.description.to_lowercase()
                ),
                priority: op.priority,
                operation_id: op.id.clone(),
            })
            .collect();

        let mut success_metrics = Vec::new();
        for op in &intent.operations {
            let metric = match op.category.as_str() {
                "frontend" => "Task completion rate above 90% in usability tests",
                "integration" => "Integration error rate below 0.5% of requests",
                "security" => "Zero critical findings in the pre-launch security review",
                "analytics" => "Weekly active usage of reports by target stakeholders",
                "data" => "100% of migrated records reconciled against the source",
                "backend" => "p95 API latency below 300ms at expected volume",
                _ => "Stakeholder sign-off on the delivered capability",
            };
            if !success_metrics.iter().any(|m: &String| m == metric) {
                success_metrics.push(metric.to_string());
            }
        }

        let total_effort = intent
            .operations
            .iter()
            .map(|op| op.effort_points)
            .fold(0, u32::saturating_add);
        let op_count = u32::try_from(intent.operations.len()).unwrap_or(u32::MAX);
        let complexity_score = (total_effort / 3).saturating_add(op_count).clamp(1, 10);

        let recommended_approach = match intent.complexity {
            Complexity::Low => "Single iterative delivery with weekly demos",
            Complexity::Medium => "Phased delivery in two increments, highest priority first",
            Complexity::High => "Discovery spike followed by phased delivery per capability",
        }
        .to_string();

        Ok(BusinessAnalysis {
            requirements,
            stakeholders: intent.stakeholders.clone(),
            success_metrics,
            complexity_score,
            recommended_approach,
        })
    }
}

#[async_trait]
impl BusinessAnalyzer for RequirementsAnalyzer {
    async fn analyze(&self, intent: &ParsedIntent) -> Result<BusinessAnalysis, StageError> {
        Self::derive(intent)
    }
}
