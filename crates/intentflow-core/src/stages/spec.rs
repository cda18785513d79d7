//! Specification generation

use super::{bullets, kebab_case};
use crate::collaborators::SpecGenerator;
use crate::error::StageError;
use crate::model::{
    BusinessAnalysis, ConsultingSummary, DesignSection, ParsedIntent, SpecDocument, SpecTask,
};
use async_trait::async_trait;

/// Builds requirements, design and tasks from the analysis
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSpecGenerator;

impl TemplateSpecGenerator {
    /// Generate synchronously
    #[must_use]
    pub fn build(
        intent: &ParsedIntent,
        analysis: &BusinessAnalysis,
        summary: &ConsultingSummary,
    ) -> SpecDocument {
        let design = vec![
            DesignSection {
                title: "Overview".to_string(),
                body: format!(
                    "{}\n\nStakeholders:\n{}",
                    intent.business_goal,
                    bullets(&analysis.stakeholders)
                ),
            },
            DesignSection {
                title: "Components".to_string(),
                body: bullets(
                    &intent
                        .operations
                        .iter()
                        .map(|op| format!("**{}** ({}): {}", op.name, op.category, op.description))
                        .collect::<Vec<_>>(),
                ),
            },
            DesignSection {
                title: "Delivery approach".to_string(),
                body: format!(
                    "{}\n\n{}",
                    analysis.recommended_approach,
                    bullets(&summary.recommendations)
                ),
            },
            DesignSection {
                title: "Success metrics".to_string(),
                body: bullets(&analysis.success_metrics),
            },
        ];

        let mut tasks: Vec<SpecTask> = analysis
            .requirements
            .iter()
            .enumerate()
            .map(|(i, req)| {
                let name = intent
                    .operations
                    .iter()
                    .find(|op| op.id == req.operation_id)
                    .map_or(req.id.as_str(), |op| op.name.as_str());
                SpecTask {
                    id: format!("1.{}", i + 1),
                    title: format!("Implement {name}"),
                    requirement_refs: vec![req.id.clone()],
                }
            })
            .collect();
        tasks.push(SpecTask {
            id: "2.1".to_string(),
            title: "Verify the delivered capabilities against the success metrics".to_string(),
            requirement_refs: analysis.requirements.iter().map(|r| r.id.clone()).collect(),
        });

        SpecDocument {
            feature_name: kebab_case(&intent.business_goal, 5),
            requirements: analysis.requirements.clone(),
            design,
            tasks,
        }
    }
}

#[async_trait]
impl SpecGenerator for TemplateSpecGenerator {
    async fn generate(
        &self,
        intent: &ParsedIntent,
        analysis: &BusinessAnalysis,
        summary: &ConsultingSummary,
    ) -> Result<SpecDocument, StageError> {
        Ok(Self::build(intent, analysis, summary))
    }
}
