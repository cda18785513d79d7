//! Markdown PM documents

use super::bullets;
use crate::collaborators::{DocumentContext, DocumentGenerator};
use crate::error::StageError;
use crate::model::GeneratedDocument;
use crate::types::DocumentKind;
use async_trait::async_trait;
use chrono::Utc;
use std::fmt::Write as _;

/// Renders each document kind from a fixed markdown outline
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownDocumentGenerator;

impl MarkdownDocumentGenerator {
    /// Render synchronously
    #[must_use]
    pub fn render(kind: DocumentKind, context: &DocumentContext<'_>) -> GeneratedDocument {
        let intent = context.intent;
        let mut body = format!("# {}: {}\n\n", kind.title(), intent.business_goal);
        if let Some(date) = context.target_date {
            let _ = writeln!(body, "Target date: {date}\n");
        }

        let operation_names: Vec<String> =
            intent.operations.iter().map(|op| op.name.clone()).collect();

        match kind {
            DocumentKind::ManagementOnePager => {
                body.push_str("## Problem\n\n");
                let _ = writeln!(body, "{}\n", intent.business_goal);
                body.push_str("## Proposal\n\n");
                body.push_str(&bullets(&operation_names));
                if let Some(roi) = context.roi.and_then(|r| r.recommended_scenario()) {
                    let _ = write!(
                        body,
                        "\n## Investment\n\n{} for ${:.0}, {:.0}% ROI, payback {:.1} months\n",
                        roi.approach, roi.estimated_cost_dollars, roi.roi_percent, roi.payback_months
                    );
                }
                if let Some(summary) = context.summary {
                    body.push_str("\n## Recommendation\n\n");
                    body.push_str(&bullets(&summary.recommendations));
                }
            }
            DocumentKind::PrFaq => {
                let _ = writeln!(
                    body,
                    "## Press release\n\nToday we announce {}. {} can now rely on {}.\n",
                    intent.business_goal.to_lowercase(),
                    intent.stakeholders.join(", "),
                    operation_names.join(", ").to_lowercase()
                );
                body.push_str("## FAQ\n\n");
                body.push_str("**Who is this for?**\n\n");
                body.push_str(&bullets(&intent.stakeholders));
                body.push_str("\n**What is included?**\n\n");
                body.push_str(&bullets(&operation_names));
            }
            DocumentKind::Requirements => {
                body.push_str("## Requirements\n\n");
                match context.analysis {
                    Some(analysis) => {
                        for req in &analysis.requirements {
                            let _ = writeln!(body, "- **{}** ({:?}): {}", req.id, req.priority, req.statement);
                        }
                    }
                    None => body.push_str(&bullets(
                        &intent
                            .operations
                            .iter()
                            .map(|op| format!("{}: {}", op.name, op.description))
                            .collect::<Vec<_>>(),
                    )),
                }
            }
            DocumentKind::DesignOptions => {
                body.push_str("## Options\n\n");
                match context.roi {
                    Some(roi) => {
                        for scenario in &roi.scenarios {
                            let _ = writeln!(
                                body,
                                "### {}\n\n{}; {:.0} hours, ${:.0}{}\n",
                                scenario.name,
                                scenario.approach,
                                scenario.estimated_hours,
                                scenario.estimated_cost_dollars,
                                if scenario.within_budget { "" } else { " (over budget)" }
                            );
                        }
                        let _ = writeln!(body, "Recommended: {}", roi.recommended);
                    }
                    None => {
                        body.push_str("### Build in-house\n\nFull control, highest effort\n\n");
                        body.push_str("### Buy and integrate\n\nFastest, least flexible\n");
                    }
                }
            }
            DocumentKind::TaskPlan => {
                body.push_str("## Tasks\n\n");
                match context.specification {
                    Some(spec) => {
                        for task in &spec.tasks {
                            let _ = writeln!(
                                body,
                                "- [ ] {} {} ({})",
                                task.id,
                                task.title,
                                task.requirement_refs.join(", ")
                            );
                        }
                    }
                    None => {
                        for (i, op) in intent.operations.iter().enumerate() {
                            let _ = writeln!(body, "- [ ] {} Implement {}", i + 1, op.name);
                        }
                    }
                }
            }
            DocumentKind::CompetitiveAnalysis => {
                body.push_str("## Landscape\n\n");
                body.push_str(
                    "| Capability | Us | Typical competitor |\n|---|---|---|\n",
                );
                for name in &operation_names {
                    let _ = writeln!(body, "| {name} | planned | available |");
                }
                body.push_str("\n## Differentiators\n\n");
                body.push_str(&bullets(&intent.keywords));
            }
        }

        GeneratedDocument {
            kind,
            title: format!("{} - {}", kind.title(), intent.business_goal),
            content: body,
            generated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl DocumentGenerator for MarkdownDocumentGenerator {
    async fn generate(
        &self,
        kind: DocumentKind,
        context: &DocumentContext<'_>,
    ) -> Result<GeneratedDocument, StageError> {
        Ok(Self::render(kind, context))
    }
}
