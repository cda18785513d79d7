//! Intent completeness checks

use crate::collaborators::IntentValidator;
use crate::error::StageError;
use crate::model::{IntentValidation, ParsedIntent};
use async_trait::async_trait;

/// Scores a parsed intent against a fixed checklist
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletenessValidator;

impl CompletenessValidator {
    /// Run the checklist
    #[must_use]
    pub fn check(intent: &ParsedIntent) -> IntentValidation {
        let checks: [(bool, &str); 4] = [
            (
                intent.business_goal.split_whitespace().count() >= 5,
                "Business goal is very short; state who benefits and what outcome is expected",
            ),
            (
                intent.operations.iter().any(|op| op.id != "op-core"),
                "No concrete capabilities recognised; name the features involved",
            ),
            (
                intent.stakeholders.len() > 1,
                "No stakeholders mentioned besides the product owner",
            ),
            (
                intent.expected_user_volume.is_some(),
                "Expected user volume not provided; ROI estimates use a baseline",
            ),
        ];

        let passed = checks.iter().filter(|(ok, _)| *ok).count();
        let warnings: Vec<String> = checks
            .iter()
            .filter(|(ok, _)| !*ok)
            .map(|(_, warning)| (*warning).to_string())
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let completeness_score = passed as f64 / checks.len() as f64;

        IntentValidation {
            is_complete: warnings.is_empty(),
            completeness_score,
            warnings,
        }
    }
}

#[async_trait]
impl IntentValidator for CompletenessValidator {
    async fn validate(&self, intent: &ParsedIntent) -> Result<IntentValidation, StageError> {
        Ok(Self::check(intent))
    }
}
