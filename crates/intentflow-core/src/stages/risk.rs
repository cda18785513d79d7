//! Keyword-driven risk assessment

use crate::collaborators::RiskAssessor;
use crate::error::StageError;
use crate::model::{Complexity, ParsedIntent, RiskAssessment, RiskFactor, RiskLevel};
use crate::types::{IntentOptions, PerformanceSensitivity};
use async_trait::async_trait;

/// User volume above which scalability is flagged
const HIGH_VOLUME: u64 = 100_000;

/// Flags risks from the capabilities and options involved
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordRiskAssessor;

impl KeywordRiskAssessor {
    /// Assess synchronously
    #[must_use]
    pub fn evaluate(intent: &ParsedIntent, options: &IntentOptions) -> RiskAssessment {
        let has = |id: &str| intent.operations.iter().any(|op| op.id == id);
        let mut risks = Vec::new();

        if has("op-payments") {
            risks.push(risk(
                "compliance",
                "Handling card data brings PCI-DSS obligations",
                RiskLevel::High,
                "Use a hosted payment provider so card data never touches our systems",
            ));
        }
        if has("op-auth") {
            risks.push(risk(
                "security",
                "Credential handling is a common breach vector",
                RiskLevel::High,
                "Delegate to an identity provider and require MFA for administrators",
            ));
        }
        if has("op-migration") {
            risks.push(risk(
                "data",
                "Legacy data may be incomplete or inconsistent",
                RiskLevel::Medium,
                "Run a dry-run migration with reconciliation reports before cut-over",
            ));
        }
        if intent.expected_user_volume.unwrap_or(0) > HIGH_VOLUME {
            risks.push(risk(
                "scalability",
                "Expected volume exceeds what a single instance comfortably serves",
                RiskLevel::High,
                "Load-test early and plan horizontal scaling",
            ));
        }
        if options.sensitivity() == PerformanceSensitivity::High {
            risks.push(risk(
                "performance",
                "Latency-critical experience leaves little room for slow dependencies",
                RiskLevel::Medium,
                "Set latency budgets per dependency and monitor p95",
            ));
        }
        if intent.complexity == Complexity::High {
            risks.push(risk(
                "delivery",
                "Broad scope raises schedule risk",
                RiskLevel::Medium,
                "Phase the delivery and ship the highest-priority capability first",
            ));
        }

        let overall = risks.iter().map(|r| r.level).max().unwrap_or_default();
        RiskAssessment { risks, overall }
    }
}

fn risk(category: &str, description: &str, level: RiskLevel, mitigation: &str) -> RiskFactor {
    RiskFactor {
        category: category.to_string(),
        description: description.to_string(),
        level,
        mitigation: mitigation.to_string(),
    }
}

#[async_trait]
impl RiskAssessor for KeywordRiskAssessor {
    async fn assess(
        &self,
        intent: &ParsedIntent,
        options: &IntentOptions,
    ) -> Result<RiskAssessment, StageError> {
        Ok(Self::evaluate(intent, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::KeywordInterpreter;

    #[test]
    fn payments_and_volume_are_high_risk() {
        let options = IntentOptions::new().with_user_volume(500_000);
        let intent = KeywordInterpreter::parse("Accept payments from shoppers", &options).unwrap();

        let assessment = KeywordRiskAssessor::evaluate(&intent, &options);
        let categories: Vec<&str> = assessment.risks.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["compliance", "scalability"]);
        assert_eq!(assessment.overall, RiskLevel::High);
    }

    #[test]
    fn quiet_intent_has_no_risks() {
        let options = IntentOptions::default();
        let intent = KeywordInterpreter::parse("Improve the planning ritual", &options).unwrap();

        let assessment = KeywordRiskAssessor::evaluate(&intent, &options);
        assert!(assessment.risks.is_empty());
        assert_eq!(assessment.overall, RiskLevel::Low);
    }
}
