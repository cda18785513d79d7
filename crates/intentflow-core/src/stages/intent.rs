//! Keyword-driven intent interpretation

use super::{first_sentence, significant_words};
use crate::collaborators::IntentInterpreter;
use crate::error::StageError;
use crate::model::{AnalysisOperation, Complexity, ParsedIntent, Priority};
use crate::types::IntentOptions;
use async_trait::async_trait;

/// Known capability: any trigger word adds the operation once
struct Capability {
    triggers: &'static [&'static str],
    id: &'static str,
    name: &'static str,
    category: &'static str,
    effort: u32,
    priority: Priority,
}

const CAPABILITIES: &[Capability] = &[
    Capability {
        triggers: &["payment", "payments", "billing", "invoice", "subscription"],
        id: "op-payments",
        name: "Payment processing",
        category: "integration",
        effort: 8,
        priority: Priority::High,
    },
    Capability {
        triggers: &["checkout", "cart", "basket"],
        id: "op-checkout",
        name: "Checkout flow",
        category: "frontend",
        effort: 5,
        priority: Priority::High,
    },
    Capability {
        triggers: &["login", "auth", "authentication", "sso", "password", "account"],
        id: "op-auth",
        name: "Authentication",
        category: "security",
        effort: 5,
        priority: Priority::High,
    },
    Capability {
        triggers: &["report", "reports", "reporting", "dashboard", "dashboards"],
        id: "op-reporting",
        name: "Reporting dashboard",
        category: "analytics",
        effort: 5,
        priority: Priority::Medium,
    },
    Capability {
        triggers: &["analytics", "metrics", "tracking", "insights"],
        id: "op-analytics",
        name: "Usage analytics",
        category: "analytics",
        effort: 3,
        priority: Priority::Medium,
    },
    Capability {
        triggers: &["notification", "notifications", "email", "sms", "alerts"],
        id: "op-notifications",
        name: "Notifications",
        category: "integration",
        effort: 3,
        priority: Priority::Medium,
    },
    Capability {
        triggers: &["search", "filter", "discovery"],
        id: "op-search",
        name: "Search and discovery",
        category: "backend",
        effort: 5,
        priority: Priority::Medium,
    },
    Capability {
        triggers: &["api", "integration", "webhook", "webhooks"],
        id: "op-api",
        name: "Public API",
        category: "backend",
        effort: 5,
        priority: Priority::Medium,
    },
    Capability {
        triggers: &["inventory", "stock", "warehouse", "catalog"],
        id: "op-inventory",
        name: "Inventory management",
        category: "backend",
        effort: 5,
        priority: Priority::Medium,
    },
    Capability {
        triggers: &["mobile", "ios", "android", "app"],
        id: "op-mobile",
        name: "Mobile experience",
        category: "frontend",
        effort: 8,
        priority: Priority::Medium,
    },
    Capability {
        triggers: &["onboarding", "signup", "registration"],
        id: "op-onboarding",
        name: "User onboarding",
        category: "frontend",
        effort: 3,
        priority: Priority::Low,
    },
    Capability {
        triggers: &["migrate", "migration", "import", "legacy"],
        id: "op-migration",
        name: "Data migration",
        category: "data",
        effort: 8,
        priority: Priority::High,
    },
];

const STAKEHOLDERS: &[(&[&str], &str)] = &[
    (&["customer", "customers", "user", "users", "shopper", "shoppers"], "End users"),
    (&["merchant", "merchants", "seller", "sellers", "vendor", "vendors"], "Merchants"),
    (&["admin", "admins", "administrator", "operator", "operators"], "Administrators"),
    (&["support", "helpdesk"], "Support team"),
    (&["finance", "accounting", "billing"], "Finance"),
    (&["compliance", "legal", "audit", "gdpr"], "Legal and compliance"),
];

const MAX_KEYWORDS: usize = 12;
const LONG_BRIEF_WORDS: usize = 150;

/// Interpreter that maps trigger words to a fixed capability table
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordInterpreter;

impl KeywordInterpreter {
    /// Interpret synchronously
    ///
    /// # Errors
    /// `StageError::Parse` if the text contains no letters at all
    pub fn parse(raw: &str, options: &IntentOptions) -> Result<ParsedIntent, StageError> {
        if !raw.chars().any(char::is_alphabetic) {
            return Err(StageError::Parse(
                "intent contains no words to interpret".into(),
            ));
        }

        let words: Vec<String> = raw
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        let mentions = |triggers: &[&str]| words.iter().any(|w| triggers.contains(&w.as_str()));

        let business_goal = first_sentence(raw, 160);

        let mut operations: Vec<AnalysisOperation> = CAPABILITIES
            .iter()
            .filter(|cap| mentions(cap.triggers))
            .map(|cap| {
                AnalysisOperation::new(cap.id, cap.name, cap.category, cap.effort)
                    .with_priority(cap.priority)
            })
            .collect();
        if operations.is_empty() {
            operations.push(
                AnalysisOperation::new("op-core", "Core capability", "general", 5)
                    .with_description(format!("Deliver: {business_goal}"))
                    .with_priority(Priority::High),
            );
        }

        let mut keywords: Vec<String> = Vec::new();
        for word in significant_words(raw, 4) {
            if keywords.len() == MAX_KEYWORDS {
                break;
            }
            if !keywords.contains(&word) {
                keywords.push(word);
            }
        }

        let mut stakeholders = vec!["Product owner".to_string()];
        stakeholders.extend(
            STAKEHOLDERS
                .iter()
                .filter(|&&(triggers, _)| mentions(triggers))
                .map(|(_, name)| (*name).to_string()),
        );

        let complexity = if operations.len() > 4 || words.len() > LONG_BRIEF_WORDS {
            Complexity::High
        } else if operations.len() > 2 {
            Complexity::Medium
        } else {
            Complexity::Low
        };

        Ok(ParsedIntent {
            business_goal,
            operations,
            keywords,
            stakeholders,
            complexity,
            expected_user_volume: options.expected_user_volume,
            sensitivity: options.sensitivity(),
        })
    }
}

#[async_trait]
impl IntentInterpreter for KeywordInterpreter {
    async fn interpret(
        &self,
        raw: &str,
        options: &IntentOptions,
    ) -> Result<ParsedIntent, StageError> {
        Self::parse(raw, options)
    }
}
