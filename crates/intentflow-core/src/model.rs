//! Business content produced by the stages
//!
//! These are the structurally-typed outputs of the collaborators. The
//! orchestrator never inspects their text, only passes them along, caches
//! them and counts them.

use crate::types::{DocumentKind, PerformanceSensitivity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Rough size of the requested work
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// One or two operations
    Low,
    /// A handful of operations
    Medium,
    /// Many operations or a long brief
    High,
}

/// Priority of an operation or requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Must ship
    High,
    /// Should ship
    Medium,
    /// Nice to have
    Low,
}

/// One unit of analysis work derived from the intent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOperation {
    /// Stable identifier, e.g. `op-payments`
    pub id: String,
    /// Short name
    pub name: String,
    /// What the operation covers
    pub description: String,
    /// Grouping used by the optimizer
    pub category: String,
    /// Effort in abstract points
    pub effort_points: u32,
    /// Relative priority
    pub priority: Priority,
}

impl AnalysisOperation {
    /// Create new operation with medium priority
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        effort_points: u32,
    ) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            description: format!("Plan and scope {}", name.to_lowercase()),
            name,
            category: category.into(),
            effort_points,
            priority: Priority::Medium,
        }
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With priority
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Stage 1 output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIntent {
    /// One-line statement of the goal
    pub business_goal: String,
    /// Work items, never empty
    pub operations: Vec<AnalysisOperation>,
    /// Salient terms from the intent
    pub keywords: Vec<String>,
    /// Stakeholders mentioned or implied
    pub stakeholders: Vec<String>,
    /// Overall complexity
    pub complexity: Complexity,
    /// Expected user volume carried from the options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_user_volume: Option<u64>,
    /// Latency tolerance carried from the options
    pub sensitivity: PerformanceSensitivity,
}

/// Completeness check on the parsed intent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentValidation {
    /// Every completeness check passed
    pub is_complete: bool,
    /// Fraction of checks passed, 0.0 - 1.0
    pub completeness_score: f64,
    /// What is missing
    pub warnings: Vec<String>,
}

/// Risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Unlikely to matter
    #[default]
    Low,
    /// Worth tracking
    Medium,
    /// Needs a mitigation owner
    High,
}

/// Single identified risk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    /// Risk area
    pub category: String,
    /// What could go wrong
    pub description: String,
    /// Severity
    pub level: RiskLevel,
    /// Suggested mitigation
    pub mitigation: String,
}

/// Risk assessment sub-task output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Identified risks
    pub risks: Vec<RiskFactor>,
    /// Highest level among the risks
    pub overall: RiskLevel,
}

/// Requirement derived from an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    /// Identifier, e.g. `REQ-1`
    pub id: String,
    /// EARS-style statement
    pub statement: String,
    /// Priority
    pub priority: Priority,
    /// Operation the requirement traces to
    pub operation_id: String,
}

/// Stage 2 output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessAnalysis {
    /// Derived requirements
    pub requirements: Vec<Requirement>,
    /// Stakeholders to consult
    pub stakeholders: Vec<String>,
    /// Measures of success
    pub success_metrics: Vec<String>,
    /// 1 (trivial) - 10 (very complex)
    pub complexity_score: u32,
    /// Suggested delivery approach
    pub recommended_approach: String,
}

/// One optimization the optimizer applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Optimization {
    /// Kind of change, e.g. `merge` or `parallelize`
    pub kind: String,
    /// What changed
    pub description: String,
    /// Effort points saved
    pub effort_saved: u32,
}

/// Stage 3 output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    /// Operation count before optimization
    pub original_operation_count: usize,
    /// Operations after optimization, never empty
    pub optimized_operations: Vec<AnalysisOperation>,
    /// Changes applied
    pub optimizations: Vec<Optimization>,
    /// Effort saved as a percentage of the original effort
    pub efficiency_gain_percent: f64,
}

impl OptimizationResult {
    /// Total effort after optimization, saturating at `u32::MAX`
    #[must_use]
    pub fn total_effort(&self) -> u32 {
        self.optimized_operations
            .iter()
            .map(|o| o.effort_points)
            .fold(0, u32::saturating_add)
    }
}

/// Cost/return estimate for one delivery approach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiScenario {
    /// Scenario name
    pub name: String,
    /// Delivery approach
    pub approach: String,
    /// Estimated engineering hours
    pub estimated_hours: f64,
    /// Estimated cost
    pub estimated_cost_dollars: f64,
    /// Expected first-year return
    pub expected_return_dollars: f64,
    /// `(return - cost) / cost * 100`
    pub roi_percent: f64,
    /// Months until cost is recovered
    pub payback_months: f64,
    /// Forecast vibe requests
    pub vibes: u32,
    /// Forecast spec requests
    pub specs: u32,
    /// Fits the caller's cost constraints
    pub within_budget: bool,
}

/// Stage 4 output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiAnalysis {
    /// Scenarios, never empty
    pub scenarios: Vec<RoiScenario>,
    /// Name of the recommended scenario
    pub recommended: String,
}

impl RoiAnalysis {
    /// The recommended scenario
    #[must_use]
    pub fn recommended_scenario(&self) -> Option<&RoiScenario> {
        self.scenarios.iter().find(|s| s.name == self.recommended)
    }
}

/// Stage 5 output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultingSummary {
    /// Executive summary paragraph
    pub executive_summary: String,
    /// Key findings
    pub key_findings: Vec<String>,
    /// Recommendations
    pub recommendations: Vec<String>,
    /// Next steps
    pub next_steps: Vec<String>,
}

/// Titled section of a design
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSection {
    /// Section title
    pub title: String,
    /// Section body (markdown)
    pub body: String,
}

/// Implementation task traced to requirements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecTask {
    /// Identifier, e.g. `1.2`
    pub id: String,
    /// What to do
    pub title: String,
    /// Requirement ids covered
    pub requirement_refs: Vec<String>,
}

/// Stage 6 output: requirements, design and tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecDocument {
    /// Kebab-case feature name
    pub feature_name: String,
    /// Requirement statements
    pub requirements: Vec<Requirement>,
    /// Design sections
    pub design: Vec<DesignSection>,
    /// Task list
    pub tasks: Vec<SpecTask>,
}

/// Stage 7 output, one per requested kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocument {
    /// Document type
    pub kind: DocumentKind,
    /// Title
    pub title: String,
    /// Markdown body
    pub content: String,
    /// Generation time
    pub generated_at: DateTime<Utc>,
}

/// Stage 8 output, one per written file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SteeringFile {
    /// Where the file was written
    pub path: PathBuf,
    /// Document it was rendered from
    pub document: DocumentKind,
    /// Bytes written
    pub bytes: usize,
}

/// Advisory cross-document consistency check
///
/// A keyword-overlap heuristic. It produces warnings only and never fails a
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    /// Mean overlap with the specification, 0.0 - 1.0
    pub score: f64,
    /// Documents that look unrelated to the specification
    pub warnings: Vec<String>,
}
