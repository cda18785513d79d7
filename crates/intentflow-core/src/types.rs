//! Core types for the orchestrator
//!
//! Defines the caller-facing envelope and the orchestration vocabulary:
//! - Session identifiers and stage kinds
//! - Caller options (`IntentOptions`) passed through from the tool layer
//! - Stage outputs with provenance
//! - The `PipelineResult` envelope and its metadata

use crate::error::ProcessingError;
use crate::model::{
    BusinessAnalysis, ConsistencyReport, ConsultingSummary, GeneratedDocument, IntentValidation,
    OptimizationResult, ParsedIntent, RiskAssessment, RoiAnalysis, SpecDocument, SteeringFile,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use ulid::Ulid;

/// Unique session identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Ulid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discrete unit of pipeline work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Stage 1: free text to structured intent
    Intent,
    /// Completeness validation and risk assessment sub-tasks
    Validation,
    /// Stage 2: business analysis
    Analysis,
    /// Stage 3: workflow optimization
    Optimization,
    /// Stage 4: quota and ROI forecasting
    Forecasting,
    /// Stage 5: consulting summary
    Summary,
    /// Stage 6: requirements/design/tasks spec
    Spec,
    /// Stage 7 (optional): PM documents
    Documents,
    /// Stage 8 (optional): steering files
    Steering,
}

impl StageKind {
    /// Short tag used in logs and errors
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intent => "intent",
            Self::Validation => "validation",
            Self::Analysis => "analysis",
            Self::Optimization => "optimization",
            Self::Forecasting => "forecasting",
            Self::Summary => "summary",
            Self::Spec => "spec",
            Self::Documents => "documents",
            Self::Steering => "steering",
        }
    }

    /// Cache-key category for this stage's outputs
    #[must_use]
    pub fn cache_category(&self) -> &'static str {
        match self {
            Self::Intent => "intent-parsing",
            Self::Validation => "intent-validation",
            Self::Analysis => "business-analysis",
            Self::Optimization => "workflow-optimization",
            Self::Forecasting => "roi-analysis",
            Self::Summary => "consulting-summary",
            Self::Spec => "spec-generation",
            Self::Documents => "document-generation",
            Self::Steering => "steering-files",
        }
    }

    /// Fixed quota charge for running this stage once
    ///
    /// Documents are charged per document produced. Validation sub-tasks and
    /// steering files are free.
    #[must_use]
    pub fn quota_weight(&self) -> u32 {
        match self {
            Self::Intent | Self::Optimization | Self::Summary | Self::Spec | Self::Documents => 1,
            Self::Analysis | Self::Forecasting => 2,
            Self::Validation | Self::Steering => 0,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a stage value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Produced by the collaborator on this call
    Computed,
    /// Served from the cache
    Cached,
    /// Substituted after a recoverable failure
    Fallback,
}

/// Output of a single stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput<T> {
    /// Stage value, real or substituted
    pub value: T,
    /// How the value was obtained
    pub provenance: Provenance,
}

impl<T> StageOutput<T> {
    /// Value computed by the collaborator
    #[inline]
    #[must_use]
    pub fn computed(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Computed,
        }
    }

    /// Value served from cache
    #[inline]
    #[must_use]
    pub fn cached(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Cached,
        }
    }

    /// Fallback value after a recoverable failure
    #[inline]
    #[must_use]
    pub fn fallback(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Fallback,
        }
    }

    /// Whether this output is a fallback substitute
    #[inline]
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }

    /// Unwrap into the value
    #[inline]
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Caller's latency tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceSensitivity {
    /// Batch-style, latency is irrelevant
    Low,
    /// Interactive but tolerant
    #[default]
    Medium,
    /// Latency-critical
    High,
}

/// Budget ceilings supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostConstraints {
    /// Maximum vibe (free-form) requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_vibes: Option<u32>,
    /// Maximum spec requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_specs: Option<u32>,
    /// Maximum spend in dollars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cost_dollars: Option<f64>,
}

/// Optional document types the pipeline can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    /// One-page management brief
    ManagementOnePager,
    /// Press release + FAQ
    PrFaq,
    /// Requirements document
    Requirements,
    /// Design options with trade-offs
    DesignOptions,
    /// Task plan
    TaskPlan,
    /// Competitive analysis
    CompetitiveAnalysis,
}

impl DocumentKind {
    /// Every document kind, in generation order
    pub const ALL: [DocumentKind; 6] = [
        Self::ManagementOnePager,
        Self::PrFaq,
        Self::Requirements,
        Self::DesignOptions,
        Self::TaskPlan,
        Self::CompetitiveAnalysis,
    ];

    /// Human-readable title
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::ManagementOnePager => "Management One-Pager",
            Self::PrFaq => "PR-FAQ",
            Self::Requirements => "Requirements",
            Self::DesignOptions => "Design Options",
            Self::TaskPlan => "Task Plan",
            Self::CompetitiveAnalysis => "Competitive Analysis",
        }
    }

    /// File-name friendly slug
    #[must_use]
    pub fn slug(&self) -> &'static str {
        match self {
            Self::ManagementOnePager => "management-onepager",
            Self::PrFaq => "prfaq",
            Self::Requirements => "requirements",
            Self::DesignOptions => "design-options",
            Self::TaskPlan => "task-plan",
            Self::CompetitiveAnalysis => "competitive-analysis",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// When a steering file is loaded by its consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SteeringInclusion {
    /// Always included
    #[default]
    Always,
    /// Included when a file matches the pattern
    FileMatch,
    /// Included on explicit request
    Manual,
}

/// Steering-file output options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SteeringOptions {
    /// Write steering files at all
    #[serde(default)]
    pub enabled: bool,
    /// Directory to write into (defaults to the writer's base directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Prefix for generated file names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_name: Option<String>,
    /// Inclusion mode written into the front-matter
    #[serde(default)]
    pub inclusion: SteeringInclusion,
    /// Pattern used with `FileMatch` inclusion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_match_pattern: Option<String>,
}

/// Which PM documents to generate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOptions {
    /// Document kinds to produce (duplicates ignored)
    #[serde(default)]
    pub documents: Vec<DocumentKind>,
    /// Target launch date, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    /// Steering-file options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steering: Option<SteeringOptions>,
}

impl DocumentOptions {
    /// Request the given documents
    #[must_use]
    pub fn new(documents: impl IntoIterator<Item = DocumentKind>) -> Self {
        Self {
            documents: documents.into_iter().collect(),
            ..Self::default()
        }
    }

    /// With target date
    #[must_use]
    pub fn with_target_date(mut self, date: impl Into<String>) -> Self {
        self.target_date = Some(date.into());
        self
    }

    /// With steering options
    #[must_use]
    pub fn with_steering(mut self, steering: SteeringOptions) -> Self {
        self.steering = Some(steering);
        self
    }

    /// Requested kinds, deduplicated, in request order
    #[must_use]
    pub fn requested_kinds(&self) -> Vec<DocumentKind> {
        let mut kinds = Vec::with_capacity(self.documents.len());
        for kind in &self.documents {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        kinds
    }
}

/// Optional parameters accompanying a raw intent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentOptions {
    /// Expected number of end users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_user_volume: Option<u64>,
    /// Budget ceilings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_constraints: Option<CostConstraints>,
    /// Latency tolerance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_sensitivity: Option<PerformanceSensitivity>,
    /// Optional documents and steering files
    #[serde(
        default,
        rename = "generatePMDocuments",
        alias = "generatePmDocuments",
        skip_serializing_if = "Option::is_none"
    )]
    pub generate_pm_documents: Option<DocumentOptions>,
}

impl IntentOptions {
    /// Create empty options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With expected user volume
    #[inline]
    #[must_use]
    pub fn with_user_volume(mut self, volume: u64) -> Self {
        self.expected_user_volume = Some(volume);
        self
    }

    /// With cost constraints
    #[inline]
    #[must_use]
    pub fn with_cost_constraints(mut self, constraints: CostConstraints) -> Self {
        self.cost_constraints = Some(constraints);
        self
    }

    /// With performance sensitivity
    #[inline]
    #[must_use]
    pub fn with_sensitivity(mut self, sensitivity: PerformanceSensitivity) -> Self {
        self.performance_sensitivity = Some(sensitivity);
        self
    }

    /// With document generation
    #[inline]
    #[must_use]
    pub fn with_documents(mut self, documents: DocumentOptions) -> Self {
        self.generate_pm_documents = Some(documents);
        self
    }

    /// Effective sensitivity
    #[inline]
    #[must_use]
    pub fn sensitivity(&self) -> PerformanceSensitivity {
        self.performance_sensitivity.unwrap_or_default()
    }

    /// Requested documents, empty when none were asked for
    #[must_use]
    pub fn requested_documents(&self) -> Vec<DocumentKind> {
        self.generate_pm_documents
            .as_ref()
            .map(DocumentOptions::requested_kinds)
            .unwrap_or_default()
    }

    /// Steering options when steering output is enabled
    #[must_use]
    pub fn steering(&self) -> Option<&SteeringOptions> {
        self.generate_pm_documents
            .as_ref()
            .and_then(|d| d.steering.as_ref())
            .filter(|s| s.enabled)
    }

    /// Target date, if any
    #[must_use]
    pub fn target_date(&self) -> Option<&str> {
        self.generate_pm_documents
            .as_ref()
            .and_then(|d| d.target_date.as_deref())
    }
}

/// Everything the full pipeline produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelinePayload {
    /// Stage 1 output
    pub intent: ParsedIntent,
    /// Completeness validation sub-task
    pub validation: IntentValidation,
    /// Risk assessment sub-task
    pub risks: RiskAssessment,
    /// Stage 2 output
    pub analysis: BusinessAnalysis,
    /// Stage 3 output
    pub optimization: OptimizationResult,
    /// Stage 4 output
    pub roi: RoiAnalysis,
    /// Stage 5 output
    pub summary: ConsultingSummary,
    /// Stage 6 output
    pub specification: SpecDocument,
    /// Stage 7 output (empty unless requested)
    pub documents: Vec<GeneratedDocument>,
    /// Stage 8 output (empty unless requested)
    pub steering_files: Vec<SteeringFile>,
    /// Advisory cross-document consistency report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency: Option<ConsistencyReport>,
}

/// Bookkeeping attached to every result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    /// Wall-clock time of this invocation
    pub execution_time_ms: u64,
    /// Session that produced this result
    pub session_id: SessionId,
    /// Abstract cost units charged
    pub quota_used: u32,
    /// Orchestration shortcuts taken (cache hits, parallel fan-out)
    pub optimizations_applied: Vec<String>,
    /// Whether the whole result came from the pipeline cache
    pub cache_hit: bool,
    /// Stages that fell back to substitute values
    pub degraded_stages: Vec<StageKind>,
}

/// Final envelope returned to the tool layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult<T> {
    /// Whether the pipeline completed
    pub success: bool,
    /// Output when successful
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    /// Failure details when unsuccessful
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ProcessingError>,
    /// Session bookkeeping
    pub metadata: ResultMetadata,
}

impl<T> PipelineResult<T> {
    /// Successful result
    #[inline]
    #[must_use]
    pub fn success(payload: T, metadata: ResultMetadata) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            error: None,
            metadata,
        }
    }

    /// Failed result
    #[inline]
    #[must_use]
    pub fn failure(error: ProcessingError, metadata: ResultMetadata) -> Self {
        Self {
            success: false,
            payload: None,
            error: Some(error),
            metadata,
        }
    }

    /// Whether any stage used a fallback value
    #[inline]
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.metadata.degraded_stages.is_empty()
    }
}
