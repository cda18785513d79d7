//! IntentFlow Core - intent-to-plan pipeline orchestrator
//!
//! Turns a free-text product intent into a structured delivery plan:
//! - Parses the intent into operations, stakeholders and keywords
//! - Validates completeness and assesses delivery risk in parallel
//! - Runs business analysis, workflow optimization and ROI forecasting
//! - Produces a consulting summary and a requirements/design/tasks spec
//! - Optionally generates PM documents and writes steering files
//!
//! Every stage is cached, retried where the error allows it and replaced
//! by a conservative fallback when it fails recoverably. Callers always get
//! a [`PipelineResult`], never an `Err`.
//!
//! # Example
//!
//! ```rust,ignore
//! use intentflow_core::{IntentOptions, Orchestrator, OrchestratorConfig};
//!
//! # async fn example() {
//! let orchestrator = Orchestrator::new(OrchestratorConfig::default());
//! let options = IntentOptions::new().with_user_volume(20_000);
//!
//! let result = orchestrator
//!     .process_intent("Add card payments to checkout for merchants", Some(options))
//!     .await;
//!
//! if let Some(payload) = result.payload {
//!     println!("{} tasks, quota {}", payload.specification.tasks.len(), result.metadata.quota_used);
//! }
//! # }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

// Core modules
pub mod collaborators;
pub mod config;
pub mod consistency;
pub mod error;
pub mod fallback;
pub mod model;
pub mod monitor;
pub mod orchestrator;
pub mod parallel;
pub mod recovery;
pub mod session;
pub mod stages;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use collaborators::{
    BusinessAnalyzer, Collaborators, DocumentContext, DocumentGenerator, IntentInterpreter,
    IntentValidator, QuotaForecaster, RiskAssessor, SpecGenerator, SteeringWriter,
    SummaryGenerator, WorkflowOptimizer,
};
pub use config::{CacheConfig, OrchestratorConfig, RetryPolicy};
pub use error::{ConfigError, ErrorClass, ProcessingError, ProcessingErrorKind, StageError};
pub use model::{
    AnalysisOperation, BusinessAnalysis, Complexity, ConsistencyReport, ConsultingSummary,
    DesignSection, GeneratedDocument, IntentValidation, Optimization, OptimizationResult,
    ParsedIntent, Priority, Requirement, RiskAssessment, RiskFactor, RiskLevel, RoiAnalysis,
    RoiScenario, SpecDocument, SpecTask, SteeringFile,
};
pub use monitor::{PerformanceMetrics, PerformanceMonitor, PerformanceStatus, PerformanceSummary};
pub use orchestrator::{Orchestrator, WarmupReport};
pub use parallel::{BatchSummary, BoundedExecutor, BoxedOperation, ParallelError};
pub use recovery::StageExecutor;
pub use session::PipelineSession;
pub use store::StageCache;
pub use types::{
    CostConstraints, DocumentKind, DocumentOptions, IntentOptions, PerformanceSensitivity,
    PipelinePayload, PipelineResult, Provenance, ResultMetadata, SessionId, StageKind,
    StageOutput, SteeringInclusion, SteeringOptions,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with IntentFlow Core
    pub use crate::{
        Collaborators, DocumentKind, DocumentOptions, IntentOptions, Orchestrator,
        OrchestratorConfig, PipelinePayload, PipelineResult, ProcessingError, StageError,
        StageKind,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
