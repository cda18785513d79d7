//! Stage collaborator traits
//!
//! Each pipeline stage delegates its content generation to one narrow trait.
//! The orchestrator owns caching, retries, fallbacks and quota; collaborators
//! only turn inputs into outputs or return a `StageError`.
//!
//! [`Collaborators::default`] wires in the deterministic implementations from
//! [`crate::stages`]. Tests and embedders replace individual pieces with the
//! `with_*` methods.

use crate::error::StageError;
use crate::model::{
    AnalysisOperation, BusinessAnalysis, ConsultingSummary, GeneratedDocument, IntentValidation,
    OptimizationResult, ParsedIntent, RiskAssessment, RoiAnalysis, SpecDocument, SteeringFile,
};
use crate::stages::{
    CategoryOptimizer, CompletenessValidator, FsSteeringWriter, KeywordInterpreter,
    KeywordRiskAssessor, MarkdownDocumentGenerator, RequirementsAnalyzer, RoiForecaster,
    TemplateSpecGenerator, TemplateSummarizer,
};
use crate::types::{DocumentKind, IntentOptions, SteeringOptions};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Stage 1: free text to structured intent
#[async_trait]
pub trait IntentInterpreter: Send + Sync {
    /// Interpret `raw` (already trimmed and length-checked)
    async fn interpret(&self, raw: &str, options: &IntentOptions)
        -> Result<ParsedIntent, StageError>;
}

/// Completeness validation sub-task
#[async_trait]
pub trait IntentValidator: Send + Sync {
    /// Score how complete the parsed intent is
    async fn validate(&self, intent: &ParsedIntent) -> Result<IntentValidation, StageError>;
}

/// Risk assessment sub-task
#[async_trait]
pub trait RiskAssessor: Send + Sync {
    /// Identify delivery risks
    async fn assess(
        &self,
        intent: &ParsedIntent,
        options: &IntentOptions,
    ) -> Result<RiskAssessment, StageError>;
}

/// Stage 2: business analysis
#[async_trait]
pub trait BusinessAnalyzer: Send + Sync {
    /// Derive requirements and success metrics
    async fn analyze(&self, intent: &ParsedIntent) -> Result<BusinessAnalysis, StageError>;
}

/// Stage 3: workflow optimization
#[async_trait]
pub trait WorkflowOptimizer: Send + Sync {
    /// Reduce and reorder operations
    async fn optimize(
        &self,
        operations: &[AnalysisOperation],
        analysis: Option<&BusinessAnalysis>,
    ) -> Result<OptimizationResult, StageError>;
}

/// Stage 4: quota and ROI forecasting
#[async_trait]
pub trait QuotaForecaster: Send + Sync {
    /// Estimate cost and return per delivery scenario
    async fn forecast(
        &self,
        optimization: &OptimizationResult,
        options: &IntentOptions,
    ) -> Result<RoiAnalysis, StageError>;
}

/// Stage 5: consulting summary
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    /// Summarize findings for decision makers
    async fn summarize(
        &self,
        analysis: Option<&BusinessAnalysis>,
        optimization: &OptimizationResult,
        roi: &RoiAnalysis,
    ) -> Result<ConsultingSummary, StageError>;
}

/// Stage 6: requirements, design and tasks
#[async_trait]
pub trait SpecGenerator: Send + Sync {
    /// Produce the specification
    async fn generate(
        &self,
        intent: &ParsedIntent,
        analysis: &BusinessAnalysis,
        summary: &ConsultingSummary,
    ) -> Result<SpecDocument, StageError>;
}

/// Inputs available to the document generator
///
/// Only the parsed intent is guaranteed; the rest is present when the full
/// pipeline ran.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContext<'a> {
    /// Parsed intent
    pub intent: &'a ParsedIntent,
    /// Business analysis
    pub analysis: Option<&'a BusinessAnalysis>,
    /// ROI forecast
    pub roi: Option<&'a RoiAnalysis>,
    /// Consulting summary
    pub summary: Option<&'a ConsultingSummary>,
    /// Specification
    pub specification: Option<&'a SpecDocument>,
    /// Target launch date, `YYYY-MM-DD`
    pub target_date: Option<&'a str>,
}

impl<'a> DocumentContext<'a> {
    /// Context holding only the parsed intent
    #[must_use]
    pub fn from_intent(intent: &'a ParsedIntent) -> Self {
        Self {
            intent,
            analysis: None,
            roi: None,
            summary: None,
            specification: None,
            target_date: None,
        }
    }
}

/// Stage 7: PM documents
#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    /// Produce one document
    async fn generate(
        &self,
        kind: DocumentKind,
        context: &DocumentContext<'_>,
    ) -> Result<GeneratedDocument, StageError>;
}

/// Stage 8: steering files
#[async_trait]
pub trait SteeringWriter: Send + Sync {
    /// Persist documents as steering files
    async fn write(
        &self,
        documents: &[GeneratedDocument],
        options: &SteeringOptions,
    ) -> Result<Vec<SteeringFile>, StageError>;
}

/// The full set of collaborators used by one orchestrator
#[derive(Clone)]
pub struct Collaborators {
    /// Stage 1
    pub interpreter: Arc<dyn IntentInterpreter>,
    /// Validation sub-task
    pub validator: Arc<dyn IntentValidator>,
    /// Risk sub-task
    pub risk_assessor: Arc<dyn RiskAssessor>,
    /// Stage 2
    pub analyzer: Arc<dyn BusinessAnalyzer>,
    /// Stage 3
    pub optimizer: Arc<dyn WorkflowOptimizer>,
    /// Stage 4
    pub forecaster: Arc<dyn QuotaForecaster>,
    /// Stage 5
    pub summarizer: Arc<dyn SummaryGenerator>,
    /// Stage 6
    pub spec_generator: Arc<dyn SpecGenerator>,
    /// Stage 7
    pub document_generator: Arc<dyn DocumentGenerator>,
    /// Stage 8
    pub steering_writer: Arc<dyn SteeringWriter>,
}

impl Collaborators {
    /// Replace the intent interpreter
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: impl IntentInterpreter + 'static) -> Self {
        self.interpreter = Arc::new(interpreter);
        self
    }

    /// Replace the completeness validator
    #[must_use]
    pub fn with_validator(mut self, validator: impl IntentValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Replace the risk assessor
    #[must_use]
    pub fn with_risk_assessor(mut self, assessor: impl RiskAssessor + 'static) -> Self {
        self.risk_assessor = Arc::new(assessor);
        self
    }

    /// Replace the business analyzer
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: impl BusinessAnalyzer + 'static) -> Self {
        self.analyzer = Arc::new(analyzer);
        self
    }

    /// Replace the workflow optimizer
    #[must_use]
    pub fn with_optimizer(mut self, optimizer: impl WorkflowOptimizer + 'static) -> Self {
        self.optimizer = Arc::new(optimizer);
        self
    }

    /// Replace the forecaster
    #[must_use]
    pub fn with_forecaster(mut self, forecaster: impl QuotaForecaster + 'static) -> Self {
        self.forecaster = Arc::new(forecaster);
        self
    }

    /// Replace the summary generator
    #[must_use]
    pub fn with_summarizer(mut self, summarizer: impl SummaryGenerator + 'static) -> Self {
        self.summarizer = Arc::new(summarizer);
        self
    }

    /// Replace the spec generator
    #[must_use]
    pub fn with_spec_generator(mut self, generator: impl SpecGenerator + 'static) -> Self {
        self.spec_generator = Arc::new(generator);
        self
    }

    /// Replace the document generator
    #[must_use]
    pub fn with_document_generator(mut self, generator: impl DocumentGenerator + 'static) -> Self {
        self.document_generator = Arc::new(generator);
        self
    }

    /// Replace the steering writer
    #[must_use]
    pub fn with_steering_writer(mut self, writer: impl SteeringWriter + 'static) -> Self {
        self.steering_writer = Arc::new(writer);
        self
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            interpreter: Arc::new(KeywordInterpreter),
            validator: Arc::new(CompletenessValidator),
            risk_assessor: Arc::new(KeywordRiskAssessor),
            analyzer: Arc::new(RequirementsAnalyzer),
            optimizer: Arc::new(CategoryOptimizer),
            forecaster: Arc::new(RoiForecaster::default()),
            summarizer: Arc::new(TemplateSummarizer),
            spec_generator: Arc::new(TemplateSpecGenerator),
            document_generator: Arc::new(MarkdownDocumentGenerator),
            steering_writer: Arc::new(FsSteeringWriter::default()),
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
