//! Testing utilities for the intentflow workspace
//!
//! Scripted collaborators, fixtures and orchestrator builders.

#![allow(missing_docs)]

use async_trait::async_trait;
use intentflow_core::{
    AnalysisOperation, BusinessAnalysis, BusinessAnalyzer, Collaborators, DocumentContext,
    DocumentGenerator, DocumentKind, DocumentOptions, GeneratedDocument, IntentInterpreter,
    IntentOptions, IntentValidation, IntentValidator, Orchestrator, OrchestratorConfig,
    ParsedIntent, RetryPolicy, RiskAssessment, RiskAssessor, StageError, SteeringFile,
    SteeringOptions, SteeringWriter,
};
use intentflow_core::stages::{KeywordInterpreter, MarkdownDocumentGenerator, RequirementsAnalyzer};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const CHECKOUT_INTENT: &str =
    "Let merchants accept card payments at checkout and email receipts to their customers";

pub const REPORTING_INTENT: &str =
    "Give administrators a reporting dashboard with usage analytics for every account";

/// Shared call counter
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicU32>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Interpreter that always fails with the given error
#[derive(Debug, Clone)]
pub struct FailingInterpreter {
    pub error: StageError,
    pub calls: CallCounter,
}

impl FailingInterpreter {
    pub fn new(error: StageError) -> Self {
        Self {
            error,
            calls: CallCounter::new(),
        }
    }
}

#[async_trait]
impl IntentInterpreter for FailingInterpreter {
    async fn interpret(
        &self,
        _raw: &str,
        _options: &IntentOptions,
    ) -> Result<ParsedIntent, StageError> {
        self.calls.hit();
        Err(self.error.clone())
    }
}

/// Interpreter that fails the first `failures` calls, then delegates
#[derive(Debug, Clone)]
pub struct FlakyInterpreter {
    pub failures: u32,
    pub calls: CallCounter,
}

impl FlakyInterpreter {
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: CallCounter::new(),
        }
    }
}

#[async_trait]
impl IntentInterpreter for FlakyInterpreter {
    async fn interpret(
        &self,
        raw: &str,
        options: &IntentOptions,
    ) -> Result<ParsedIntent, StageError> {
        if self.calls.hit() <= self.failures {
            return Err(StageError::Transient("interpreter warming up".into()));
        }
        KeywordInterpreter::parse(raw, options)
    }
}

/// Analyzer that sleeps before delegating, counting calls
#[derive(Debug, Clone)]
pub struct DelayedAnalyzer {
    pub delay: Duration,
    pub calls: CallCounter,
}

impl DelayedAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: CallCounter::new(),
        }
    }
}

#[async_trait]
impl BusinessAnalyzer for DelayedAnalyzer {
    async fn analyze(&self, intent: &ParsedIntent) -> Result<BusinessAnalysis, StageError> {
        self.calls.hit();
        tokio::time::sleep(self.delay).await;
        RequirementsAnalyzer::derive(intent)
    }
}

/// Analyzer that always fails recoverably
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableAnalyzer;

#[async_trait]
impl BusinessAnalyzer for UnavailableAnalyzer {
    async fn analyze(&self, _intent: &ParsedIntent) -> Result<BusinessAnalysis, StageError> {
        Err(StageError::Unavailable("analysis backend offline".into()))
    }
}

/// Analyzer that panics
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingAnalyzer;

#[async_trait]
impl BusinessAnalyzer for PanickingAnalyzer {
    async fn analyze(&self, _intent: &ParsedIntent) -> Result<BusinessAnalysis, StageError> {
        panic!("analyzer bug")
    }
}

/// Validator that always fails recoverably
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingValidator;

#[async_trait]
impl IntentValidator for FailingValidator {
    async fn validate(&self, _intent: &ParsedIntent) -> Result<IntentValidation, StageError> {
        Err(StageError::Runtime("validator crashed".into()))
    }
}

/// Risk assessor that panics
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingRiskAssessor;

#[async_trait]
impl RiskAssessor for PanickingRiskAssessor {
    async fn assess(
        &self,
        _intent: &ParsedIntent,
        _options: &IntentOptions,
    ) -> Result<RiskAssessment, StageError> {
        panic!("risk model exploded")
    }
}

/// Document generator that fails for one kind and delegates for the rest
#[derive(Debug, Clone, Copy)]
pub struct SelectiveDocumentGenerator {
    pub failing: DocumentKind,
}

#[async_trait]
impl DocumentGenerator for SelectiveDocumentGenerator {
    async fn generate(
        &self,
        kind: DocumentKind,
        context: &DocumentContext<'_>,
    ) -> Result<GeneratedDocument, StageError> {
        if kind == self.failing {
            return Err(StageError::Unavailable(format!("{kind} template missing")));
        }
        Ok(MarkdownDocumentGenerator::render(kind, context))
    }
}

/// Steering writer that always fails
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnlySteeringWriter;

#[async_trait]
impl SteeringWriter for ReadOnlySteeringWriter {
    async fn write(
        &self,
        _documents: &[GeneratedDocument],
        _options: &SteeringOptions,
    ) -> Result<Vec<SteeringFile>, StageError> {
        Err(StageError::Unavailable("read-only file system".into()))
    }
}

/// Configuration with short retry delays and no background sweep
pub fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig::default()
        .with_intent_retry(RetryPolicy::fixed(2, Duration::from_millis(1)))
        .with_sweep_interval(Duration::ZERO)
}

pub fn setup_test_orchestrator() -> Orchestrator {
    Orchestrator::new(fast_config())
}

pub fn setup_orchestrator_with(collaborators: Collaborators) -> Orchestrator {
    Orchestrator::with_collaborators(fast_config(), collaborators)
}

pub fn operation(id: &str, category: &str, effort: u32) -> AnalysisOperation {
    AnalysisOperation::new(id, id.trim_start_matches("op-"), category, effort)
}

pub fn options_with_documents(kinds: &[DocumentKind]) -> IntentOptions {
    IntentOptions::new().with_documents(DocumentOptions::new(kinds.iter().copied()))
}
