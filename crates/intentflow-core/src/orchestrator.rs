//! Pipeline orchestrator
//!
//! Drives one intent through every stage:
//!
//! ```text
//! validate → pipeline cache → intent → [validation ∥ risk] → analysis
//!   → optimization → forecasting → summary → spec
//!   → [documents ∥ ...] → [steering files] → result
//! ```
//!
//! Every stage goes through the stage cache and the recovery executor. The
//! orchestrator never returns `Err` or panics to its caller: each entry point
//! yields a `PipelineResult`.

use crate::collaborators::{Collaborators, DocumentContext};
use crate::config::OrchestratorConfig;
use crate::consistency;
use crate::error::{ProcessingError, StageError};
use crate::fallback;
use crate::model::{
    AnalysisOperation, BusinessAnalysis, ConsultingSummary, GeneratedDocument, IntentValidation,
    OptimizationResult, ParsedIntent, RiskAssessment, RoiAnalysis, SpecDocument,
};
use crate::monitor::{PerformanceMetrics, PerformanceMonitor, PerformanceSummary};
use crate::parallel::{BoundedExecutor, BoxedOperation, ParallelError};
use crate::recovery::StageExecutor;
use crate::session::PipelineSession;
use crate::store::StageCache;
use crate::types::{
    DocumentKind, IntentOptions, PipelinePayload, PipelineResult, Provenance, SessionId,
    StageKind, StageOutput,
};
use chrono::NaiveDate;
use futures::FutureExt;
use intentflow_cache::CacheStats;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Instant;
use tracing::Instrument;

/// Cache category for whole-pipeline results
const PIPELINE_CATEGORY: &str = "pipeline";

/// Whole-pipeline cache entry
#[derive(Debug, Clone)]
struct CachedPipeline {
    payload: PipelinePayload,
    quota_used: u32,
}

/// Output of the parallel validation sub-tasks
enum SubTask {
    Validation(IntentValidation),
    Risks(RiskAssessment),
}

/// Outcome of [`Orchestrator::warmup_cache`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarmupReport {
    /// Samples submitted
    pub requested: usize,
    /// Samples processed successfully
    pub warmed: usize,
    /// Samples rejected or failed
    pub failed: usize,
    /// Batches run
    pub batches: usize,
    /// Wall-clock time of the warmup
    pub duration_ms: u64,
}

/// The pipeline orchestrator
///
/// Owns the cache, the executor and the monitor. Multiple orchestrators in
/// one process share nothing.
#[derive(Debug)]
pub struct Orchestrator {
    config: OrchestratorConfig,
    collaborators: Collaborators,
    cache: StageCache,
    executor: BoundedExecutor,
    monitor: PerformanceMonitor,
    stages: StageExecutor,
}

impl Orchestrator {
    /// Create orchestrator with the built-in collaborators
    #[must_use]
    pub fn new(config: OrchestratorConfig) -> Self {
        Self::with_collaborators(config, Collaborators::default())
    }

    /// Create orchestrator with custom collaborators
    #[must_use]
    pub fn with_collaborators(config: OrchestratorConfig, collaborators: Collaborators) -> Self {
        Self {
            cache: StageCache::new(config.cache.max_entries, config.sweep_interval()),
            executor: BoundedExecutor::new(config.max_concurrency),
            monitor: PerformanceMonitor::new(),
            stages: StageExecutor::from_config(&config),
            collaborators,
            config,
        }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Get the stage cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &StageCache {
        &self.cache
    }

    /// Run the full pipeline for one intent
    pub async fn process_intent(
        &self,
        raw: &str,
        options: Option<IntentOptions>,
    ) -> PipelineResult<PipelinePayload> {
        let mut session = PipelineSession::start();
        let options = options.unwrap_or_default();
        let span = tracing::info_span!("process_intent", session_id = %session.id);

        let outcome = self
            .run_pipeline(raw, &options, &mut session)
            .instrument(span)
            .await;
        self.finish("process_intent", &session, outcome)
    }

    async fn run_pipeline(
        &self,
        raw: &str,
        options: &IntentOptions,
        session: &mut PipelineSession,
    ) -> Result<(PipelinePayload, bool), ProcessingError> {
        let intent_text = self.validate_intent(raw, options)?;
        let session_id = session.id;

        let pipeline_key = StageCache::key(PIPELINE_CATEGORY, &(intent_text, options));
        if let Some(cached) = pipeline_key
            .as_ref()
            .and_then(|key| self.cache.get::<CachedPipeline>(key))
        {
            session.charge_units(cached.quota_used);
            session.note_optimization("pipeline-cache-hit");
            tracing::info!(session_id = %session_id, "pipeline result served from cache");
            return Ok((cached.payload, true));
        }

        // Stage 1
        let collaborators = &self.collaborators;
        let intent = self
            .cached_stage(
                session,
                StageKind::Intent,
                &(intent_text, options),
                || collaborators.interpreter.interpret(intent_text, options),
                || fallback::parsed_intent(intent_text, options),
                |intent: &ParsedIntent| intent.operations.len(),
            )
            .await?;

        // Validation sub-tasks
        let (validation, risks) = self.validate_parsed(&intent, options, session).await;

        // Stages 2-6
        let analysis = self
            .cached_stage(
                session,
                StageKind::Analysis,
                &intent,
                || collaborators.analyzer.analyze(&intent),
                || fallback::analysis(&intent),
                |analysis: &BusinessAnalysis| analysis.requirements.len(),
            )
            .await?;

        let optimization = self
            .cached_stage(
                session,
                StageKind::Optimization,
                &(&intent.operations, &analysis),
                || collaborators.optimizer.optimize(&intent.operations, Some(&analysis)),
                || fallback::optimization(&intent.operations),
                |optimization: &OptimizationResult| optimization.optimized_operations.len(),
            )
            .await?;

        let roi = self.forecast(session, &optimization, options).await?;

        let summary = self
            .cached_stage(
                session,
                StageKind::Summary,
                &(&analysis, &optimization, &roi),
                || collaborators.summarizer.summarize(Some(&analysis), &optimization, &roi),
                || fallback::summary(&optimization),
                |summary: &ConsultingSummary| summary.recommendations.len(),
            )
            .await?;

        let specification = self
            .cached_stage(
                session,
                StageKind::Spec,
                &(&intent, &analysis, &summary),
                || collaborators.spec_generator.generate(&intent, &analysis, &summary),
                || fallback::specification(&intent, &analysis),
                |spec: &SpecDocument| spec.tasks.len(),
            )
            .await?;

        // Stage 7 (optional)
        let requested = options.requested_documents();
        let documents = if requested.is_empty() {
            Vec::new()
        } else {
            let context = DocumentContext {
                intent: &intent,
                analysis: Some(&analysis),
                roi: Some(&roi),
                summary: Some(&summary),
                specification: Some(&specification),
                target_date: options.target_date(),
            };
            self.generate_documents(&requested, &context, session).await
        };

        let consistency = consistency::check(&specification, &documents);
        if let Some(report) = &consistency {
            if !report.warnings.is_empty() {
                tracing::warn!(
                    session_id = %session_id,
                    score = report.score,
                    warnings = report.warnings.len(),
                    "documents look inconsistent with the specification"
                );
            }
        }

        // Stage 8 (optional)
        let steering = options.steering();
        let steering_files = match steering {
            Some(steering) if !documents.is_empty() => {
                tracing::info!(session_id = %session_id, stage = %StageKind::Steering, "stage started");
                let written = self
                    .stages
                    .run_optional(StageKind::Steering, session_id, || {
                        collaborators.steering_writer.write(&documents, steering)
                    })
                    .await;
                if written.is_none() {
                    session.mark_degraded(StageKind::Steering);
                }
                let files = written.unwrap_or_default();
                tracing::info!(
                    session_id = %session_id,
                    stage = %StageKind::Steering,
                    files = files.len(),
                    "stage finished"
                );
                files
            }
            _ => Vec::new(),
        };

        let payload = PipelinePayload {
            intent,
            validation,
            risks,
            analysis,
            optimization,
            roi,
            summary,
            specification,
            documents,
            steering_files,
            consistency,
        };

        // Degraded results and runs with file side effects must recompute.
        if let Some(key) = pipeline_key {
            if !session.is_degraded() && steering.is_none() {
                self.cache.insert(
                    key,
                    CachedPipeline {
                        payload: payload.clone(),
                        quota_used: session.quota_used,
                    },
                    self.config.result_ttl(),
                );
            }
        }

        Ok((payload, false))
    }

    /// Run completeness validation and risk assessment side by side
    ///
    /// Either failing degrades to an empty report.
    async fn validate_parsed(
        &self,
        intent: &ParsedIntent,
        options: &IntentOptions,
        session: &mut PipelineSession,
    ) -> (IntentValidation, RiskAssessment) {
        let session_id = session.id;
        let collaborators = &self.collaborators;
        let stages = &self.stages;

        let operations: Vec<BoxedOperation<'_, SubTask, StageError>> = vec![
            Box::new(move || {
                async move {
                    stages
                        .attempt(StageKind::Validation, session_id, || {
                            collaborators.validator.validate(intent)
                        })
                        .await
                        .map(SubTask::Validation)
                }
                .boxed()
            }),
            Box::new(move || {
                async move {
                    stages
                        .attempt(StageKind::Validation, session_id, || {
                            collaborators.risk_assessor.assess(intent, options)
                        })
                        .await
                        .map(SubTask::Risks)
                }
                .boxed()
            }),
        ];
        session.add_parallel(operations.len());
        session.note_optimization("parallel-validation");

        let mut validation = None;
        let mut risks = None;
        for outcome in self.executor.execute_parallel(operations).await {
            match outcome {
                Ok(SubTask::Validation(v)) => validation = Some(v),
                Ok(SubTask::Risks(r)) => risks = Some(r),
                Err(e) => log_subtask_failure(session_id, &e),
            }
        }

        if validation.is_none() || risks.is_none() {
            session.mark_degraded(StageKind::Validation);
        }
        tracing::info!(
            session_id = %session_id,
            stage = %StageKind::Validation,
            warnings = validation.as_ref().map_or(0, |v| v.warnings.len()),
            risks = risks.as_ref().map_or(0, |r| r.risks.len()),
            "stage finished"
        );
        (validation.unwrap_or_default(), risks.unwrap_or_default())
    }

    async fn forecast(
        &self,
        session: &mut PipelineSession,
        optimization: &OptimizationResult,
        options: &IntentOptions,
    ) -> Result<RoiAnalysis, ProcessingError> {
        let forecaster = &self.collaborators.forecaster;
        self.cached_stage(
            session,
            StageKind::Forecasting,
            &(optimization, options.expected_user_volume, &options.cost_constraints),
            || forecaster.forecast(optimization, options),
            || fallback::roi(optimization),
            |roi: &RoiAnalysis| roi.scenarios.len(),
        )
        .await
    }

    /// Generate documents in parallel; failures are logged and omitted
    async fn generate_documents(
        &self,
        kinds: &[DocumentKind],
        context: &DocumentContext<'_>,
        session: &mut PipelineSession,
    ) -> Vec<GeneratedDocument> {
        let session_id = session.id;
        tracing::info!(
            session_id = %session_id,
            stage = %StageKind::Documents,
            requested = kinds.len(),
            "stage started"
        );

        let operations: Vec<_> = kinds
            .iter()
            .map(|&kind| move || self.document_task(kind, context, session_id))
            .collect();
        session.add_parallel(operations.len());
        session.note_optimization("parallel-documents");

        let mut documents = Vec::with_capacity(kinds.len());
        for (kind, outcome) in kinds.iter().zip(self.executor.execute_parallel(operations).await) {
            match outcome {
                Ok(document) => {
                    session.charge(StageKind::Documents);
                    documents.push(document);
                }
                Err(error) => {
                    session.mark_degraded(StageKind::Documents);
                    tracing::warn!(
                        session_id = %session_id,
                        stage = %StageKind::Documents,
                        document = %kind,
                        error = %error,
                        "document generation failed, omitted"
                    );
                }
            }
        }

        tracing::info!(
            session_id = %session_id,
            stage = %StageKind::Documents,
            generated = documents.len(),
            "stage finished"
        );
        documents
    }

    async fn document_task(
        &self,
        kind: DocumentKind,
        context: &DocumentContext<'_>,
        session_id: SessionId,
    ) -> Result<GeneratedDocument, StageError> {
        let key = StageCache::key(StageKind::Documents.cache_category(), &(kind, context));
        if let Some(document) = key
            .as_ref()
            .and_then(|key| self.cache.get::<GeneratedDocument>(key))
        {
            return Ok(document);
        }

        let generator = &self.collaborators.document_generator;
        let document = self
            .stages
            .attempt(StageKind::Documents, session_id, || {
                generator.generate(kind, context)
            })
            .await?;

        if let Some(key) = key {
            self.cache
                .insert(key, document.clone(), self.config.stage_ttl());
        }
        Ok(document)
    }

    /// Run one stage through the cache and the recovery executor
    ///
    /// Stage weight is charged whether the value is computed, cached or a
    /// fallback. Fallback values are not cached.
    async fn cached_stage<T, I, F, Fut, D>(
        &self,
        session: &mut PipelineSession,
        stage: StageKind,
        input: &I,
        operation: F,
        fallback: D,
        count: fn(&T) -> usize,
    ) -> Result<T, ProcessingError>
    where
        T: Clone + Send + Sync + 'static,
        I: Serialize + ?Sized,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StageError>>,
        D: FnOnce() -> T,
    {
        let session_id = session.id;
        let key = StageCache::key(stage.cache_category(), input);
        let started = Instant::now();

        let output = match key.as_ref().and_then(|key| self.cache.get::<T>(key)) {
            Some(value) => StageOutput::cached(value),
            None => {
                tracing::info!(session_id = %session_id, stage = %stage, "stage started");
                self.stages.run(stage, session_id, operation, fallback).await?
            }
        };
        session.charge(stage);

        match output.provenance {
            Provenance::Cached => session.note_optimization(format!("{stage}-cache-hit")),
            Provenance::Fallback => session.mark_degraded(stage),
            Provenance::Computed => {
                if let Some(key) = key {
                    self.cache
                        .insert(key, output.value.clone(), self.config.stage_ttl());
                }
            }
        }

        tracing::info!(
            session_id = %session_id,
            stage = %stage,
            items = count(&output.value),
            provenance = ?output.provenance,
            duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "stage finished"
        );
        Ok(output.into_value())
    }

    /// Structural checks on the raw request
    fn validate_intent<'a>(
        &self,
        raw: &'a str,
        options: &IntentOptions,
    ) -> Result<&'a str, ProcessingError> {
        let trimmed = raw.trim();
        let chars = trimmed.chars().count();

        if chars == 0 {
            return Err(ProcessingError::validation(StageKind::Intent, "intent is empty"));
        }
        if chars < self.config.min_intent_chars {
            return Err(ProcessingError::validation(
                StageKind::Intent,
                format!(
                    "intent is too short ({chars} characters, minimum {})",
                    self.config.min_intent_chars
                ),
            ));
        }
        if chars > self.config.max_intent_chars {
            return Err(ProcessingError::validation(
                StageKind::Intent,
                format!(
                    "intent is too long ({chars} characters, maximum {})",
                    self.config.max_intent_chars
                ),
            ));
        }
        validate_options(options)?;
        Ok(trimmed)
    }

    /// Reject caller-supplied effort estimates above the configured ceiling
    fn check_effort(
        &self,
        stage: StageKind,
        operations: &[AnalysisOperation],
    ) -> Result<(), ProcessingError> {
        let ceiling = self.config.max_effort_points;
        match operations.iter().find(|op| op.effort_points > ceiling) {
            Some(op) => Err(ProcessingError::validation(
                stage,
                format!(
                    "operation '{}' has {} effort points, maximum {ceiling}",
                    op.id, op.effort_points
                ),
            )),
            None => Ok(()),
        }
    }

    /// Analyze and optimize an explicit operation list
    pub async fn analyze_workflow(
        &self,
        operations: Vec<AnalysisOperation>,
    ) -> PipelineResult<OptimizationResult> {
        let mut session = PipelineSession::start();
        let span = tracing::info_span!("analyze_workflow", session_id = %session.id);

        let outcome = async {
            if operations.is_empty() {
                return Err(ProcessingError::validation(
                    StageKind::Optimization,
                    "no operations supplied",
                ));
            }
            if operations.len() > self.config.max_operations {
                return Err(ProcessingError::validation(
                    StageKind::Optimization,
                    format!(
                        "{} operations supplied, maximum {}",
                        operations.len(),
                        self.config.max_operations
                    ),
                ));
            }
            if operations.iter().any(|op| op.id.trim().is_empty()) {
                return Err(ProcessingError::validation(
                    StageKind::Optimization,
                    "every operation needs a non-empty id",
                ));
            }
            self.check_effort(StageKind::Optimization, &operations)?;

            let optimizer = &self.collaborators.optimizer;
            let result = self
                .cached_stage(
                    &mut session,
                    StageKind::Optimization,
                    &operations,
                    || optimizer.optimize(&operations, None),
                    || fallback::optimization(&operations),
                    |optimization: &OptimizationResult| optimization.optimized_operations.len(),
                )
                .await?;
            Ok((result, false))
        }
        .instrument(span)
        .await;

        self.finish("analyze_workflow", &session, outcome)
    }

    /// Price an optimization result
    pub async fn analyze_roi(
        &self,
        optimization: OptimizationResult,
        options: Option<IntentOptions>,
    ) -> PipelineResult<RoiAnalysis> {
        let mut session = PipelineSession::start();
        let options = options.unwrap_or_default();
        let span = tracing::info_span!("analyze_roi", session_id = %session.id);

        let outcome = async {
            if optimization.optimized_operations.is_empty() {
                return Err(ProcessingError::validation(
                    StageKind::Forecasting,
                    "optimization result has no operations",
                ));
            }
            self.check_effort(StageKind::Forecasting, &optimization.optimized_operations)?;
            validate_options(&options)?;
            let roi = self.forecast(&mut session, &optimization, &options).await?;
            Ok((roi, false))
        }
        .instrument(span)
        .await;

        self.finish("analyze_roi", &session, outcome)
    }

    /// Summarize an optimization and its ROI forecast
    pub async fn consulting_summary(
        &self,
        optimization: OptimizationResult,
        roi: RoiAnalysis,
    ) -> PipelineResult<ConsultingSummary> {
        let mut session = PipelineSession::start();
        let span = tracing::info_span!("consulting_summary", session_id = %session.id);

        let outcome = async {
            if roi.scenarios.is_empty() {
                return Err(ProcessingError::validation(
                    StageKind::Summary,
                    "ROI analysis has no scenarios",
                ));
            }

            let summarizer = &self.collaborators.summarizer;
            let summary = self
                .cached_stage(
                    &mut session,
                    StageKind::Summary,
                    &(None::<&BusinessAnalysis>, &optimization, &roi),
                    || summarizer.summarize(None, &optimization, &roi),
                    || fallback::summary(&optimization),
                    |summary: &ConsultingSummary| summary.recommendations.len(),
                )
                .await?;
            Ok((summary, false))
        }
        .instrument(span)
        .await;

        self.finish("consulting_summary", &session, outcome)
    }

    /// Generate one document directly from a raw intent
    pub async fn generate_document(
        &self,
        kind: DocumentKind,
        raw: &str,
        options: Option<IntentOptions>,
    ) -> PipelineResult<GeneratedDocument> {
        let mut session = PipelineSession::start();
        let options = options.unwrap_or_default();
        let span = tracing::info_span!("generate_document", session_id = %session.id, document = %kind);

        let outcome = async {
            let intent_text = self.validate_intent(raw, &options)?;
            let collaborators = &self.collaborators;

            let intent = self
                .cached_stage(
                    &mut session,
                    StageKind::Intent,
                    &(intent_text, &options),
                    || collaborators.interpreter.interpret(intent_text, &options),
                    || fallback::parsed_intent(intent_text, &options),
                    |intent: &ParsedIntent| intent.operations.len(),
                )
                .await?;

            let context = DocumentContext {
                target_date: options.target_date(),
                ..DocumentContext::from_intent(&intent)
            };
            let document = self
                .cached_stage(
                    &mut session,
                    StageKind::Documents,
                    &(kind, &context),
                    || collaborators.document_generator.generate(kind, &context),
                    || fallback::document(kind, &intent),
                    |_: &GeneratedDocument| 1,
                )
                .await?;
            Ok((document, false))
        }
        .instrument(span)
        .await;

        self.finish("generate_document", &session, outcome)
    }

    /// Pre-populate the cache by processing sample intents
    ///
    /// Samples run in batches of `max_concurrency`.
    pub async fn warmup_cache(&self, samples: Vec<String>) -> WarmupReport {
        let started = Instant::now();
        tracing::info!(samples = samples.len(), "cache warmup started");

        let operations: Vec<_> = samples
            .into_iter()
            .map(|sample| {
                move || async move {
                    let result = self.process_intent(&sample, None).await;
                    match result.error {
                        None => Ok(()),
                        Some(error) => Err(error),
                    }
                }
            })
            .collect();

        let summary = self
            .executor
            .execute_batched(operations, self.config.max_concurrency)
            .await;

        let report = WarmupReport {
            requested: summary.total,
            warmed: summary.succeeded,
            failed: summary.failed,
            batches: summary.batches,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        tracing::info!(
            warmed = report.warmed,
            failed = report.failed,
            duration_ms = report.duration_ms,
            "cache warmup finished"
        );
        report
    }

    /// Monitor snapshot
    #[inline]
    #[must_use]
    pub fn performance_metrics(&self) -> PerformanceMetrics {
        self.monitor.metrics()
    }

    /// Graded monitor summary
    #[inline]
    #[must_use]
    pub fn performance_summary(&self) -> PerformanceSummary {
        self.monitor.summary()
    }

    /// Cache statistics
    #[inline]
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every cached value
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("cache cleared");
    }

    /// Zero the monitor
    pub fn reset_metrics(&self) {
        self.monitor.reset();
        tracing::info!("performance metrics reset");
    }

    /// Stop background work and release cached values
    ///
    /// Idempotent. The orchestrator keeps working afterwards without caching.
    pub fn destroy(&self) {
        if !self.cache.is_destroyed() {
            self.cache.destroy();
            tracing::info!("orchestrator destroyed");
        }
    }

    fn finish<T>(
        &self,
        operation: &'static str,
        session: &PipelineSession,
        outcome: Result<(T, bool), ProcessingError>,
    ) -> PipelineResult<T> {
        let elapsed = session.elapsed();
        match outcome {
            Ok((payload, cache_hit)) => {
                self.monitor
                    .record_execution(elapsed, cache_hit, session.parallel_operations);
                let metadata = session.metadata(cache_hit);
                if session.is_degraded() {
                    tracing::warn!(
                        session_id = %session.id,
                        operation,
                        degraded = ?session.degraded_stages,
                        "completed with fallback values"
                    );
                }
                tracing::info!(
                    session_id = %session.id,
                    operation,
                    quota_used = metadata.quota_used,
                    cache_hit,
                    duration_ms = metadata.execution_time_ms,
                    "completed"
                );
                PipelineResult::success(payload, metadata)
            }
            Err(error) => {
                self.monitor
                    .record_execution(elapsed, false, session.parallel_operations);
                self.monitor.record_error();
                tracing::error!(
                    session_id = %session.id,
                    operation,
                    stage = %error.stage,
                    kind = %error.kind,
                    error = %error.message,
                    "failed"
                );
                PipelineResult::failure(error, session.metadata(false))
            }
        }
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}

fn validate_options(options: &IntentOptions) -> Result<(), ProcessingError> {
    if let Some(max) = options
        .cost_constraints
        .as_ref()
        .and_then(|c| c.max_cost_dollars)
    {
        if !max.is_finite() || max < 0.0 {
            return Err(ProcessingError::validation(
                StageKind::Intent,
                format!("maxCostDollars must be a non-negative number, got {max}"),
            ));
        }
    }
    if let Some(date) = options.target_date() {
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(ProcessingError::validation(
                StageKind::Intent,
                format!("targetDate must be YYYY-MM-DD, got {date:?}"),
            ));
        }
    }
    Ok(())
}

fn log_subtask_failure(session_id: SessionId, error: &ParallelError<StageError>) {
    tracing::warn!(
        session_id = %session_id,
        stage = %StageKind::Validation,
        error = %error,
        "validation sub-task failed, using empty report"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CostConstraints, DocumentOptions};

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(OrchestratorConfig::default().with_sweep_interval(std::time::Duration::ZERO))
    }

    const INTENT: &str = "Let merchants accept card payments at checkout for their customers";

    #[tokio::test]
    async fn full_pipeline_succeeds() {
        let orchestrator = orchestrator();
        let result = orchestrator.process_intent(INTENT, None).await;

        assert!(result.success, "{:?}", result.error);
        let payload = result.payload.unwrap();
        assert_eq!(payload.intent.operations.len(), 2);
        assert_eq!(payload.analysis.requirements.len(), 2);
        assert_eq!(payload.roi.scenarios.len(), 3);
        assert!(payload.documents.is_empty());
        assert!(payload.consistency.is_none());
        assert_eq!(result.metadata.quota_used, 8);
        assert!(!result.metadata.cache_hit);
        assert!(result.metadata.degraded_stages.is_empty());
    }

    #[tokio::test]
    async fn empty_intent_fails_validation() {
        let orchestrator = orchestrator();
        let result = orchestrator.process_intent("   ", None).await;

        assert!(!result.success);
        let error = result.error.unwrap();
        assert_eq!(error.stage, StageKind::Intent);
        assert_eq!(error.kind, crate::error::ProcessingErrorKind::Validation);
        assert_eq!(orchestrator.cache_stats().size, 0);
        assert_eq!(orchestrator.performance_metrics().error_count, 1);
    }

    #[tokio::test]
    async fn short_intent_fails_validation() {
        let result = orchestrator().process_intent("hi", None).await;
        assert!(result.error.unwrap().message.contains("too short"));
    }

    #[tokio::test]
    async fn malformed_options_fail_validation() {
        let orchestrator = orchestrator();
        let bad_budget = IntentOptions::new().with_cost_constraints(CostConstraints {
            max_cost_dollars: Some(-5.0),
            ..CostConstraints::default()
        });
        assert!(!orchestrator.process_intent(INTENT, Some(bad_budget)).await.success);

        let bad_date = IntentOptions::new()
            .with_documents(DocumentOptions::new([DocumentKind::PrFaq]).with_target_date("next week"));
        let result = orchestrator.process_intent(INTENT, Some(bad_date)).await;
        assert!(result.error.unwrap().message.contains("targetDate"));
    }

    #[tokio::test]
    async fn second_call_hits_pipeline_cache() {
        let orchestrator = orchestrator();
        let first = orchestrator.process_intent(INTENT, None).await;
        let second = orchestrator.process_intent(INTENT, None).await;

        assert!(second.metadata.cache_hit);
        assert_ne!(first.metadata.session_id, second.metadata.session_id);
        assert_eq!(first.payload, second.payload);
        assert_eq!(second.metadata.quota_used, 8);
        assert!(second
            .metadata
            .optimizations_applied
            .contains(&"pipeline-cache-hit".to_string()));
    }

    #[tokio::test]
    async fn whitespace_variants_share_cache_entry() {
        let orchestrator = orchestrator();
        orchestrator.process_intent(INTENT, None).await;
        let padded = format!("  {INTENT}\n");
        assert!(orchestrator.process_intent(&padded, None).await.metadata.cache_hit);
    }

    #[tokio::test]
    async fn documents_are_charged_per_document() {
        let orchestrator = orchestrator();
        let options = IntentOptions::new().with_documents(DocumentOptions::new([
            DocumentKind::ManagementOnePager,
            DocumentKind::Requirements,
            DocumentKind::Requirements,
        ]));

        let result = orchestrator.process_intent(INTENT, Some(options)).await;
        let payload = result.payload.unwrap();
        assert_eq!(payload.documents.len(), 2);
        assert_eq!(result.metadata.quota_used, 10);
        assert!(payload.consistency.is_some());
    }

    #[tokio::test]
    async fn direct_entry_points() {
        let orchestrator = orchestrator();

        let workflow = orchestrator
            .analyze_workflow(vec![
                AnalysisOperation::new("op-a", "Search", "backend", 5),
                AnalysisOperation::new("op-b", "API", "backend", 5),
            ])
            .await;
        assert!(workflow.success);
        assert_eq!(workflow.metadata.quota_used, 1);
        let optimization = workflow.payload.unwrap();
        assert_eq!(optimization.optimized_operations.len(), 1);

        let roi = orchestrator.analyze_roi(optimization.clone(), None).await;
        assert_eq!(roi.metadata.quota_used, 2);
        let roi = roi.payload.unwrap();

        let summary = orchestrator.consulting_summary(optimization, roi).await;
        assert!(summary.success);
        assert_eq!(summary.metadata.quota_used, 1);

        let document = orchestrator
            .generate_document(DocumentKind::PrFaq, INTENT, None)
            .await;
        assert!(document.success);
        assert_eq!(document.payload.unwrap().kind, DocumentKind::PrFaq);
        assert_eq!(document.metadata.quota_used, 2);
    }

    #[tokio::test]
    async fn direct_entry_points_validate_input() {
        let orchestrator = orchestrator();
        let result = orchestrator.analyze_workflow(Vec::new()).await;
        assert_eq!(result.error.unwrap().stage, StageKind::Optimization);

        let too_many = (0..=orchestrator.config().max_operations)
            .map(|i| AnalysisOperation::new(format!("op-{i}"), "Op", "general", 1))
            .collect();
        assert!(!orchestrator.analyze_workflow(too_many).await.success);
    }

    #[tokio::test]
    async fn destroy_is_idempotent_and_disables_caching() {
        let orchestrator = orchestrator();
        orchestrator.destroy();
        orchestrator.destroy();

        let first = orchestrator.process_intent(INTENT, None).await;
        let second = orchestrator.process_intent(INTENT, None).await;
        assert!(first.success && second.success);
        assert!(!second.metadata.cache_hit);
        assert_eq!(orchestrator.cache_stats().size, 0);
    }

    #[tokio::test]
    async fn operational_controls() {
        let orchestrator = orchestrator();
        orchestrator.process_intent(INTENT, None).await;
        assert!(orchestrator.cache_stats().size > 0);
        assert_eq!(orchestrator.performance_metrics().execution_count, 1);

        orchestrator.clear_cache();
        orchestrator.reset_metrics();
        assert_eq!(orchestrator.cache_stats().size, 0);
        assert_eq!(orchestrator.performance_metrics().execution_count, 0);
    }
}
