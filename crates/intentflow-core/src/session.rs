//! Per-invocation bookkeeping
//!
//! A `PipelineSession` is created at the start of every orchestrator call,
//! owned by that call alone, and folded into the result metadata when the
//! call completes.

use crate::types::{ResultMetadata, SessionId, StageKind};
use std::time::{Duration, Instant};

/// State accumulated while one pipeline invocation runs
#[derive(Debug, Clone)]
pub struct PipelineSession {
    /// Session identifier
    pub id: SessionId,
    /// Monotonic start time
    pub started_at: Instant,
    /// Quota units charged so far
    pub quota_used: u32,
    /// Operations run through the parallel executor
    pub parallel_operations: u32,
    /// Stages that used a fallback value
    pub degraded_stages: Vec<StageKind>,
    /// Orchestration shortcuts taken
    pub optimizations_applied: Vec<String>,
}

impl PipelineSession {
    /// Start a new session
    #[must_use]
    pub fn start() -> Self {
        Self {
            id: SessionId::new(),
            started_at: Instant::now(),
            quota_used: 0,
            parallel_operations: 0,
            degraded_stages: Vec::new(),
            optimizations_applied: Vec::new(),
        }
    }

    /// Charge the fixed weight of `stage`
    #[inline]
    pub fn charge(&mut self, stage: StageKind) {
        self.charge_units(stage.quota_weight());
    }

    /// Charge an explicit number of units
    #[inline]
    pub fn charge_units(&mut self, units: u32) {
        self.quota_used = self.quota_used.saturating_add(units);
    }

    /// Count operations fanned out through the executor
    #[inline]
    pub fn add_parallel(&mut self, operations: usize) {
        let operations = u32::try_from(operations).unwrap_or(u32::MAX);
        self.parallel_operations = self.parallel_operations.saturating_add(operations);
    }

    /// Record that `stage` fell back to a substitute value
    pub fn mark_degraded(&mut self, stage: StageKind) {
        if !self.degraded_stages.contains(&stage) {
            self.degraded_stages.push(stage);
        }
    }

    /// Record an orchestration shortcut (deduplicated)
    pub fn note_optimization(&mut self, optimization: impl Into<String>) {
        let optimization = optimization.into();
        if !self.optimizations_applied.contains(&optimization) {
            self.optimizations_applied.push(optimization);
        }
    }

    /// Whether any stage degraded
    #[inline]
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.degraded_stages.is_empty()
    }

    /// Time since the session started
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Snapshot as result metadata
    #[must_use]
    pub fn metadata(&self, cache_hit: bool) -> ResultMetadata {
        ResultMetadata {
            execution_time_ms: u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX),
            session_id: self.id,
            quota_used: self.quota_used,
            optimizations_applied: self.optimizations_applied.clone(),
            cache_hit,
            degraded_stages: self.degraded_stages.clone(),
        }
    }
}

impl Default for PipelineSession {
    fn default() -> Self {
        Self::start()
    }
}
