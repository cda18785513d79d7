//! Uniform error recovery for pipeline stages
//!
//! Every stage runs through [`StageExecutor`]. Stages themselves contain no
//! retry or fallback logic; they return `StageError` and the executor decides:
//!
//! 1. Retry while the error is retryable and attempts remain
//! 2. Fatal error (validation, parse) → `ProcessingError`, pipeline halts
//! 3. Any other error → fallback value, logged at WARN
//!
//! A panicking operation counts as `StageError::Internal`.

use crate::config::{OrchestratorConfig, RetryPolicy};
use crate::error::{ProcessingError, StageError};
use crate::parallel::panic_message;
use crate::types::{SessionId, StageKind, StageOutput};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// Runs stage operations under the configured retry policies
#[derive(Debug, Clone, Copy)]
pub struct StageExecutor {
    intent_retry: RetryPolicy,
    stage_retry: RetryPolicy,
}

impl StageExecutor {
    /// Create executor with explicit policies
    #[inline]
    #[must_use]
    pub fn new(intent_retry: RetryPolicy, stage_retry: RetryPolicy) -> Self {
        Self {
            intent_retry,
            stage_retry,
        }
    }

    /// Create executor from configuration
    #[inline]
    #[must_use]
    pub fn from_config(config: &OrchestratorConfig) -> Self {
        Self::new(config.intent_retry, config.stage_retry)
    }

    /// Policy applied to `stage`
    #[inline]
    #[must_use]
    pub fn policy_for(&self, stage: StageKind) -> RetryPolicy {
        match stage {
            StageKind::Intent => self.intent_retry,
            _ => self.stage_retry,
        }
    }

    /// Run `operation` until it succeeds, fails terminally or runs out of
    /// attempts
    ///
    /// # Errors
    /// Returns the last `StageError` observed
    pub async fn attempt<T, F, Fut>(
        &self,
        stage: StageKind,
        session_id: SessionId,
        mut operation: F,
    ) -> Result<T, StageError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StageError>>,
    {
        let policy = self.policy_for(stage);
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let guarded = AssertUnwindSafe(async { operation().await }).catch_unwind();
            let caught = match policy.timeout() {
                Some(limit) => tokio::time::timeout(limit, guarded)
                    .await
                    .unwrap_or_else(|_| {
                        Ok(Err(StageError::Timeout {
                            after_ms: policy.timeout_ms.unwrap_or_default(),
                        }))
                    }),
                None => guarded.await,
            };
            let outcome = caught.unwrap_or_else(|panic| {
                Err(StageError::Internal(format!(
                    "operation panicked: {}",
                    panic_message(panic.as_ref())
                )))
            });

            match outcome {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(
                        session_id = %session_id,
                        stage = %stage,
                        attempt,
                        max_attempts,
                        error = %error,
                        "stage attempt failed, retrying"
                    );
                    tokio::time::sleep(policy.delay()).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Run a stage that has a fallback
    ///
    /// # Errors
    /// Returns `ProcessingError` only when the failure is fatal
    pub async fn run<T, F, Fut, D>(
        &self,
        stage: StageKind,
        session_id: SessionId,
        operation: F,
        fallback: D,
    ) -> Result<StageOutput<T>, ProcessingError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StageError>>,
        D: FnOnce() -> T,
    {
        match self.attempt(stage, session_id, operation).await {
            Ok(value) => Ok(StageOutput::computed(value)),
            Err(error) if error.is_fatal() => {
                tracing::error!(
                    session_id = %session_id,
                    stage = %stage,
                    error = %error,
                    "stage failed fatally"
                );
                Err(ProcessingError::from_stage(stage, &error, true))
            }
            Err(error) => {
                tracing::warn!(
                    session_id = %session_id,
                    stage = %stage,
                    error = %error,
                    "stage failed, substituting fallback"
                );
                Ok(StageOutput::fallback(fallback()))
            }
        }
    }

    /// Run a best-effort stage; any failure is logged and yields `None`
    pub async fn run_optional<T, F, Fut>(
        &self,
        stage: StageKind,
        session_id: SessionId,
        operation: F,
    ) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StageError>>,
    {
        match self.attempt(stage, session_id, operation).await {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(
                    session_id = %session_id,
                    stage = %stage,
                    error = %error,
                    "optional stage failed, output omitted"
                );
                None
            }
        }
    }
}

impl Default for StageExecutor {
    fn default() -> Self {
        Self::from_config(&OrchestratorConfig::default())
    }
}
