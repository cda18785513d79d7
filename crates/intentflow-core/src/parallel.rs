//! Bounded parallel executor
//!
//! Runs independent asynchronous operations with a fixed ceiling on how many
//! are in flight. Operations are multiplexed on the calling task, never
//! spawned, so "parallel" means interleaved I/O-bound work rather than CPU
//! parallelism.
//!
//! - Results come back in submission order regardless of completion order
//! - A failing or panicking operation only affects its own slot
//! - No implicit timeout: wrap an operation with [`with_timeout`] before
//!   submitting it if it needs a deadline. An operation that never settles
//!   holds its slot forever.

use futures::future::{join_all, BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub use tokio::time::error::Elapsed;

/// Heterogeneous operation, for batches whose closures differ in type
pub type BoxedOperation<'a, T, E> = Box<dyn FnOnce() -> BoxFuture<'a, Result<T, E>> + Send + 'a>;

/// Per-slot failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParallelError<E> {
    /// Operation returned an error
    #[error("operation failed: {0}")]
    Failed(E),

    /// Operation panicked
    #[error("operation panicked: {0}")]
    Panicked(String),
}

impl<E> ParallelError<E> {
    /// The operation's own error, if it returned one
    #[inline]
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Panicked(_) => None,
        }
    }
}

/// Outcome counts for [`BoundedExecutor::execute_batched`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Operations submitted
    pub total: usize,
    /// Operations that returned `Ok`
    pub succeeded: usize,
    /// Operations that failed or panicked
    pub failed: usize,
    /// Batches run
    pub batches: usize,
}

/// Executor with a fixed concurrency ceiling
#[derive(Debug)]
pub struct BoundedExecutor {
    max_concurrency: usize,
    operations_total: AtomicU64,
}

impl BoundedExecutor {
    /// Create executor allowing `max_concurrency` operations in flight
    ///
    /// A ceiling of zero is treated as one.
    #[inline]
    #[must_use]
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            operations_total: AtomicU64::new(0),
        }
    }

    /// Concurrency ceiling
    #[inline]
    #[must_use]
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Operations submitted over the executor's lifetime
    #[inline]
    #[must_use]
    pub fn operations_total(&self) -> u64 {
        self.operations_total.load(Ordering::Relaxed)
    }

    /// Run every operation, at most `max_concurrency` at a time
    ///
    /// The returned vector has one slot per operation, in submission order.
    pub async fn execute_parallel<T, E, F, Fut>(
        &self,
        operations: Vec<F>,
    ) -> Vec<Result<T, ParallelError<E>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let count = operations.len();
        if count == 0 {
            return Vec::new();
        }
        self.operations_total
            .fetch_add(count as u64, Ordering::Relaxed);

        let mut slots: Vec<Option<Result<T, ParallelError<E>>>> =
            std::iter::repeat_with(|| None).take(count).collect();

        let mut in_flight = stream::iter(operations.into_iter().enumerate())
            .map(|(index, operation)| async move { (index, run_isolated(operation).await) })
            .buffer_unordered(self.max_concurrency);

        while let Some((index, outcome)) = in_flight.next().await {
            slots[index] = Some(outcome);
        }

        let results: Vec<_> = slots.into_iter().flatten().collect();
        debug_assert_eq!(results.len(), count);
        results
    }

    /// Run operations in sequential batches of `batch_size`
    ///
    /// Each batch runs concurrently and completes fully before the next one
    /// starts, so at most `batch_size` operations are ever in flight.
    pub async fn execute_batched<T, E, F, Fut>(
        &self,
        operations: Vec<F>,
        batch_size: usize,
    ) -> BatchSummary
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let batch_size = batch_size.max(1);
        let mut summary = BatchSummary {
            total: operations.len(),
            ..BatchSummary::default()
        };
        self.operations_total
            .fetch_add(operations.len() as u64, Ordering::Relaxed);

        let mut remaining = operations.into_iter();
        loop {
            let batch: Vec<F> = remaining.by_ref().take(batch_size).collect();
            if batch.is_empty() {
                break;
            }
            summary.batches += 1;

            let outcomes = join_all(batch.into_iter().map(run_isolated)).await;
            for outcome in outcomes {
                match outcome {
                    Ok(_) => summary.succeeded += 1,
                    Err(_) => summary.failed += 1,
                }
            }
            tracing::debug!(
                batch = summary.batches,
                succeeded = summary.succeeded,
                failed = summary.failed,
                "batch completed"
            );
        }

        summary
    }
}

impl Default for BoundedExecutor {
    fn default() -> Self {
        Self::new(4)
    }
}

/// Race `future` against a timer
///
/// # Errors
/// Returns `Elapsed` if `duration` passes before the future settles
pub async fn with_timeout<F: Future>(duration: Duration, future: F) -> Result<F::Output, Elapsed> {
    tokio::time::timeout(duration, future).await
}

async fn run_isolated<T, E, F, Fut>(operation: F) -> Result<T, ParallelError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match AssertUnwindSafe(async move { operation().await })
        .catch_unwind()
        .await
    {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(ParallelError::Failed(error)),
        Err(panic) => Err(ParallelError::Panicked(panic_message(panic.as_ref()))),
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
