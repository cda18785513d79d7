//! Property tests for the bounded executor.
//!
//! For any mix of delays, failures and ceilings:
//! - every operation gets exactly one slot, in submission order
//! - the number in flight never exceeds the ceiling
//! - batched execution accounts for every operation

use intentflow_core::{BoundedExecutor, ParallelError};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn slots_follow_submission_order(
        jobs in prop::collection::vec((0u64..50, any::<bool>()), 0..24),
        ceiling in 1usize..6,
    ) {
        let executor = BoundedExecutor::new(ceiling);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let operations: Vec<_> = jobs
            .iter()
            .enumerate()
            .map(|(index, &(delay, fails))| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                move || async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    if fails { Err(index) } else { Ok(index) }
                }
            })
            .collect();

        let results = runtime().block_on(executor.execute_parallel(operations));

        prop_assert_eq!(results.len(), jobs.len());
        for (index, (result, &(_, fails))) in results.iter().zip(&jobs).enumerate() {
            if fails {
                prop_assert_eq!(result, &Err(ParallelError::Failed(index)));
            } else {
                prop_assert_eq!(result, &Ok(index));
            }
        }
        prop_assert!(peak.load(Ordering::SeqCst) <= ceiling);
    }

    #[test]
    fn batches_account_for_every_operation(
        outcomes in prop::collection::vec(any::<bool>(), 0..30),
        batch_size in 1usize..8,
    ) {
        let executor = BoundedExecutor::new(batch_size);
        let operations: Vec<_> = outcomes
            .iter()
            .map(|&ok| move || async move { if ok { Ok(()) } else { Err(()) } })
            .collect();

        let summary = runtime().block_on(executor.execute_batched(operations, batch_size));

        let succeeded = outcomes.iter().filter(|&&ok| ok).count();
        prop_assert_eq!(summary.total, outcomes.len());
        prop_assert_eq!(summary.succeeded, succeeded);
        prop_assert_eq!(summary.failed, outcomes.len() - succeeded);
        prop_assert_eq!(summary.batches, outcomes.len().div_ceil(batch_size));
    }
}
