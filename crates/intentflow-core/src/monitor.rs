//! Performance monitoring
//!
//! Aggregates counts and durations across orchestrator calls and turns them
//! into a status with recommendations.
//!
//! # Features
//!
//! - One lock, held only for the duration of a counter update
//! - Duration tracking with a sliding window (last 1000 entries) for p95
//! - Derived averages and rates computed at snapshot time

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

/// Durations kept for percentile estimates
const DURATION_WINDOW: usize = 1_000;

/// Minimum executions before hit rate is judged
const MIN_EXECUTIONS_FOR_HIT_RATE: u64 = 10;

/// Point-in-time view of the monitor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Calls recorded (successful or not)
    pub execution_count: u64,
    /// Sum of all call durations
    pub total_duration_ms: u64,
    /// Calls that ended in a fatal error
    pub error_count: u64,
    /// Calls answered from the pipeline cache
    pub cache_hits: u64,
    /// Calls that ran the pipeline
    pub cache_misses: u64,
    /// Operations fanned out through the parallel executor
    pub parallel_operations_total: u64,
    /// `total_duration_ms / execution_count`
    pub average_execution_ms: f64,
    /// 95th percentile over the recent window
    pub p95_execution_ms: u64,
    /// `cache_hits / execution_count`
    pub cache_hit_rate: f64,
    /// `error_count / execution_count`
    pub error_rate: f64,
}

/// Overall health grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceStatus {
    /// avg < 1s, errors < 5%
    Excellent,
    /// avg < 3s, errors < 10%
    Good,
    /// avg < 5s, errors < 20%
    Acceptable,
    /// Anything worse
    Poor,
}

impl PerformanceStatus {
    /// Grade an average latency and error rate
    #[must_use]
    pub fn grade(average_ms: f64, error_rate: f64) -> Self {
        if average_ms < 1_000.0 && error_rate < 0.05 {
            Self::Excellent
        } else if average_ms < 3_000.0 && error_rate < 0.10 {
            Self::Good
        } else if average_ms < 5_000.0 && error_rate < 0.20 {
            Self::Acceptable
        } else {
            Self::Poor
        }
    }
}

impl fmt::Display for PerformanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Acceptable => "acceptable",
            Self::Poor => "poor",
        })
    }
}

/// Status plus human-readable advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    /// Overall grade
    pub status: PerformanceStatus,
    /// Mean call duration
    pub average_execution_ms: f64,
    /// Fraction of calls that failed
    pub error_rate: f64,
    /// Fraction of calls served from cache
    pub cache_hit_rate: f64,
    /// What to look at next
    pub recommendations: Vec<String>,
}

#[derive(Debug, Default)]
struct MonitorState {
    execution_count: u64,
    total_duration: Duration,
    error_count: u64,
    cache_hits: u64,
    cache_misses: u64,
    parallel_operations_total: u64,
    recent: VecDeque<Duration>,
}

/// Thread-safe metrics collector
#[derive(Debug, Default)]
pub struct PerformanceMonitor {
    state: Mutex<MonitorState>,
}

impl PerformanceMonitor {
    /// Create empty monitor
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed call
    pub fn record_execution(&self, duration: Duration, cache_hit: bool, parallel_operations: u32) {
        let mut state = self.state.lock();
        state.execution_count += 1;
        state.total_duration += duration;
        if cache_hit {
            state.cache_hits += 1;
        } else {
            state.cache_misses += 1;
        }
        state.parallel_operations_total += u64::from(parallel_operations);
        state.recent.push_back(duration);
        if state.recent.len() > DURATION_WINDOW {
            state.recent.pop_front();
        }
    }

    /// Record one failed call
    pub fn record_error(&self) {
        self.state.lock().error_count += 1;
    }

    /// Snapshot with derived values
    #[must_use]
    pub fn metrics(&self) -> PerformanceMetrics {
        let state = self.state.lock();
        let total_duration_ms = u64::try_from(state.total_duration.as_millis()).unwrap_or(u64::MAX);

        #[allow(clippy::cast_precision_loss)]
        let (average_execution_ms, cache_hit_rate, error_rate) = if state.execution_count == 0 {
            (0.0, 0.0, 0.0)
        } else {
            let count = state.execution_count as f64;
            (
                total_duration_ms as f64 / count,
                state.cache_hits as f64 / count,
                (state.error_count as f64 / count).min(1.0),
            )
        };

        PerformanceMetrics {
            execution_count: state.execution_count,
            total_duration_ms,
            error_count: state.error_count,
            cache_hits: state.cache_hits,
            cache_misses: state.cache_misses,
            parallel_operations_total: state.parallel_operations_total,
            average_execution_ms,
            p95_execution_ms: p95(&state.recent),
            cache_hit_rate,
            error_rate,
        }
    }

    /// Grade current metrics and suggest follow-ups
    #[must_use]
    pub fn summary(&self) -> PerformanceSummary {
        let metrics = self.metrics();
        let status = PerformanceStatus::grade(metrics.average_execution_ms, metrics.error_rate);

        let mut recommendations = Vec::new();
        if metrics.execution_count == 0 {
            recommendations.push("No executions recorded yet".to_string());
        } else {
            if metrics.average_execution_ms >= 3_000.0 {
                recommendations.push(format!(
                    "Average execution of {:.0}ms is high; raise max_concurrency or warm the cache with common intents",
                    metrics.average_execution_ms
                ));
            }
            if metrics.execution_count >= MIN_EXECUTIONS_FOR_HIT_RATE && metrics.cache_hit_rate < 0.2 {
                recommendations.push(format!(
                    "Cache hit rate is {:.0}%; consider longer result TTLs or cache warmup",
                    metrics.cache_hit_rate * 100.0
                ));
            }
            if metrics.error_rate > 0.05 {
                recommendations.push(format!(
                    "Error rate is {:.1}%; inspect failing stages in the logs",
                    metrics.error_rate * 100.0
                ));
            }
            if recommendations.is_empty() {
                recommendations.push("Performance is within targets".to_string());
            }
        }

        PerformanceSummary {
            status,
            average_execution_ms: metrics.average_execution_ms,
            error_rate: metrics.error_rate,
            cache_hit_rate: metrics.cache_hit_rate,
            recommendations,
        }
    }

    /// Zero every counter
    pub fn reset(&self) {
        *self.state.lock() = MonitorState::default();
    }
}

fn p95(window: &VecDeque<Duration>) -> u64 {
    if window.is_empty() {
        return 0;
    }
    let mut sorted: Vec<Duration> = window.iter().copied().collect();
    sorted.sort_unstable();
    let rank = (sorted.len() * 95).div_ceil(100).max(1) - 1;
    u64::try_from(sorted[rank].as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn empty_monitor_is_excellent() {
        let monitor = PerformanceMonitor::new();
        let summary = monitor.summary();
        assert_eq!(summary.status, PerformanceStatus::Excellent);
        assert_eq!(summary.recommendations, vec!["No executions recorded yet"]);
        assert_eq!(monitor.metrics().p95_execution_ms, 0);
    }

    #[test]
    fn averages_and_rates() {
        let monitor = PerformanceMonitor::new();
        monitor.record_execution(ms(100), false, 2);
        monitor.record_execution(ms(300), true, 0);
        monitor.record_error();

        let metrics = monitor.metrics();
        assert_eq!(metrics.execution_count, 2);
        assert_eq!(metrics.total_duration_ms, 400);
        assert!((metrics.average_execution_ms - 200.0).abs() < f64::EPSILON);
        assert!((metrics.cache_hit_rate - 0.5).abs() < f64::EPSILON);
        assert!((metrics.error_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(metrics.cache_misses, 1);
        assert_eq!(metrics.parallel_operations_total, 2);
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(PerformanceStatus::grade(999.0, 0.049), PerformanceStatus::Excellent);
        assert_eq!(PerformanceStatus::grade(1_000.0, 0.0), PerformanceStatus::Good);
        assert_eq!(PerformanceStatus::grade(500.0, 0.05), PerformanceStatus::Good);
        assert_eq!(PerformanceStatus::grade(2_999.0, 0.099), PerformanceStatus::Good);
        assert_eq!(PerformanceStatus::grade(3_000.0, 0.0), PerformanceStatus::Acceptable);
        assert_eq!(PerformanceStatus::grade(4_999.0, 0.199), PerformanceStatus::Acceptable);
        assert_eq!(PerformanceStatus::grade(5_000.0, 0.0), PerformanceStatus::Poor);
        assert_eq!(PerformanceStatus::grade(100.0, 0.2), PerformanceStatus::Poor);
    }

    #[test]
    fn fast_error_free_runs_grade_excellent() {
        let monitor = PerformanceMonitor::new();
        for _ in 0..10 {
            monitor.record_execution(ms(500), false, 0);
        }
        let summary = monitor.summary();
        assert!((summary.average_execution_ms - 500.0).abs() < f64::EPSILON);
        assert_eq!(summary.status, PerformanceStatus::Excellent);
    }

    #[test]
    fn slow_runs_never_grade_excellent() {
        let monitor = PerformanceMonitor::new();
        for _ in 0..10 {
            monitor.record_execution(ms(6_000), false, 0);
        }
        let summary = monitor.summary();
        assert_ne!(summary.status, PerformanceStatus::Excellent);
        assert_eq!(summary.status, PerformanceStatus::Poor);
    }

    #[test]
    fn slow_calls_produce_recommendation() {
        let monitor = PerformanceMonitor::new();
        monitor.record_execution(ms(4_000), false, 0);
        let summary = monitor.summary();
        assert_eq!(summary.status, PerformanceStatus::Acceptable);
        assert!(summary.recommendations[0].contains("max_concurrency"));
    }

    #[test]
    fn low_hit_rate_needs_enough_samples() {
        let monitor = PerformanceMonitor::new();
        for _ in 0..9 {
            monitor.record_execution(ms(10), false, 0);
        }
        assert_eq!(monitor.summary().recommendations, vec!["Performance is within targets"]);

        monitor.record_execution(ms(10), false, 0);
        assert!(monitor.summary().recommendations[0].contains("hit rate"));
    }

    #[test]
    fn p95_uses_recent_window() {
        let monitor = PerformanceMonitor::new();
        for i in 1..=100 {
            monitor.record_execution(ms(i), false, 0);
        }
        assert_eq!(monitor.metrics().p95_execution_ms, 95);
    }

    #[test]
    fn window_is_bounded() {
        let monitor = PerformanceMonitor::new();
        for _ in 0..(DURATION_WINDOW + 50) {
            monitor.record_execution(ms(1), false, 0);
        }
        assert_eq!(monitor.state.lock().recent.len(), DURATION_WINDOW);
    }

    #[test]
    fn reset_clears_everything() {
        let monitor = PerformanceMonitor::new();
        monitor.record_execution(ms(50), true, 3);
        monitor.record_error();
        monitor.reset();
        assert_eq!(monitor.metrics(), PerformanceMetrics::default());
    }
}
