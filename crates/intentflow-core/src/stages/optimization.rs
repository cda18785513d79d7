//! Workflow optimization by category merging

use crate::collaborators::WorkflowOptimizer;
use crate::error::StageError;
use crate::model::{
    AnalysisOperation, BusinessAnalysis, Optimization, OptimizationResult, Priority,
};
use async_trait::async_trait;

/// Merges operations that share a category and orders by priority
///
/// A merged group keeps 80% of its combined effort (rounded up); the rest is
/// reported as saved.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryOptimizer;

impl CategoryOptimizer {
    /// Optimize synchronously
    ///
    /// # Errors
    /// `StageError::Validation` if `operations` is empty
    pub fn plan(
        operations: &[AnalysisOperation],
        analysis: Option<&BusinessAnalysis>,
    ) -> Result<OptimizationResult, StageError> {
        if operations.is_empty() {
            return Err(StageError::Validation("no operations to optimize".into()));
        }

        let mut groups: Vec<(String, Vec<&AnalysisOperation>)> = Vec::new();
        for op in operations {
            match groups.iter_mut().find(|(category, _)| *category == op.category) {
                Some((_, members)) => members.push(op),
                None => groups.push((op.category.clone(), vec![op])),
            }
        }

        let mut optimized = Vec::with_capacity(groups.len());
        let mut optimizations = Vec::new();
        for (category, members) in groups {
            if let [single] = members.as_slice() {
                optimized.push((*single).clone());
                continue;
            }

            let combined: u64 = members.iter().map(|op| u64::from(op.effort_points)).sum();
            let merged = combined.saturating_mul(4).div_ceil(5);
            let names: Vec<&str> = members.iter().map(|op| op.name.as_str()).collect();
            let priority = members
                .iter()
                .map(|op| op.priority)
                .min()
                .unwrap_or(Priority::Medium);

            optimized.push(
                AnalysisOperation::new(
                    format!("op-merged-{category}"),
                    names.join(" + "),
                    category.clone(),
                    clamp_points(merged),
                )
                .with_description(format!("Deliver {} together", names.join(", ")))
                .with_priority(priority),
            );
            optimizations.push(Optimization {
                kind: "merge".to_string(),
                description: format!("Merged {} {category} operations", members.len()),
                effort_saved: clamp_points(combined - merged),
            });
        }

        let before: Vec<String> = optimized.iter().map(|op| op.id.clone()).collect();
        optimized.sort_by_key(|op| op.priority);
        if optimized.iter().map(|op| &op.id).ne(before.iter()) {
            optimizations.push(Optimization {
                kind: "reorder".to_string(),
                description: "Scheduled high-priority operations first".to_string(),
                effort_saved: 0,
            });
        }

        if let Some(analysis) = analysis {
            if analysis.complexity_score >= 7 && optimized.len() > 1 {
                optimizations.push(Optimization {
                    kind: "parallelize".to_string(),
                    description: format!(
                        "Run {} independent workstreams in parallel",
                        optimized.len()
                    ),
                    effort_saved: 0,
                });
            }
        }

        let original: u64 = operations.iter().map(|op| u64::from(op.effort_points)).sum();
        let saved: u64 = optimizations.iter().map(|o| u64::from(o.effort_saved)).sum();
        #[allow(clippy::cast_precision_loss)]
        let efficiency_gain_percent = if original == 0 {
            0.0
        } else {
            saved as f64 / original as f64 * 100.0
        };

        Ok(OptimizationResult {
            original_operation_count: operations.len(),
            optimized_operations: optimized,
            optimizations,
            efficiency_gain_percent,
        })
    }
}

fn clamp_points(points: u64) -> u32 {
    u32::try_from(points).unwrap_or(u32::MAX)
}

#[async_trait]
impl WorkflowOptimizer for CategoryOptimizer {
    async fn optimize(
        &self,
        operations: &[AnalysisOperation],
        analysis: Option<&BusinessAnalysis>,
    ) -> Result<OptimizationResult, StageError> {
        Self::plan(operations, analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops() -> Vec<AnalysisOperation> {
        vec![
            AnalysisOperation::new("op-a", "Search", "backend", 5),
            AnalysisOperation::new("op-b", "Checkout", "frontend", 5).with_priority(Priority::High),
            AnalysisOperation::new("op-c", "Public API", "backend", 5),
        ]
    }

    #[test]
    fn merges_same_category() {
        let result = CategoryOptimizer::plan(&ops(), None).unwrap();

        assert_eq!(result.original_operation_count, 3);
        assert_eq!(result.optimized_operations.len(), 2);
        let merged = result
            .optimized_operations
            .iter()
            .find(|op| op.id == "op-merged-backend")
            .unwrap();
        assert_eq!(merged.effort_points, 8);
        assert_eq!(result.optimizations[0].effort_saved, 2);
        assert!((result.efficiency_gain_percent - 2.0 / 15.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn high_priority_first() {
        let result = CategoryOptimizer::plan(&ops(), None).unwrap();
        assert_eq!(result.optimized_operations[0].id, "op-b");
        assert!(result.optimizations.iter().any(|o| o.kind == "reorder"));
    }

    #[test]
    fn single_operation_passes_through() {
        let single = vec![AnalysisOperation::new("op-x", "Only", "general", 3)];
        let result = CategoryOptimizer::plan(&single, None).unwrap();
        assert_eq!(result.optimized_operations, single);
        assert!(result.optimizations.is_empty());
        assert!(result.efficiency_gain_percent.abs() < f64::EPSILON);
    }

    #[test]
    fn large_efforts_do_not_overflow() {
        let huge = vec![
            AnalysisOperation::new("op-a", "Ingest", "backend", 600_000_000),
            AnalysisOperation::new("op-b", "Export", "backend", 600_000_000),
        ];
        let result = CategoryOptimizer::plan(&huge, None).unwrap();
        assert_eq!(result.optimized_operations[0].effort_points, 960_000_000);
        assert_eq!(result.optimizations[0].effort_saved, 240_000_000);
        assert!((result.efficiency_gain_percent - 20.0).abs() < 1e-9);

        let saturated = vec![
            AnalysisOperation::new("op-a", "Ingest", "backend", u32::MAX),
            AnalysisOperation::new("op-b", "Export", "backend", u32::MAX),
            AnalysisOperation::new("op-c", "Report", "data", 1),
        ];
        let result = CategoryOptimizer::plan(&saturated, None).unwrap();
        let merged = result
            .optimized_operations
            .iter()
            .find(|op| op.id == "op-merged-backend")
            .unwrap();
        assert_eq!(merged.effort_points, u32::MAX);
        assert_eq!(result.total_effort(), u32::MAX);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(CategoryOptimizer::plan(&[], None).unwrap_err().is_fatal());
    }
}
