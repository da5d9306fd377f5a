//! Routing metrics collection
//!
//! Emits dispatch and failover metrics through the `metrics` facade and
//! offers an in-memory aggregator for end-of-run summaries.

use std::collections::HashMap;

use contracts::{CategoryId, WriteFailure};
use metrics::{counter, gauge, histogram};

/// Record successfully dispatched records
pub fn record_records_dispatched(count: u64) {
    counter!("logroute_records_dispatched_total").increment(count);
}

/// Record one failed write attempt
pub fn record_write_failure(failure: &WriteFailure) {
    let severity = if failure.fatal { "fatal" } else { "recovered" };
    counter!(
        "logroute_write_failures_total",
        "category" => failure.category.to_string(),
        "severity" => severity.to_string()
    )
    .increment(1);
}

/// Record one demotion to the next writer in a chain
pub fn record_failover(category: CategoryId) {
    counter!(
        "logroute_failovers_total",
        "category" => category.to_string()
    )
    .increment(1);
}

/// Record a category running out of enabled writers
pub fn record_category_exhausted(category: CategoryId) {
    counter!(
        "logroute_categories_exhausted_total",
        "category" => category.to_string()
    )
    .increment(1);
}

/// Record records dropped before dispatch (invalid or unrouted)
pub fn record_records_dropped(count: u64) {
    counter!("logroute_records_dropped_total").increment(count);
}

/// Record the size of one pipeline flush
pub fn record_flush_size(size: usize) {
    histogram!("logroute_flush_size").record(size as f64);
    gauge!("logroute_last_flush_size").set(size as f64);
}

/// Failure aggregator
///
/// Accumulates failure events in memory for summary output at shutdown.
#[derive(Debug, Clone, Default)]
pub struct FailureAggregator {
    /// Total failed write attempts
    pub total_failures: u64,

    /// Failures that exhausted their category
    pub fatal_failures: u64,

    /// Failure counts per category
    pub by_category: HashMap<CategoryId, u64>,
}

impl FailureAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one failure event into the running totals
    pub fn update(&mut self, failure: &WriteFailure) {
        self.total_failures += 1;
        if failure.fatal {
            self.fatal_failures += 1;
        }
        *self.by_category.entry(failure.category).or_insert(0) += 1;
    }

    /// Produce a summary report
    pub fn summary(&self) -> FailureSummary {
        FailureSummary {
            total_failures: self.total_failures,
            fatal_failures: self.fatal_failures,
            by_category: self.by_category.clone(),
        }
    }

    /// Reset the totals
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Failure summary
#[derive(Debug, Clone, Default)]
pub struct FailureSummary {
    pub total_failures: u64,
    pub fatal_failures: u64,
    pub by_category: HashMap<CategoryId, u64>,
}

impl std::fmt::Display for FailureSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Write Failure Summary ===")?;
        writeln!(f, "Total failed attempts: {}", self.total_failures)?;
        writeln!(f, "Category exhaustions: {}", self.fatal_failures)?;

        if !self.by_category.is_empty() {
            writeln!(f, "Failures per category:")?;
            let mut categories: Vec<_> = self.by_category.iter().collect();
            categories.sort_by_key(|(id, _)| **id);
            for (category, count) in categories {
                writeln!(f, "  {}: {}", category, count)?;
            }
        }
        Ok(())
    }
}
