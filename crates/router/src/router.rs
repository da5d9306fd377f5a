//! LogRouter - channel routing table and retry-across-writers dispatch

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument};

use contracts::{
    is_valid_record, CategoryId, LogError, LogWriter, Record, WriteFailure, WriterId,
};

use crate::error::RouterError;
use crate::group::FailoverGroup;
use crate::metrics::{MetricsSnapshot, RouterMetrics};

/// Capacity of the failure notification channel. Lagging observers lose old
/// events rather than slowing dispatch.
const FAILURE_CHANNEL_CAPACITY: usize = 256;

/// Startup-time configurator populating the routing topology.
///
/// Used once during startup and consumed by [`RouterBuilder::build`];
/// topology is immutable afterwards.
pub struct RouterBuilder {
    groups: HashMap<CategoryId, Arc<FailoverGroup>>,
    by_channel: HashMap<String, Vec<Arc<FailoverGroup>>>,
    writers: HashMap<WriterId, Arc<dyn LogWriter>>,
}

impl RouterBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
            by_channel: HashMap::new(),
            writers: HashMap::new(),
        }
    }

    /// Create a failover category
    ///
    /// # Errors
    /// Fails fast on a duplicate category id.
    pub fn create_category(
        &mut self,
        id: CategoryId,
        cooldown: Duration,
    ) -> Result<(), RouterError> {
        if self.groups.contains_key(&id) {
            return Err(RouterError::DuplicateCategory { id });
        }
        self.groups
            .insert(id, Arc::new(FailoverGroup::new(id, cooldown)));
        Ok(())
    }

    /// Bind a writer into a category's failover chain
    ///
    /// A writer instance may be bound into multiple categories; each binding
    /// is an independent handle within that category.
    ///
    /// # Errors
    /// Fails fast on an unknown category id.
    pub fn bind_writer(
        &mut self,
        category: CategoryId,
        writer: Arc<dyn LogWriter>,
        priority: i32,
    ) -> Result<(), RouterError> {
        let group = self
            .groups
            .get(&category)
            .ok_or(RouterError::UnknownCategory { id: category })?;
        group.register_writer(Arc::clone(&writer), priority)?;
        self.writers.entry(writer.id()).or_insert(writer);
        Ok(())
    }

    /// Bind a channel name to a category
    ///
    /// A channel may fan out to multiple categories; binding the same pair
    /// twice is a no-op.
    ///
    /// # Errors
    /// Fails fast on an unknown category id.
    pub fn bind_channel(&mut self, category: CategoryId, channel: &str) -> Result<(), RouterError> {
        let group = self
            .groups
            .get(&category)
            .ok_or(RouterError::UnknownCategory { id: category })?;
        group.register_channel(channel)?;

        let bound = self.by_channel.entry(channel.to_string()).or_default();
        if bound.iter().all(|g| g.id() != category) {
            bound.push(Arc::clone(group));
        }
        Ok(())
    }

    /// Freeze the topology into a router
    pub fn build(self) -> LogRouter {
        let (failure_tx, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);
        info!(
            categories = self.groups.len(),
            channels = self.by_channel.len(),
            writers = self.writers.len(),
            "Router built"
        );
        LogRouter {
            groups: self.groups,
            by_channel: self.by_channel,
            writers: self.writers,
            failure_tx,
            metrics: Arc::new(RouterMetrics::new()),
        }
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The synchronous dispatch entry point shared by all producers.
///
/// Resolves the categories bound to a record's channel and delivers to each
/// category's current writer, failing over across the chain on error.
pub struct LogRouter {
    groups: HashMap<CategoryId, Arc<FailoverGroup>>,
    by_channel: HashMap<String, Vec<Arc<FailoverGroup>>>,
    /// Distinct writers keyed by id, for exactly-once teardown
    writers: HashMap<WriterId, Arc<dyn LogWriter>>,
    failure_tx: broadcast::Sender<WriteFailure>,
    metrics: Arc<RouterMetrics>,
}

impl LogRouter {
    /// Subscribe to failure notifications (`fatal = true` only on category
    /// exhaustion). Dropping the receiver never affects dispatch.
    pub fn failures(&self) -> broadcast::Receiver<WriteFailure> {
        self.failure_tx.subscribe()
    }

    /// Get current metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Write a single record
    ///
    /// Invalid records and unrouted channels are silent no-ops.
    ///
    /// # Errors
    /// Returns [`RouterError::Exhausted`] when a category runs out of
    /// enabled writers; remaining categories of this call are not attempted.
    #[instrument(name = "router_write", skip(self, fields), fields(channel = %channel))]
    pub async fn write(&self, channel: &str, fields: &[String]) -> Result<(), RouterError> {
        if !is_valid_record(channel, fields) {
            self.metrics.inc_dropped();
            return Ok(());
        }
        let Some(groups) = self.by_channel.get(channel) else {
            self.metrics.inc_dropped();
            return Ok(());
        };

        for group in groups {
            self.dispatch(group, |writer| async move {
                writer.write(channel, fields).await
            })
            .await?;
            self.metrics.add_dispatched(1);
        }
        Ok(())
    }

    /// Write a batch of records
    ///
    /// Records are partitioned per bound category (one record contributes to
    /// every category bound to its channel) and each sub-batch is delivered
    /// through the writer's batch operation with the same failover loop as
    /// the single-record path. On exhaustion the error propagates
    /// immediately and the remaining categories' sub-batches are not
    /// attempted (fail-fast).
    #[instrument(name = "router_write_batch", skip(self, records), fields(records = records.len()))]
    pub async fn write_batch(&self, records: &[Record]) -> Result<(), RouterError> {
        let by_category = self.partition_records(records);

        for (category, batch) in &by_category {
            // Partitioning only produces known ids.
            let group = &self.groups[category];
            let slice = batch.as_slice();
            self.dispatch(group, |writer| async move { writer.write_batch(slice).await })
                .await?;
            self.metrics.add_dispatched(batch.len() as u64);
        }
        Ok(())
    }

    /// Group records by target category, BTreeMap for deterministic
    /// dispatch order. Invalid and unrouted records are dropped here.
    fn partition_records(&self, records: &[Record]) -> BTreeMap<CategoryId, Vec<Record>> {
        let mut by_category: BTreeMap<CategoryId, Vec<Record>> = BTreeMap::new();
        for record in records {
            if !record.is_valid() {
                self.metrics.inc_dropped();
                continue;
            }
            let Some(groups) = self.by_channel.get(&record.channel) else {
                self.metrics.inc_dropped();
                continue;
            };
            for group in groups {
                by_category
                    .entry(group.id())
                    .or_default()
                    .push(record.clone());
            }
        }
        by_category
    }

    /// Retry-across-writers loop shared by both dispatch paths.
    ///
    /// Attempts the category's current writer; on error demotes it, emits a
    /// failure notification and retries with the next writer until success
    /// or exhaustion. The writer call happens outside every group lock.
    async fn dispatch<F, Fut>(
        &self,
        group: &Arc<FailoverGroup>,
        attempt: F,
    ) -> Result<(), RouterError>
    where
        F: Fn(Arc<dyn LogWriter>) -> Fut,
        Fut: std::future::Future<Output = Result<(), LogError>>,
    {
        loop {
            let Some(writer) = group.current_writer() else {
                // Exhausted before any attempt: the group never recovered
                // from a previous failure burst.
                let error = Arc::new(LogError::Other(format!(
                    "no enabled writer remains in category {}",
                    group.id()
                )));
                self.notify_failure(group.id(), Arc::clone(&error), true);
                self.metrics.inc_exhausted();
                return Err(RouterError::Exhausted {
                    category: group.id(),
                    source: error,
                });
            };

            match attempt(Arc::clone(&writer)).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    self.metrics.inc_failed_attempts();
                    let error = Arc::new(e);
                    let exhausted = !group.move_next_writer(writer.id());
                    self.notify_failure(group.id(), Arc::clone(&error), exhausted);

                    if exhausted {
                        self.metrics.inc_exhausted();
                        error!(
                            category = group.id(),
                            error = %error,
                            "Category exhausted, no enabled writer remains"
                        );
                        // Suppressing this would silently lose records.
                        return Err(RouterError::Exhausted {
                            category: group.id(),
                            source: error,
                        });
                    }

                    self.metrics.inc_failovers();
                    debug!(
                        category = group.id(),
                        failed_writer = writer.id(),
                        error = %error,
                        "Writer demoted, failing over"
                    );
                }
            }
        }
    }

    fn notify_failure(&self, category: CategoryId, error: Arc<LogError>, fatal: bool) {
        // No receivers is fine; observers can never break dispatch.
        let _ = self.failure_tx.send(WriteFailure {
            category,
            error,
            fatal,
        });
    }

    /// Deterministic teardown: shut down every distinct writer exactly once,
    /// even when registered into multiple categories.
    #[instrument(name = "router_shutdown", skip(self))]
    pub async fn shutdown(self) {
        for (id, writer) in &self.writers {
            writer.shutdown().await;
            debug!(writer = id, "Writer shut down");
        }
        info!(writers = self.writers.len(), "Router shutdown complete");
    }
}
