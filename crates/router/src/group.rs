//! FailoverGroup - per-category failover state machine
//!
//! Owns the priority-ordered writer chain and the "current best writer"
//! selection. Selection state lives behind one mutex per group; writer I/O
//! is never performed while it is held.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::debug;

use contracts::{CategoryId, LogError, LogWriter, WriterId, WriterState};

/// A priority-ordered failover chain of writers bound to channel names.
///
/// Registration is startup-only; at runtime writers change state, never
/// membership. Chains are short, so best-writer selection is a linear scan.
pub struct FailoverGroup {
    cooldown: Duration,
    core: Arc<GroupCore>,
}

struct GroupCore {
    id: CategoryId,
    inner: Mutex<GroupInner>,
}

struct GroupInner {
    /// Sorted by priority descending; ties keep registration order.
    /// Indices are contiguous 0..n and recomputed on every registration.
    writers: Vec<WriterSlot>,
    index_by_id: HashMap<WriterId, usize>,
    /// Lowest-index enabled handle, or None when every writer is disabled
    current: Option<usize>,
    /// Channels registered so far, replayed to later-registered writers
    channels: Vec<String>,
}

struct WriterSlot {
    id: WriterId,
    priority: i32,
    writer: Arc<dyn LogWriter>,
}

impl FailoverGroup {
    /// Create an empty group
    pub fn new(id: CategoryId, cooldown: Duration) -> Self {
        Self {
            cooldown,
            core: Arc::new(GroupCore {
                id,
                inner: Mutex::new(GroupInner {
                    writers: Vec::new(),
                    index_by_id: HashMap::new(),
                    current: None,
                    channels: Vec::new(),
                }),
            }),
        }
    }

    /// Category identifier
    pub fn id(&self) -> CategoryId {
        self.core.id
    }

    /// Cooldown applied to demoted writers
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Insert a writer handle, re-sort the chain by priority descending
    /// (stable on ties) and recompute the current selection.
    ///
    /// Already-registered channels are replayed to the new writer.
    ///
    /// # Errors
    /// Channel registration failures are startup configuration errors.
    pub fn register_writer(
        &self,
        writer: Arc<dyn LogWriter>,
        priority: i32,
    ) -> Result<(), LogError> {
        let writer_id = writer.id();

        let channels = self.core.inner.lock().unwrap().channels.clone();
        for channel in &channels {
            writer.register_channel(channel)?;
        }

        // React to this writer's transitions for the lifetime of the group.
        let core = Arc::downgrade(&self.core);
        writer.subscribe_state(Box::new(move |old, new| {
            if let Some(core) = core.upgrade() {
                core.on_writer_state_changed(writer_id, old, new);
            }
        }));

        let mut inner = self.core.inner.lock().unwrap();
        inner.writers.push(WriterSlot {
            id: writer_id,
            priority,
            writer,
        });
        inner.writers.sort_by(|a, b| b.priority.cmp(&a.priority));
        inner.recompute_indices();
        inner.current = inner.best_enabled_index();

        debug!(
            category = self.core.id,
            writer = writer_id,
            priority,
            chain_len = inner.writers.len(),
            "Writer registered"
        );
        Ok(())
    }

    /// Bind a channel: forward the one-time registration hook to every
    /// writer already in the group.
    pub fn register_channel(&self, channel: &str) -> Result<(), LogError> {
        let writers: Vec<Arc<dyn LogWriter>> = {
            let mut inner = self.core.inner.lock().unwrap();
            inner.channels.push(channel.to_string());
            inner.writers.iter().map(|s| Arc::clone(&s.writer)).collect()
        };
        for writer in writers {
            writer.register_channel(channel)?;
        }
        Ok(())
    }

    /// The handle at the current index, or None when the group is exhausted
    pub fn current_writer(&self) -> Option<Arc<dyn LogWriter>> {
        let inner = self.core.inner.lock().unwrap();
        inner.current.map(|i| Arc::clone(&inner.writers[i].writer))
    }

    /// Demote the writer that just failed with a timed disable (which arms
    /// its auto-recovery) and report whether a current writer remains.
    ///
    /// Demotion targets the failed writer, not the current index: racing
    /// producers that both saw the same failure re-arm one cooldown instead
    /// of demoting the healthy successor. Returns false when the group is
    /// exhausted.
    pub fn move_next_writer(&self, failed: WriterId) -> bool {
        let writer = {
            let inner = self.core.inner.lock().unwrap();
            inner
                .index_by_id
                .get(&failed)
                .map(|&i| Arc::clone(&inner.writers[i].writer))
        };

        match writer {
            // The state-change handler recomputes the selection before
            // disable_for returns.
            Some(writer) => writer.disable_for(self.cooldown),
            None => return false,
        }

        self.core.inner.lock().unwrap().current.is_some()
    }
}

impl GroupCore {
    /// State-change handler shared by demotions, explicit enables/disables
    /// and cooldown expiries.
    fn on_writer_state_changed(&self, writer: WriterId, _old: WriterState, new: WriterState) {
        let mut inner = self.inner.lock().unwrap();
        match new {
            // The disabled writer might have been the current one or a
            // future one; a full rescan is the safe policy either way.
            WriterState::Disabled => {
                inner.current = inner.best_enabled_index();
            }
            // A writer becoming healthy again reclaims priority ordering
            // without waiting for the current writer to fail.
            WriterState::Enabled => {
                if let Some(&index) = inner.index_by_id.get(&writer) {
                    if inner.current.is_none_or(|current| index < current) {
                        inner.current = Some(index);
                    }
                }
            }
        }
    }
}

impl GroupInner {
    fn recompute_indices(&mut self) {
        self.index_by_id.clear();
        for (index, slot) in self.writers.iter().enumerate() {
            self.index_by_id.insert(slot.id, index);
        }
    }

    fn best_enabled_index(&self) -> Option<usize> {
        self.writers
            .iter()
            .position(|slot| slot.writer.state() != WriterState::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contracts::WriterStatus;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::sleep;

    struct MockWriter {
        id: WriterId,
        status: WriterStatus,
        write_count: AtomicU64,
    }

    impl MockWriter {
        fn new(id: WriterId) -> Arc<Self> {
            Arc::new(Self {
                id,
                status: WriterStatus::new(),
                write_count: AtomicU64::new(0),
            })
        }
    }

    #[async_trait]
    impl LogWriter for MockWriter {
        fn id(&self) -> WriterId {
            self.id
        }

        fn status(&self) -> &WriterStatus {
            &self.status
        }

        async fn write(&self, _channel: &str, _fields: &[String]) -> Result<(), LogError> {
            self.write_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_highest_priority_selected() {
        let group = FailoverGroup::new(1, Duration::from_millis(100));
        let low = MockWriter::new(1);
        let high = MockWriter::new(2);

        group.register_writer(low, 9).unwrap();
        group.register_writer(Arc::clone(&high) as Arc<dyn LogWriter>, 12).unwrap();

        let current = group.current_writer().unwrap();
        assert_eq!(current.id(), 2);
    }

    #[tokio::test]
    async fn test_priority_tie_keeps_registration_order() {
        let group = FailoverGroup::new(1, Duration::from_millis(100));
        group.register_writer(MockWriter::new(1), 10).unwrap();
        group.register_writer(MockWriter::new(2), 10).unwrap();

        assert_eq!(group.current_writer().unwrap().id(), 1);
    }

    #[tokio::test]
    async fn test_move_next_demotes_and_advances() {
        let group = FailoverGroup::new(1, Duration::from_millis(100));
        let primary = MockWriter::new(1);
        let fallback = MockWriter::new(2);
        group
            .register_writer(Arc::clone(&primary) as Arc<dyn LogWriter>, 12)
            .unwrap();
        group.register_writer(fallback, 9).unwrap();

        assert!(group.move_next_writer(1));
        assert_eq!(primary.state(), WriterState::Disabled);
        assert_eq!(group.current_writer().unwrap().id(), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_reported() {
        let group = FailoverGroup::new(1, Duration::from_millis(100));
        group.register_writer(MockWriter::new(1), 12).unwrap();

        assert!(!group.move_next_writer(1));
        assert!(group.current_writer().is_none());
    }

    #[tokio::test]
    async fn test_double_demotion_is_idempotent() {
        let group = FailoverGroup::new(1, Duration::from_millis(100));
        group.register_writer(MockWriter::new(1), 12).unwrap();
        group.register_writer(MockWriter::new(2), 9).unwrap();

        // Two producers racing on the same failed writer: the second
        // demotion must not advance past the healthy fallback.
        assert!(group.move_next_writer(1));
        assert!(group.move_next_writer(1));
        assert_eq!(group.current_writer().unwrap().id(), 2);
    }

    #[tokio::test]
    async fn test_cooldown_expiry_reclaims_priority() {
        let group = FailoverGroup::new(1, Duration::from_millis(50));
        group.register_writer(MockWriter::new(1), 12).unwrap();
        group.register_writer(MockWriter::new(2), 9).unwrap();

        assert!(group.move_next_writer(1));
        assert_eq!(group.current_writer().unwrap().id(), 2);

        // Restored writer reclaims the top slot without writer 2 failing.
        sleep(Duration::from_millis(100)).await;
        assert_eq!(group.current_writer().unwrap().id(), 1);
    }

    #[tokio::test]
    async fn test_channels_replayed_to_late_writer() {
        let group = FailoverGroup::new(1, Duration::from_millis(100));
        group.register_channel("Audit").unwrap();
        group.register_writer(MockWriter::new(1), 10).unwrap();
        // No panic and no error: the channel hook ran for the late writer.
        group.register_channel("Errors").unwrap();
    }
}
