//! LogWriter trait - destination capability contract
//!
//! The routing core never constructs writers; it only holds handles to
//! pre-built instances. Shared state-machine behavior lives in
//! [`WriterStatus`], which implementations embed and expose through
//! [`LogWriter::status`] - the remaining state methods are delegating
//! defaults.

use async_trait::async_trait;

use crate::{LogError, Record, StateChangeFn, WriterState, WriterStatus};
use std::time::Duration;

/// Stable, caller-assigned writer identifier
pub type WriterId = u32;

/// Destination capability
///
/// All writer implementations must implement this trait.
#[async_trait]
pub trait LogWriter: Send + Sync {
    /// Unique identifier (used for handle lookup, logging and teardown)
    fn id(&self) -> WriterId;

    /// Embedded Enabled/Disabled state machine
    fn status(&self) -> &WriterStatus;

    /// Current state
    fn state(&self) -> WriterState {
        self.status().state()
    }

    /// Subscribe to state transitions. Callbacks fire on actual changes only.
    fn subscribe_state(&self, callback: StateChangeFn) {
        self.status().subscribe(callback);
    }

    /// Enable the writer (no-op when already enabled)
    fn enable(&self) {
        self.status().enable();
    }

    /// Disable the writer indefinitely
    fn disable(&self) {
        self.status().disable();
    }

    /// Disable the writer for a fixed cooldown, after which it is re-enabled
    /// unconditionally. Repeated calls re-arm the timer (latest wins).
    fn disable_for(&self, cooldown: Duration) {
        self.status().disable_for(cooldown);
    }

    /// One-time setup hook, invoked once per channel bound to any category
    /// containing this writer.
    ///
    /// # Errors
    /// A failure here is a startup configuration error, never a runtime
    /// failover condition.
    fn register_channel(&self, _channel: &str) -> Result<(), LogError> {
        Ok(())
    }

    /// Write a single record
    ///
    /// # Errors
    /// A writer error triggers demotion and failover to the next writer.
    async fn write(&self, channel: &str, fields: &[String]) -> Result<(), LogError>;

    /// Write a batch of records
    ///
    /// Default forwards each record to the single-record path; destinations
    /// with native bulk operations override this. A partial failure leaves
    /// the applied side effects in place - the whole batch is resubmitted to
    /// the next writer on failover.
    async fn write_batch(&self, records: &[Record]) -> Result<(), LogError> {
        for record in records {
            self.write(&record.channel, &record.fields).await?;
        }
        Ok(())
    }

    /// Deterministic teardown: cancel the cooldown timer and release any
    /// owned resources. Called exactly once per distinct writer instance.
    async fn shutdown(&self) {
        self.status().shutdown();
    }
}
