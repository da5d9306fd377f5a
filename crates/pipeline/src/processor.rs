//! RecordProcessor - periodic queue flush on a fixed cadence

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, instrument};

use contracts::Record;
use router::LogRouter;

/// Default flush period
pub const DEFAULT_FLUSH_PERIOD: Duration = Duration::from_millis(500);

/// Periodic variant of the batching pipeline.
///
/// Flushes the entire queue once per period. The interval timer accounts
/// for the drain's own processing time, so the cadence stays steady even
/// when flushes take non-trivial time.
pub struct RecordProcessor {
    tx: mpsc::UnboundedSender<Record>,
    worker: JoinHandle<()>,
}

impl RecordProcessor {
    /// Start with the default flush period
    pub fn start(router: Arc<LogRouter>) -> Self {
        Self::with_period(router, DEFAULT_FLUSH_PERIOD)
    }

    /// Start with a custom flush period
    pub fn with_period(router: Arc<LogRouter>, period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(flush_loop(router, rx, period));
        Self { tx, worker }
    }

    /// Enqueue a record without blocking
    pub fn enqueue(&self, channel: impl Into<String>, fields: Vec<String>) -> bool {
        self.enqueue_record(Record::new(channel, fields))
    }

    /// Enqueue a pre-built record without blocking
    pub fn enqueue_record(&self, record: Record) -> bool {
        self.tx.send(record).is_ok()
    }

    /// Cooperative stop: close the queue, flush what is buffered, join.
    #[instrument(name = "record_processor_stop", skip(self))]
    pub async fn stop(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            error!(error = ?e, "Processor task panicked");
        }
        debug!("RecordProcessor stopped");
    }
}

async fn flush_loop(router: Arc<LogRouter>, mut rx: UnboundedReceiver<Record>, period: Duration) {
    debug!(period_ms = period.as_millis() as u64, "RecordProcessor started");

    let mut ticker = tokio::time::interval(period);
    // Keep the cadence: a long drain shortens the next wait instead of
    // queueing extra ticks.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut buffer: Vec<Record> = Vec::new();
    let mut closed = false;
    while !closed {
        tokio::select! {
            _ = ticker.tick() => {
                if !buffer.is_empty() {
                    crate::logger::flush(&router, &buffer).await;
                    buffer.clear();
                }
            }
            record = rx.recv() => {
                match record {
                    Some(record) => buffer.push(record),
                    // Queue closed: flush the remainder without waiting for
                    // the next tick.
                    None => closed = true,
                }
            }
        }
    }

    if !buffer.is_empty() {
        crate::logger::flush(&router, &buffer).await;
    }
    debug!("RecordProcessor stopped draining");
}
