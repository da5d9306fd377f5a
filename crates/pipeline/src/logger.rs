//! BackgroundLogger - reactive queue drain into the router

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, instrument};

use contracts::Record;
use router::LogRouter;

/// Maximum records drained per cycle
const MAX_BATCH: usize = 1000;

/// Sleep between cycles when the queue is empty
const IDLE_WAIT: Duration = Duration::from_millis(10);

/// Asynchronous submission front for the router.
///
/// `enqueue` never blocks and never touches destination I/O. A single
/// consumer task drains up to [`MAX_BATCH`] records per cycle; one record
/// goes through the router's single-record path, more through the batch
/// path. Router errors - including fatal exhaustion - are caught at the
/// loop boundary and logged: propagating them would kill the only consumer.
pub struct BackgroundLogger {
    tx: mpsc::UnboundedSender<Record>,
    worker: JoinHandle<()>,
}

impl BackgroundLogger {
    /// Start the consumer task
    pub fn start(router: Arc<LogRouter>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(drain_loop(router, rx));
        Self { tx, worker }
    }

    /// Enqueue a record without blocking
    ///
    /// Returns false when the pipeline has already stopped.
    pub fn enqueue(&self, channel: impl Into<String>, fields: Vec<String>) -> bool {
        self.enqueue_record(Record::new(channel, fields))
    }

    /// Enqueue a pre-built record without blocking
    pub fn enqueue_record(&self, record: Record) -> bool {
        self.tx.send(record).is_ok()
    }

    /// Cooperative stop: close the queue, let the consumer finish draining
    /// the buffered records, then join it.
    #[instrument(name = "background_logger_stop", skip(self))]
    pub async fn stop(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            error!(error = ?e, "Consumer task panicked");
        }
        debug!("BackgroundLogger stopped");
    }
}

/// Consumer loop: drain a bounded batch, dispatch, sleep briefly when idle.
async fn drain_loop(router: Arc<LogRouter>, mut rx: UnboundedReceiver<Record>) {
    debug!("BackgroundLogger consumer started");

    let mut batch: Vec<Record> = Vec::with_capacity(MAX_BATCH);
    let mut closed = false;

    loop {
        batch.clear();
        while batch.len() < MAX_BATCH {
            match rx.try_recv() {
                Ok(record) => batch.push(record),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    closed = true;
                    break;
                }
            }
        }

        if !batch.is_empty() {
            flush(&router, &batch).await;
        } else if closed {
            break;
        } else {
            sleep(IDLE_WAIT).await;
        }
    }

    debug!("BackgroundLogger consumer stopped");
}

/// Dispatch one drained batch, swallowing router errors at this boundary.
pub(crate) async fn flush(router: &LogRouter, batch: &[Record]) {
    let result = if batch.len() == 1 {
        router.write(&batch[0].channel, &batch[0].fields).await
    } else {
        router.write_batch(batch).await
    };
    if let Err(e) = result {
        // Last-resort side channel; records of the failed category are lost.
        error!(records = batch.len(), error = %e, "Failed writing records to the log");
    }
}
