//! Mock writers and router fixtures shared by the pipeline tests

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use contracts::{LogError, LogWriter, WriterId, WriterStatus};
use router::{LogRouter, RouterBuilder};

struct RecordingWriter {
    id: WriterId,
    status: WriterStatus,
    received: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl LogWriter for RecordingWriter {
    fn id(&self) -> WriterId {
        self.id
    }

    fn status(&self) -> &WriterStatus {
        &self.status
    }

    async fn write(&self, _channel: &str, fields: &[String]) -> Result<(), LogError> {
        self.received.lock().unwrap().extend(fields.iter().cloned());
        Ok(())
    }
}

struct FailingWriter {
    id: WriterId,
    status: WriterStatus,
    attempts: Arc<AtomicU64>,
}

#[async_trait]
impl LogWriter for FailingWriter {
    fn id(&self) -> WriterId {
        self.id
    }

    fn status(&self) -> &WriterStatus {
        &self.status
    }

    async fn write(&self, channel: &str, _fields: &[String]) -> Result<(), LogError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(LogError::writer_write(self.id, channel, "mock failure"))
    }
}

/// Writer that records every delivered field
pub(crate) fn recording_writer(id: WriterId) -> (Arc<dyn LogWriter>, Arc<Mutex<Vec<String>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let writer = Arc::new(RecordingWriter {
        id,
        status: WriterStatus::new(),
        received: Arc::clone(&received),
    });
    (writer, received)
}

/// Writer that fails every write, counting attempts
pub(crate) fn failing_writer(id: WriterId) -> (Arc<dyn LogWriter>, Arc<AtomicU64>) {
    let attempts = Arc::new(AtomicU64::new(0));
    let writer = Arc::new(FailingWriter {
        id,
        status: WriterStatus::new(),
        attempts: Arc::clone(&attempts),
    });
    (writer, attempts)
}

/// One category, one writer, one channel
pub(crate) fn single_category_router(writer: Arc<dyn LogWriter>, channel: &str) -> LogRouter {
    let mut builder = RouterBuilder::new();
    builder.create_category(1, Duration::from_millis(100)).unwrap();
    builder.bind_writer(1, writer, 10).unwrap();
    builder.bind_channel(1, channel).unwrap();
    builder.build()
}
