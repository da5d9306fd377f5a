//! # Pipeline
//!
//! Asynchronous record submission, decoupling producers from destination
//! I/O latency. Producers enqueue without blocking; a single dedicated
//! consumer task drains the queue into the router.
//!
//! Two drain strategies:
//! - [`BackgroundLogger`]: reactive - drains as soon as records arrive,
//!   bounded batch per cycle, short idle sleep
//! - [`RecordProcessor`]: periodic - flushes the whole queue on a fixed
//!   cadence, processing time subtracted from the next wait

mod logger;
mod processor;

pub use logger::BackgroundLogger;
pub use processor::RecordProcessor;

#[cfg(test)]
pub(crate) mod test_support;
