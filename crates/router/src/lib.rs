//! # Router
//!
//! The failover routing core: maps channel names to categories, picks the
//! best currently-enabled writer per category, demotes writers on error and
//! retries across the chain until success or exhaustion.
//!
//! ## Structure
//! - [`FailoverGroup`]: per-category priority chain and selection state
//! - [`LogRouter`] / [`RouterBuilder`]: channel routing table + dispatch
//! - [`WriterRegistry`] / [`build_router`]: kind tag -> constructor mapping
//! - [`writers`]: bundled console and file destinations

mod error;
mod group;
mod metrics;
mod registry;
mod router;
pub mod writers;

pub use error::RouterError;
pub use group::FailoverGroup;
pub use metrics::{MetricsSnapshot, RouterMetrics};
pub use registry::{build_router, WriterCtor, WriterRegistry};
pub use router::{LogRouter, RouterBuilder};
