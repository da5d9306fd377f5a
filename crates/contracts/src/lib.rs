//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Delivery Model
//! - Records are routed per channel name to one or more failover categories
//! - Delivery is at-least-once: a failed batch is resubmitted in full to the
//!   next writer, so downstream duplication is possible

mod error;
mod failure;
mod plan;
mod record;
mod status;
mod writer;

pub use error::*;
pub use failure::*;
pub use plan::*;
pub use record::*;
pub use status::*;
pub use writer::*;
