//! Router error types

use std::sync::Arc;

use thiserror::Error;

use contracts::{CategoryId, LogError, WriterId};

/// Router-specific errors
///
/// Everything except `Exhausted` is a startup-time configuration error.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Referenced category was never created
    #[error("unknown category {id}")]
    UnknownCategory { id: CategoryId },

    /// Category created twice
    #[error("category {id} already exists")]
    DuplicateCategory { id: CategoryId },

    /// Two writer specs share an identifier
    #[error("writer {id} is defined more than once")]
    DuplicateWriter { id: WriterId },

    /// Category binding references an undefined writer
    #[error("writer {id} referenced by category {category} is not defined")]
    UnknownWriter { id: WriterId, category: CategoryId },

    /// No constructor registered for a writer kind tag
    #[error("unknown writer kind '{kind}'")]
    UnknownWriterKind { kind: String },

    /// Writer constructor failed
    #[error("failed to create writer {id}: {message}")]
    WriterCreation { id: WriterId, message: String },

    /// No enabled writer remains in a category - the only runtime-fatal
    /// condition. Carries the last writer error of the failure burst.
    #[error("category {category} exhausted, last error: {source}")]
    Exhausted {
        category: CategoryId,
        source: Arc<LogError>,
    },

    /// Contract-level error (channel registration, validation)
    #[error(transparent)]
    Contract(#[from] LogError),
}

impl RouterError {
    /// Create a writer creation error
    pub fn writer_creation(id: WriterId, message: impl Into<String>) -> Self {
        Self::WriterCreation {
            id,
            message: message.into(),
        }
    }

    /// True for the runtime exhaustion case
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}
