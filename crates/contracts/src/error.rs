//! Layered error definitions
//!
//! Categorized by source: config / writer / io

use thiserror::Error;

use crate::WriterId;

/// Unified error type for the contract surface
#[derive(Debug, Error)]
pub enum LogError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Writer Errors =====
    /// Writer failed to store a record
    #[error("writer {writer} failed on channel '{channel}': {message}")]
    WriterWrite {
        writer: WriterId,
        channel: String,
        message: String,
    },

    /// Writer failed during channel registration
    #[error("writer {writer} failed to register channel '{channel}': {message}")]
    ChannelRegistration {
        writer: WriterId,
        channel: String,
        message: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl LogError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create writer write error
    pub fn writer_write(
        writer: WriterId,
        channel: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::WriterWrite {
            writer,
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Create channel registration error
    pub fn channel_registration(
        writer: WriterId,
        channel: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ChannelRegistration {
            writer,
            channel: channel.into(),
            message: message.into(),
        }
    }
}
