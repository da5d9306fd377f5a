//! Record - the unit of data handed to the routing core

use serde::{Deserialize, Serialize};

/// A single log event: a target channel name plus ordered field values.
///
/// Records are created per write call and never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Name of the target channel
    pub channel: String,
    /// Ordered event data
    pub fields: Vec<String>,
}

impl Record {
    /// Create a new record
    pub fn new(channel: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            channel: channel.into(),
            fields,
        }
    }

    /// A record with an empty channel name or no fields is dropped by every
    /// dispatch path. Not an error condition.
    pub fn is_valid(&self) -> bool {
        is_valid_record(&self.channel, &self.fields)
    }
}

/// Validity check shared by the router paths and writer implementations.
pub fn is_valid_record(channel: &str, fields: &[String]) -> bool {
    !channel.is_empty() && !fields.is_empty()
}
