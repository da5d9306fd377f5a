//! ConsoleWriter - writes event data to standard output

use std::collections::HashMap;

use async_trait::async_trait;

use contracts::{LogError, LogWriter, WriterId, WriterStatus};

use super::DEFAULT_DELIMITER;

/// Writer printing `channel> field1> field2` lines to stdout
pub struct ConsoleWriter {
    id: WriterId,
    status: WriterStatus,
    delimiter: String,
}

impl ConsoleWriter {
    /// Create a console writer with the default delimiter
    pub fn new(id: WriterId) -> Self {
        Self {
            id,
            status: WriterStatus::new(),
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }

    /// Create from params map (for the registry)
    ///
    /// Recognized params: `delimiter`.
    pub fn from_params(id: WriterId, params: &HashMap<String, String>) -> Self {
        let delimiter = params
            .get("delimiter")
            .cloned()
            .unwrap_or_else(|| DEFAULT_DELIMITER.to_string());
        Self {
            id,
            status: WriterStatus::new(),
            delimiter,
        }
    }
}

#[async_trait]
impl LogWriter for ConsoleWriter {
    fn id(&self) -> WriterId {
        self.id
    }

    fn status(&self) -> &WriterStatus {
        &self.status
    }

    async fn write(&self, channel: &str, fields: &[String]) -> Result<(), LogError> {
        println!(
            "{}{}{}",
            channel,
            self.delimiter,
            fields.join(&self.delimiter)
        );
        Ok(())
    }
}
