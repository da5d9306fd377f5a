//! FileWriter - appends event lines to per-channel files

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, error};

use contracts::{LogError, LogWriter, WriterId, WriterStatus};

use super::DEFAULT_DELIMITER;

/// Characters scrubbed out of generated file names
const INVALID_FILENAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Configuration for FileWriter
#[derive(Debug, Clone)]
pub struct FileWriterConfig {
    /// Base output directory
    pub output_dir: PathBuf,
    /// File name template; `{channel}` is substituted per channel
    pub template: String,
    /// Field delimiter within a line
    pub delimiter: String,
}

impl FileWriterConfig {
    /// Create config from params map
    ///
    /// Recognized params: `output_dir`, `template`, `delimiter`.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let output_dir = params
            .get("output_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./logs"));
        let template = params
            .get("template")
            .cloned()
            .unwrap_or_else(|| "{channel}.log".to_string());
        let delimiter = params
            .get("delimiter")
            .cloned()
            .unwrap_or_else(|| DEFAULT_DELIMITER.to_string());

        Self {
            output_dir,
            template,
            delimiter,
        }
    }
}

/// Writer appending delimiter-joined lines to one file per channel.
///
/// Files are opened by `register_channel` at startup; a write to a channel
/// without a registered file is silently ignored (the router only dispatches
/// bound channels).
pub struct FileWriter {
    id: WriterId,
    status: WriterStatus,
    config: FileWriterConfig,
    files: Mutex<HashMap<String, File>>,
}

impl FileWriter {
    /// Create a new FileWriter, ensuring the output directory exists
    pub fn new(id: WriterId, config: FileWriterConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.output_dir)?;
        Ok(Self {
            id,
            status: WriterStatus::new(),
            config,
            files: Mutex::new(HashMap::new()),
        })
    }

    /// Create from params map (for the registry)
    pub fn from_params(id: WriterId, params: &HashMap<String, String>) -> std::io::Result<Self> {
        Self::new(id, FileWriterConfig::from_params(params))
    }

    fn file_name(&self, channel: &str) -> String {
        let name = self.config.template.replace("{channel}", channel);
        name.chars()
            .map(|c| if INVALID_FILENAME_CHARS.contains(&c) { '_' } else { c })
            .collect()
    }

    fn append_line(&self, channel: &str, line: &str) -> Result<(), LogError> {
        let mut files = self.files.lock().unwrap();
        let Some(file) = files.get_mut(channel) else {
            return Ok(());
        };
        writeln!(file, "{line}").map_err(|e| {
            error!(writer = self.id, channel, error = %e, "Write failed");
            LogError::writer_write(self.id, channel, e.to_string())
        })
    }
}

#[async_trait]
impl LogWriter for FileWriter {
    fn id(&self) -> WriterId {
        self.id
    }

    fn status(&self) -> &WriterStatus {
        &self.status
    }

    fn register_channel(&self, channel: &str) -> Result<(), LogError> {
        let path = self.config.output_dir.join(self.file_name(channel));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LogError::channel_registration(self.id, channel, e.to_string()))?;
        self.files.lock().unwrap().insert(channel.to_string(), file);
        debug!(writer = self.id, channel, path = %path.display(), "Channel file opened");
        Ok(())
    }

    async fn write(&self, channel: &str, fields: &[String]) -> Result<(), LogError> {
        self.append_line(channel, &fields.join(&self.config.delimiter))
    }

    async fn shutdown(&self) {
        self.status.shutdown();
        let mut files = self.files.lock().unwrap();
        for (channel, file) in files.iter_mut() {
            if let Err(e) = file.flush() {
                error!(writer = self.id, channel, error = %e, "Flush failed on shutdown");
            }
        }
        files.clear();
    }
}
