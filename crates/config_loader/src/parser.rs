//! Configuration parsing
//!
//! Supports TOML (primary) and JSON formats.

use contracts::{LogError, RoutingPlan};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a TOML routing plan
pub fn parse_toml(content: &str) -> Result<RoutingPlan, LogError> {
    toml::from_str(content).map_err(|e| LogError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON routing plan
pub fn parse_json(content: &str) -> Result<RoutingPlan, LogError> {
    serde_json::from_str(content).map_err(|e| LogError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse according to the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<RoutingPlan, LogError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}
