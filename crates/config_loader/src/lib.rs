//! # Config Loader
//!
//! Routing configuration loading and parsing.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce a `RoutingPlan`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let plan = ConfigLoader::load_from_path(Path::new("routing.toml")).unwrap();
//! println!("Categories: {}", plan.categories.len());
//! ```

mod parser;
mod validator;

pub use contracts::RoutingPlan;
pub use parser::ConfigFormat;
pub use validator::validate;

use contracts::LogError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load a routing plan from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a routing plan from a file path
    ///
    /// Detects the format from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<RoutingPlan, LogError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a routing plan from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<RoutingPlan, LogError> {
        let plan = parser::parse(content, format)?;
        validator::validate(&plan)?;
        Ok(plan)
    }

    /// Serialize a routing plan to a TOML string
    pub fn to_toml(plan: &RoutingPlan) -> Result<String, LogError> {
        toml::to_string_pretty(plan)
            .map_err(|e| LogError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a routing plan to a JSON string
    pub fn to_json(plan: &RoutingPlan) -> Result<String, LogError> {
        serde_json::to_string_pretty(plan)
            .map_err(|e| LogError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer the configuration format from the file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, LogError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            LogError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| LogError::config_parse(format!("unsupported config format: .{ext}")))
    }

    /// Read the configuration file content
    fn read_file(path: &Path) -> Result<String, LogError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
[[writers]]
id = 1
kind = "console"

[[writers]]
id = 2
kind = "file"
[writers.params]
output_dir = "logs"

[[categories]]
id = 1
cooldown_ms = 1000
channels = ["Errors"]

[[categories.writers]]
id = 2
priority = 12

[[categories.writers]]
id = 1
priority = 9
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let plan = result.unwrap();
        assert_eq!(plan.categories[0].cooldown_ms, Some(1000));
    }

    #[test]
    fn test_round_trip_toml() {
        let plan = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&plan).unwrap();
        let plan2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(plan.writers.len(), plan2.writers.len());
        assert_eq!(plan.categories[0].id, plan2.categories[0].id);
    }

    #[test]
    fn test_round_trip_json() {
        let plan = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&plan).unwrap();
        let plan2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(plan.categories.len(), plan2.categories.len());
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // Binding an undeclared writer must fail validation, not parsing.
        let content = r#"
[[writers]]
id = 1
kind = "console"

[[categories]]
id = 1
channels = ["Errors"]

[[categories.writers]]
id = 99
priority = 10
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("undeclared"));
    }
}
