//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<PlanSummary>,
}

#[derive(Serialize)]
struct PlanSummary {
    cooldown_ms: u64,
    writer_count: usize,
    category_count: usize,
    channel_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(plan) => {
            let warnings = collect_warnings(&plan);
            let channel_count: usize = plan.categories.iter().map(|c| c.channels.len()).sum();

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(PlanSummary {
                    cooldown_ms: plan.failover.cooldown_ms,
                    writer_count: plan.writers.len(),
                    category_count: plan.categories.len(),
                    channel_count,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(plan: &contracts::RoutingPlan) -> Vec<String> {
    let mut warnings = Vec::new();

    if plan.categories.is_empty() {
        warnings.push("No categories configured - every record will be dropped".to_string());
    }

    for category in &plan.categories {
        if category.channels.is_empty() {
            warnings.push(format!(
                "Category {} has no channels bound - it will never receive records",
                category.id
            ));
        }
        if category.writers.len() == 1 {
            warnings.push(format!(
                "Category {} binds a single writer - no failover is possible",
                category.id
            ));
        }
    }

    for writer in &plan.writers {
        let bound = plan
            .categories
            .iter()
            .any(|c| c.writers.iter().any(|b| b.id == writer.id));
        if !bound {
            warnings.push(format!("Writer {} is declared but never bound", writer.id));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Default cooldown: {} ms", summary.cooldown_ms);
            println!("  Writers: {}", summary.writer_count);
            println!("  Categories: {}", summary.category_count);
            println!("  Channels: {}", summary.channel_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
