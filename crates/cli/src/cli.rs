//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// logroute - resilient log routing with per-category writer failover
#[derive(Parser, Debug)]
#[command(
    name = "logroute",
    author,
    version,
    about = "Failover log routing runtime",
    long_about = "Routes channel-tagged log records to priority-ordered writer chains.\n\n\
                  Reads records from stdin (one per line: channel followed by fields), \n\
                  batches them off the hot path and fails over across writers when a \n\
                  destination goes down."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOGROUTE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "LOGROUTE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the routing pipeline, reading records from stdin
    Run(RunArgs),

    /// Validate a routing configuration without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to routing configuration file (TOML or JSON)
    #[arg(short, long, default_value = "routing.toml", env = "LOGROUTE_CONFIG")]
    pub config: PathBuf,

    /// Flush period in milliseconds (0 = reactive draining)
    #[arg(long, default_value = "0", env = "LOGROUTE_FLUSH_PERIOD_MS")]
    pub flush_period_ms: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LOGROUTE_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "routing.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
