//! `run` command implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use contracts::{RoutingPlan, WriteFailure};
use observability::FailureAggregator;
use pipeline::{BackgroundLogger, RecordProcessor};
use router::{build_router, WriterRegistry};

use crate::cli::RunArgs;

/// Execute the `run` command
pub async fn run_routing(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let plan = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        writers = plan.writers.len(),
        categories = plan.categories.len(),
        cooldown_ms = plan.failover.cooldown_ms,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_plan_summary(&plan);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)
            .context("Failed to start metrics endpoint")?;
    }

    let registry = WriterRegistry::default();
    let router = Arc::new(build_router(&plan, &registry).context("Failed to build router")?);

    let observer = spawn_failure_observer(router.failures());

    let front = if args.flush_period_ms == 0 {
        Front::Reactive(BackgroundLogger::start(Arc::clone(&router)))
    } else {
        Front::Periodic(RecordProcessor::with_period(
            Arc::clone(&router),
            Duration::from_millis(args.flush_period_ms),
        ))
    };

    info!("Routing pipeline started, reading records from stdin");

    let shutdown = setup_shutdown_signal();
    tokio::pin!(shutdown);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => enqueue_line(&front, &line),
                    None => {
                        info!("Input closed, draining");
                        break;
                    }
                }
            }
            _ = &mut shutdown => {
                warn!("Received shutdown signal, stopping pipeline");
                break;
            }
        }
    }

    front.stop().await;

    // The failure channel closes when the router is torn down, which lets
    // the observer task finish and hand back its totals.
    let metrics = router.metrics();
    match Arc::try_unwrap(router) {
        Ok(router) => router.shutdown().await,
        Err(_) => warn!("Router still referenced, skipping writer shutdown"),
    }

    if let Ok(aggregator) = observer.await {
        let summary = aggregator.summary();
        if summary.total_failures > 0 {
            println!("{summary}");
        }
    }

    info!(
        dispatched = metrics.dispatched,
        failovers = metrics.failovers,
        dropped = metrics.dropped,
        "logroute finished"
    );
    Ok(())
}

/// Runtime-selected submission front
enum Front {
    Reactive(BackgroundLogger),
    Periodic(RecordProcessor),
}

impl Front {
    fn enqueue(&self, channel: &str, fields: Vec<String>) -> bool {
        match self {
            Front::Reactive(logger) => logger.enqueue(channel, fields),
            Front::Periodic(processor) => processor.enqueue(channel, fields),
        }
    }

    async fn stop(self) {
        match self {
            Front::Reactive(logger) => logger.stop().await,
            Front::Periodic(processor) => processor.stop().await,
        }
    }
}

/// Parse one stdin line: the first token is the channel, the rest are fields.
fn enqueue_line(front: &Front, line: &str) {
    let mut tokens = line.split_whitespace();
    let Some(channel) = tokens.next() else {
        return;
    };
    let fields: Vec<String> = tokens.map(str::to_string).collect();
    front.enqueue(channel, fields);
}

/// Observe failure notifications: log them, feed the metrics facade and
/// aggregate totals for the end-of-run summary.
fn spawn_failure_observer(
    mut failures: broadcast::Receiver<WriteFailure>,
) -> JoinHandle<FailureAggregator> {
    tokio::spawn(async move {
        let mut aggregator = FailureAggregator::new();
        loop {
            match failures.recv().await {
                Ok(failure) => {
                    observability::record_write_failure(&failure);
                    if failure.fatal {
                        observability::record_category_exhausted(failure.category);
                        error!(
                            category = failure.category,
                            error = %failure.error,
                            "Category exhausted"
                        );
                    } else {
                        observability::record_failover(failure.category);
                        warn!(
                            category = failure.category,
                            error = %failure.error,
                            "Writer failed, failing over"
                        );
                    }
                    aggregator.update(&failure);
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Failure observer lagged, events lost");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        aggregator
    })
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_plan_summary(plan: &RoutingPlan) {
    println!("\n=== Routing Plan Summary ===\n");
    println!("Default cooldown: {} ms", plan.failover.cooldown_ms);

    println!("\nWriters ({}):", plan.writers.len());
    for writer in &plan.writers {
        println!("  - {} ({})", writer.id, writer.kind);
    }

    println!("\nCategories ({}):", plan.categories.len());
    for category in &plan.categories {
        let chain: Vec<String> = category
            .writers
            .iter()
            .map(|b| format!("{}@{}", b.id, b.priority))
            .collect();
        println!(
            "  - {} -> [{}] channels: {:?}",
            category.id,
            chain.join(", "),
            category.channels
        );
    }

    println!();
}
