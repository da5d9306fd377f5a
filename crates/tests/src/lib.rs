//! # Integration Tests
//!
//! End-to-end tests across the routing workspace.
//!
//! Covers:
//! - Failover, cooldown and recovery through the full router
//! - Config -> registry -> router -> pipeline flow
//! - Teardown guarantees

#[cfg(test)]
mod support {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use contracts::{LogError, LogWriter, WriterId, WriterStatus};

    /// Controllable writer: record deliveries, flip failures on and off.
    pub struct ScriptedWriter {
        id: WriterId,
        status: WriterStatus,
        received: Mutex<Vec<(String, Vec<String>)>>,
        pub write_attempts: AtomicU64,
        pub shutdown_calls: AtomicU64,
        failing: AtomicBool,
    }

    impl ScriptedWriter {
        pub fn new(id: WriterId) -> Arc<Self> {
            Arc::new(Self {
                id,
                status: WriterStatus::new(),
                received: Mutex::new(Vec::new()),
                write_attempts: AtomicU64::new(0),
                shutdown_calls: AtomicU64::new(0),
                failing: AtomicBool::new(false),
            })
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn fields_received(&self) -> Vec<String> {
            self.received
                .lock()
                .unwrap()
                .iter()
                .flat_map(|(_, fields)| fields.iter().cloned())
                .collect()
        }
    }

    #[async_trait]
    impl LogWriter for ScriptedWriter {
        fn id(&self) -> WriterId {
            self.id
        }

        fn status(&self) -> &WriterStatus {
            &self.status
        }

        async fn write(&self, channel: &str, fields: &[String]) -> Result<(), LogError> {
            self.write_attempts.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(LogError::writer_write(self.id, channel, "destination down"));
            }
            self.received
                .lock()
                .unwrap()
                .push((channel.to_string(), fields.to_vec()));
            Ok(())
        }

        async fn shutdown(&self) {
            self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
            self.status.shutdown();
        }
    }

    /// Registry that constructs pre-built scripted writers by id.
    pub fn scripted_registry(
        writers: &[Arc<ScriptedWriter>],
    ) -> router::WriterRegistry {
        let by_id: HashMap<WriterId, Arc<ScriptedWriter>> =
            writers.iter().map(|w| (w.id(), Arc::clone(w))).collect();
        let mut registry = router::WriterRegistry::empty();
        registry.register(
            "scripted",
            Box::new(move |spec| {
                by_id
                    .get(&spec.id)
                    .map(|w| Arc::clone(w) as Arc<dyn contracts::LogWriter>)
                    .ok_or_else(|| {
                        router::RouterError::writer_creation(spec.id, "no scripted writer")
                    })
            }),
        );
        registry
    }
}

#[cfg(test)]
mod failover_e2e {
    use super::support::ScriptedWriter;
    use router::RouterBuilder;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::sleep;

    fn two_writer_router(
        primary: &Arc<ScriptedWriter>,
        fallback: &Arc<ScriptedWriter>,
        cooldown: Duration,
    ) -> router::LogRouter {
        let mut builder = RouterBuilder::new();
        builder.create_category(1, cooldown).unwrap();
        builder
            .bind_writer(1, Arc::clone(primary) as _, 12)
            .unwrap();
        builder
            .bind_writer(1, Arc::clone(fallback) as _, 9)
            .unwrap();
        builder.bind_channel(1, "Errors").unwrap();
        builder.build()
    }

    /// Failure, cooldown routing and priority reclaim through the full
    /// router: v1 to the primary, v2 and v3 to the fallback while the
    /// primary cools down, v4 back on the primary after recovery.
    #[tokio::test]
    async fn test_failover_cooldown_and_recovery() {
        let primary = ScriptedWriter::new(1);
        let fallback = ScriptedWriter::new(2);
        let router = two_writer_router(&primary, &fallback, Duration::from_millis(1000));

        router.write("Errors", &["v1".to_string()]).await.unwrap();
        assert_eq!(primary.fields_received(), vec!["v1"]);

        // Primary goes down; the record is retried on the fallback.
        primary.set_failing(true);
        router.write("Errors", &["v2".to_string()]).await.unwrap();
        assert_eq!(fallback.fields_received(), vec!["v2"]);

        // The destination comes back, but the cooldown still routes past it.
        primary.set_failing(false);
        router.write("Errors", &["v3".to_string()]).await.unwrap();
        assert_eq!(fallback.fields_received(), vec!["v2", "v3"]);

        // After the cooldown expires the primary reclaims its priority.
        sleep(Duration::from_millis(1100)).await;
        router.write("Errors", &["v4".to_string()]).await.unwrap();
        assert_eq!(primary.fields_received(), vec!["v1", "v4"]);

        let metrics = router.metrics();
        assert_eq!(metrics.dispatched, 4);
        assert_eq!(metrics.failovers, 1);
        assert_eq!(metrics.exhausted, 0);
    }

    #[tokio::test]
    async fn test_exhaustion_attempts_each_writer_once() {
        let primary = ScriptedWriter::new(1);
        let fallback = ScriptedWriter::new(2);
        primary.set_failing(true);
        fallback.set_failing(true);
        let router = two_writer_router(&primary, &fallback, Duration::from_millis(1000));
        let mut failures = router.failures();

        let result = router.write("Errors", &["lost".to_string()]).await;
        assert!(matches!(
            result,
            Err(router::RouterError::Exhausted { category: 1, .. })
        ));

        assert_eq!(primary.write_attempts.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.write_attempts.load(Ordering::SeqCst), 1);

        let first = failures.try_recv().unwrap();
        let second = failures.try_recv().unwrap();
        assert!(!first.fatal);
        assert!(second.fatal);
    }

    #[tokio::test]
    async fn test_channel_fans_out_across_categories() {
        let audit = ScriptedWriter::new(1);
        let archive = ScriptedWriter::new(2);
        let mut builder = RouterBuilder::new();
        builder
            .create_category(1, Duration::from_millis(100))
            .unwrap();
        builder
            .create_category(2, Duration::from_millis(100))
            .unwrap();
        builder.bind_writer(1, Arc::clone(&audit) as _, 10).unwrap();
        builder
            .bind_writer(2, Arc::clone(&archive) as _, 10)
            .unwrap();
        builder.bind_channel(1, "Audit").unwrap();
        builder.bind_channel(2, "Audit").unwrap();
        let router = builder.build();

        router.write("Audit", &["entry".to_string()]).await.unwrap();

        assert_eq!(audit.fields_received(), vec!["entry"]);
        assert_eq!(archive.fields_received(), vec!["entry"]);
    }
}

#[cfg(test)]
mod pipeline_e2e {
    use super::support::{scripted_registry, ScriptedWriter};
    use config_loader::{ConfigFormat, ConfigLoader};
    use pipeline::{BackgroundLogger, RecordProcessor};
    use router::build_router;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    const PLAN_TOML: &str = r#"
[failover]
cooldown_ms = 200

[[writers]]
id = 1
kind = "scripted"

[[writers]]
id = 2
kind = "scripted"

[[categories]]
id = 1
channels = ["Errors", "Audit"]

[[categories.writers]]
id = 1
priority = 12

[[categories.writers]]
id = 2
priority = 9
"#;

    /// Full flow: TOML plan -> registry -> router -> background pipeline.
    #[tokio::test]
    async fn test_config_to_pipeline_flow() {
        let plan = ConfigLoader::load_from_str(PLAN_TOML, ConfigFormat::Toml).unwrap();
        let primary = ScriptedWriter::new(1);
        let fallback = ScriptedWriter::new(2);
        let registry = scripted_registry(&[Arc::clone(&primary), Arc::clone(&fallback)]);
        let router = Arc::new(build_router(&plan, &registry).unwrap());

        let logger = BackgroundLogger::start(Arc::clone(&router));
        logger.enqueue("Errors", vec!["e1".to_string()]);
        logger.enqueue("Audit", vec!["a1".to_string()]);
        logger.enqueue("Unrouted", vec!["dropped".to_string()]);
        logger.stop().await;

        let mut fields = primary.fields_received();
        fields.sort();
        assert_eq!(fields, vec!["a1", "e1"]);
        assert!(fallback.fields_received().is_empty());
        assert_eq!(router.metrics().dropped, 1);
    }

    #[tokio::test]
    async fn test_pipeline_failover_under_load() {
        let plan = ConfigLoader::load_from_str(PLAN_TOML, ConfigFormat::Toml).unwrap();
        let primary = ScriptedWriter::new(1);
        let fallback = ScriptedWriter::new(2);
        primary.set_failing(true);
        let registry = scripted_registry(&[Arc::clone(&primary), Arc::clone(&fallback)]);
        let router = Arc::new(build_router(&plan, &registry).unwrap());

        let processor = RecordProcessor::with_period(Arc::clone(&router), Duration::from_millis(20));
        for i in 0..50 {
            processor.enqueue("Errors", vec![format!("v{i}")]);
        }
        processor.stop().await;

        // Everything lands on the fallback; the primary is demoted once.
        assert_eq!(fallback.fields_received().len(), 50);
        assert!(primary.write_attempts.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_shutdown_reaches_every_writer_once() {
        let plan = ConfigLoader::load_from_str(PLAN_TOML, ConfigFormat::Toml).unwrap();
        let primary = ScriptedWriter::new(1);
        let fallback = ScriptedWriter::new(2);
        let registry = scripted_registry(&[Arc::clone(&primary), Arc::clone(&fallback)]);
        let router = build_router(&plan, &registry).unwrap();

        router.shutdown().await;

        assert_eq!(primary.shutdown_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.shutdown_calls.load(Ordering::SeqCst), 1);
    }
}

#[cfg(test)]
mod observability_e2e {
    use super::support::ScriptedWriter;
    use observability::FailureAggregator;
    use router::RouterBuilder;
    use std::sync::Arc;
    use std::time::Duration;

    /// Failure notifications feed the aggregator used for run summaries.
    #[tokio::test]
    async fn test_failures_aggregate_per_category() {
        let primary = ScriptedWriter::new(1);
        let fallback = ScriptedWriter::new(2);
        primary.set_failing(true);
        fallback.set_failing(true);

        let mut builder = RouterBuilder::new();
        builder
            .create_category(1, Duration::from_millis(100))
            .unwrap();
        builder.bind_writer(1, Arc::clone(&primary) as _, 12).unwrap();
        builder.bind_writer(1, Arc::clone(&fallback) as _, 9).unwrap();
        builder.bind_channel(1, "Errors").unwrap();
        let router = builder.build();
        let mut failures = router.failures();

        let _ = router.write("Errors", &["lost".to_string()]).await;

        let mut aggregator = FailureAggregator::new();
        while let Ok(failure) = failures.try_recv() {
            aggregator.update(&failure);
        }

        let summary = aggregator.summary();
        assert_eq!(summary.total_failures, 2);
        assert_eq!(summary.fatal_failures, 1);
        assert_eq!(summary.by_category[&1], 2);
    }
}

#[cfg(test)]
mod file_writer_e2e {
    use config_loader::{ConfigFormat, ConfigLoader};
    use pipeline::BackgroundLogger;
    use router::{build_router, WriterRegistry};
    use std::sync::Arc;

    /// Bundled file writer exercised through the whole stack.
    #[tokio::test]
    async fn test_records_land_in_channel_files() {
        let dir = tempfile::tempdir().unwrap();
        let plan_toml = format!(
            r#"
[[writers]]
id = 1
kind = "file"
[writers.params]
output_dir = "{}"

[[categories]]
id = 1
channels = ["Errors"]

[[categories.writers]]
id = 1
priority = 10
"#,
            dir.path().display()
        );

        let plan = ConfigLoader::load_from_str(&plan_toml, ConfigFormat::Toml).unwrap();
        let router = Arc::new(build_router(&plan, &WriterRegistry::default()).unwrap());

        let logger = BackgroundLogger::start(Arc::clone(&router));
        logger.enqueue("Errors", vec!["disk".to_string(), "full".to_string()]);
        logger.stop().await;

        match Arc::try_unwrap(router) {
            Ok(router) => router.shutdown().await,
            Err(_) => panic!("router still referenced"),
        }

        let content = std::fs::read_to_string(dir.path().join("Errors.log")).unwrap();
        assert!(content.contains("disk"), "got: {content}");
    }
}
