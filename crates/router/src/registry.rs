//! WriterRegistry - writer-kind tag to constructor mapping
//!
//! Replaces runtime type resolution with an explicit registry populated at
//! startup. `build_router` drives the configurator from a typed
//! [`RoutingPlan`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};

use contracts::{LogWriter, RoutingPlan, WriterId, WriterSpec};

use crate::error::RouterError;
use crate::router::{LogRouter, RouterBuilder};
use crate::writers::{ConsoleWriter, FileWriter};

/// Constructor for one writer kind
pub type WriterCtor =
    Box<dyn Fn(&WriterSpec) -> Result<Arc<dyn LogWriter>, RouterError> + Send + Sync>;

/// Maps a writer-kind tag to its constructor function.
///
/// The bundled kinds (`"console"`, `"file"`) are pre-registered by
/// [`WriterRegistry::default`]; embedders register custom kinds at startup.
pub struct WriterRegistry {
    ctors: HashMap<String, WriterCtor>,
}

impl WriterRegistry {
    /// Create an empty registry (no kinds registered)
    pub fn empty() -> Self {
        Self {
            ctors: HashMap::new(),
        }
    }

    /// Register a constructor for a kind tag, replacing any previous one
    pub fn register(&mut self, kind: impl Into<String>, ctor: WriterCtor) {
        self.ctors.insert(kind.into(), ctor);
    }

    /// Construct a writer from its spec
    ///
    /// # Errors
    /// Unknown kind tags and constructor failures are startup errors.
    pub fn create(&self, spec: &WriterSpec) -> Result<Arc<dyn LogWriter>, RouterError> {
        let ctor = self
            .ctors
            .get(&spec.kind)
            .ok_or_else(|| RouterError::UnknownWriterKind {
                kind: spec.kind.clone(),
            })?;
        ctor(spec)
    }
}

impl Default for WriterRegistry {
    /// Registry with the bundled writer kinds
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(
            "console",
            Box::new(|spec| Ok(Arc::new(ConsoleWriter::from_params(spec.id, &spec.params)) as _)),
        );
        registry.register(
            "file",
            Box::new(|spec| {
                let writer = FileWriter::from_params(spec.id, &spec.params)
                    .map_err(|e| RouterError::writer_creation(spec.id, e.to_string()))?;
                Ok(Arc::new(writer) as _)
            }),
        );
        registry
    }
}

/// Build a router from a routing plan, instantiating writers through the
/// registry and driving the configurator.
///
/// # Errors
/// Duplicate writer ids, unknown kinds, unknown writer references and
/// duplicate categories all fail fast before any dispatch happens.
#[instrument(name = "build_router", skip(plan, registry), fields(categories = plan.categories.len()))]
pub fn build_router(plan: &RoutingPlan, registry: &WriterRegistry) -> Result<LogRouter, RouterError> {
    let mut writers: HashMap<WriterId, Arc<dyn LogWriter>> = HashMap::new();
    for spec in &plan.writers {
        if writers.contains_key(&spec.id) {
            return Err(RouterError::DuplicateWriter { id: spec.id });
        }
        writers.insert(spec.id, registry.create(spec)?);
    }

    let mut builder = RouterBuilder::new();
    for category in &plan.categories {
        let cooldown =
            Duration::from_millis(category.cooldown_ms.unwrap_or(plan.failover.cooldown_ms));
        builder.create_category(category.id, cooldown)?;

        for binding in &category.writers {
            let writer = writers.get(&binding.id).ok_or(RouterError::UnknownWriter {
                id: binding.id,
                category: category.id,
            })?;
            builder.bind_writer(category.id, Arc::clone(writer), binding.priority)?;
        }
        for channel in &category.channels {
            builder.bind_channel(category.id, channel)?;
        }
    }

    info!(writers = writers.len(), "Routing plan applied");
    Ok(builder.build())
}
