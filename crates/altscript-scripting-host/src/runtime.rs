use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::config::ScriptingConfig;
use crate::docs::DocsGenerator;
use crate::engine::ScriptEngine;
use crate::error::EngineError;
use crate::host::{Package, ResourceInfo};
use crate::host_imports::add_host_imports;
use crate::registry::{registry, EventRegistry};
use crate::resource::ScriptResource;
use crate::timer::{Clock, MonotonicClock};

/// Owns one interpreter engine with the host bindings installed, and creates
/// resources that compile against it
pub struct ScriptRuntime {
    engine: Rc<dyn ScriptEngine>,
    registry: &'static EventRegistry,
    docs: DocsGenerator,
    config: ScriptingConfig,
    clock: Rc<dyn Clock>,
}

impl ScriptRuntime {
    /// Install the host bindings into `engine` using the builtin event registry
    pub fn new<E: ScriptEngine + 'static>(
        engine: E,
        config: ScriptingConfig,
    ) -> Result<Self, EngineError> {
        Self::with_registry(engine, config, registry())
    }

    pub fn with_registry<E: ScriptEngine + 'static>(
        mut engine: E,
        config: ScriptingConfig,
        registry: &'static EventRegistry,
    ) -> Result<Self, EngineError> {
        let mut docs = DocsGenerator::new(config.docs_module.clone());

        debug!(target: "scripting", "Registering host functions");
        add_host_imports(&mut engine, &mut docs)?;
        registry.expose_all(&mut engine, &mut docs)?;
        info!(
            target: "scripting",
            "Exposed {} event types to scripts",
            registry.len()
        );

        if config.generate_docs {
            let dir = config.docs_dir();
            if let Err(e) = docs.write_to(&dir) {
                warn!(target: "scripting", "Failed to write docs to {}: {}", dir.display(), e);
            }
        }

        Ok(Self {
            engine: Rc::new(engine),
            registry,
            docs,
            config,
            clock: Rc::new(MonotonicClock),
        })
    }

    /// Time source handed to every resource created afterwards
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn create_resource(&self, info: ResourceInfo, package: Rc<dyn Package>) -> ScriptResource {
        debug!(target: "scripting", "Creating resource {}", info.name);
        ScriptResource::new(info, package, Rc::clone(&self.engine))
            .with_registry(self.registry)
            .with_clock(Rc::clone(&self.clock))
            .with_debug(self.config.debug)
    }

    pub fn engine(&self) -> &Rc<dyn ScriptEngine> {
        &self.engine
    }

    pub fn docs(&self) -> &DocsGenerator {
        &self.docs
    }

    pub fn config(&self) -> &ScriptingConfig {
        &self.config
    }
}
