//! Orchestrator: wires configured adapters to the shared dependencies and
//! drives their lifecycle.
//!
//! Startup and shutdown run on a single task. Once `start_all` returns,
//! adapters deliver events on their own tasks.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{error, info, warn};

use neighbot_types::error::AdapterError;

use crate::adapter::chat_adapter::BoxChatAdapter;
use crate::adapter::config::SharedDeps;
use crate::adapter::registry::AdapterRegistry;

/// Startup failures that must abort the process.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("configuration for adapter '{adapter}' rejected: {source}")]
    Config {
        adapter: String,
        #[source]
        source: AdapterError,
    },
}

/// Owns the adapter registry and every running adapter.
pub struct Orchestrator {
    registry: AdapterRegistry,
    shared: SharedDeps,
    running: Vec<BoxChatAdapter>,
}

impl Orchestrator {
    pub fn new(registry: AdapterRegistry, shared: SharedDeps) -> Self {
        Self {
            registry,
            shared,
            running: Vec::new(),
        }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn shared(&self) -> &SharedDeps {
        &self.shared
    }

    /// Add a default entry for every registered adapter missing from
    /// `configs`. Returns the number of entries added.
    pub fn seed_default_configs(&self, configs: &mut BTreeMap<String, serde_json::Value>) -> usize {
        let mut added = 0;
        for name in self.registry.names() {
            if configs.contains_key(&name) {
                continue;
            }
            if let Some(value) = self.registry.default_config(&name) {
                info!(adapter = %name, "seeding default adapter config");
                configs.insert(name, value);
                added += 1;
            }
        }
        added
    }

    /// Configure, initialize and start every enabled adapter, in name order.
    ///
    /// A configuration that does not fit its adapter is fatal, and adapters
    /// started before it are stopped again. Adapters that fail to initialize
    /// or start are logged and skipped. Returns the number of adapters now
    /// running.
    pub async fn start_all(
        &mut self,
        configs: &BTreeMap<String, serde_json::Value>,
    ) -> Result<usize, OrchestratorError> {
        for (name, value) in configs {
            let (mut adapter, factory) = match self.registry.create(name) {
                Ok(created) => created,
                Err(_) => {
                    warn!(adapter = %name, "no adapter registered under this name, skipping");
                    continue;
                }
            };

            let mut config = match factory.from_value(name, value.clone()) {
                Ok(config) => config,
                Err(source) => return Err(self.abort_startup(name, source).await),
            };
            if !config.enabled() {
                info!(adapter = %name, "adapter disabled");
                continue;
            }
            config.set_shared(self.shared.clone());

            if let Err(source) = adapter.set_config(config) {
                return Err(self.abort_startup(name, source).await);
            }

            if let Err(e) = adapter.initialize() {
                error!(adapter = %name, error = %e, "failed to initialize adapter");
                continue;
            }
            if let Err(e) = adapter.start().await {
                error!(adapter = %name, error = %e, "failed to start adapter");
                continue;
            }

            info!(adapter = %name, "adapter started");
            self.running.push(adapter);
        }
        Ok(self.running.len())
    }

    /// Stop what already started, then build the fatal error.
    async fn abort_startup(&mut self, adapter: &str, source: AdapterError) -> OrchestratorError {
        error!(adapter = %adapter, error = %source, "adapter configuration rejected, aborting startup");
        self.stop_all().await;
        OrchestratorError::Config {
            adapter: adapter.to_string(),
            source,
        }
    }

    /// Stop every running adapter, most recently started first.
    pub async fn stop_all(&mut self) {
        while let Some(mut adapter) = self.running.pop() {
            let name = adapter.name().to_string();
            match adapter.stop().await {
                Ok(()) => info!(adapter = %name, "adapter stopped"),
                Err(e) => error!(adapter = %name, error = %e, "failed to stop adapter"),
            }
        }
    }

    /// Names of running adapters, in start order.
    pub fn running(&self) -> Vec<String> {
        self.running.iter().map(|a| a.name().to_string()).collect()
    }
}
