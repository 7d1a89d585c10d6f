//! Name-indexed registry of adapter factories.
//!
//! Each entry pairs a constructor for a fresh, unconfigured adapter with the
//! [`ConfigFactory`] for its configuration type. Entries are registered once
//! at startup and only read afterwards.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use neighbot_types::error::AdapterError;

use super::chat_adapter::{BoxChatAdapter, ChatAdapter};
use super::config::{AdapterConfig, ConfigFactory};

struct AdapterEntry {
    make: fn() -> BoxChatAdapter,
    config: ConfigFactory,
}

fn make_adapter<A: ChatAdapter + Default + 'static>() -> BoxChatAdapter {
    BoxChatAdapter::new(A::default())
}

/// Registry of constructible adapters, indexed by name.
#[derive(Default)]
pub struct AdapterRegistry {
    entries: BTreeMap<String, AdapterEntry>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register adapter type `A` with configuration type `C` under `name`.
    ///
    /// The name must be non-empty and match the name the adapter reports.
    /// Re-registering a name replaces the previous entry.
    pub fn register<A, C>(&mut self, name: &str) -> Result<(), AdapterError>
    where
        A: ChatAdapter + Default + 'static,
        C: AdapterConfig + Serialize + DeserializeOwned + Default,
    {
        if name.trim().is_empty() {
            return Err(AdapterError::InvalidName(name.to_string()));
        }
        let probe = A::default();
        if probe.name() != name {
            return Err(AdapterError::InvalidName(format!(
                "{name} (adapter reports '{}')",
                probe.name()
            )));
        }

        self.entries.insert(
            name.to_string(),
            AdapterEntry {
                make: make_adapter::<A>,
                config: ConfigFactory::of::<C>(),
            },
        );
        debug!(adapter = %name, "adapter registered");
        Ok(())
    }

    /// Build a fresh adapter and the factory for its configuration.
    pub fn create(&self, name: &str) -> Result<(BoxChatAdapter, ConfigFactory), AdapterError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| AdapterError::NotFound(name.to_string()))?;
        Ok(((entry.make)(), entry.config))
    }

    /// Registered adapter names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// A zero-valued configuration for a registered adapter, as JSON.
    pub fn default_config(&self, name: &str) -> Option<serde_json::Value> {
        self.entries.get(name)?.config.default_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{NullAdapter, NullConfig};
    use neighbot_types::adapter::AdapterState;

    #[test]
    fn test_register_then_create() {
        let mut registry = AdapterRegistry::new();
        registry.register::<NullAdapter, NullConfig>("null").unwrap();

        let (adapter, _factory) = registry.create("null").unwrap();
        assert_eq!(adapter.name(), "null");
        assert_eq!(adapter.state(), AdapterState::Unconfigured);
    }

    #[test]
    fn test_create_unregistered_fails() {
        let registry = AdapterRegistry::new();
        let err = registry.create("irc").err().unwrap();
        assert!(matches!(err, AdapterError::NotFound(name) if name == "irc"));
    }

    #[test]
    fn test_register_rejects_bad_names() {
        let mut registry = AdapterRegistry::new();
        assert!(registry.register::<NullAdapter, NullConfig>("").is_err());
        assert!(registry.register::<NullAdapter, NullConfig>("other").is_err());
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_reregister_overwrites() {
        let mut registry = AdapterRegistry::new();
        registry.register::<NullAdapter, NullConfig>("null").unwrap();
        registry.register::<NullAdapter, NullConfig>("null").unwrap();
        assert_eq!(registry.names(), vec!["null"]);
    }

    #[test]
    fn test_default_config() {
        let mut registry = AdapterRegistry::new();
        registry.register::<NullAdapter, NullConfig>("null").unwrap();
        let value = registry.default_config("null").unwrap();
        assert_eq!(value["enabled"], false);
        assert!(registry.default_config("missing").is_none());
    }

    #[test]
    fn test_each_create_is_fresh() {
        let mut registry = AdapterRegistry::new();
        registry.register::<NullAdapter, NullConfig>("null").unwrap();

        let (mut first, factory) = registry.create("null").unwrap();
        let config = factory
            .from_value("null", serde_json::json!({"enabled": true}))
            .unwrap();
        first.set_config(config).unwrap();
        assert_eq!(first.state(), AdapterState::Configured);

        let (second, _) = registry.create("null").unwrap();
        assert_eq!(second.state(), AdapterState::Unconfigured);
    }
}
