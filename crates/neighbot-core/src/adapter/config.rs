//! Adapter configuration: the shared base, shared dependencies, and the
//! factory that turns stored JSON into a concrete configuration value.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use neighbot_types::error::AdapterError;

use crate::conversation::gate::ReplyGate;
use crate::conversation::mentions::MentionCache;
use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::prompt::PromptSettings;
use crate::memory::store::MemoryStore;

/// Process-wide collaborators injected into every enabled adapter.
#[derive(Clone)]
pub struct SharedDeps {
    pub store: Arc<MemoryStore>,
    pub llm: Arc<BoxLlmProvider>,
    pub gate: Arc<ReplyGate>,
    pub mentions: Arc<MentionCache>,
    pub prompt: Arc<PromptSettings>,
}

impl fmt::Debug for SharedDeps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedDeps")
            .field("contexts", &self.store.len())
            .field("llm", &self.llm.name())
            .field("reply_policy", &self.gate.policy())
            .finish()
    }
}

/// Fields every adapter configuration carries.
///
/// Concrete configs embed this with `#[serde(flatten)]`, so `enabled` sits
/// next to the adapter's own keys in `main.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseAdapterConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(skip)]
    pub shared: Option<SharedDeps>,
}

/// Interface the orchestrator uses on any concrete adapter configuration.
pub trait AdapterConfig: Any + Send + Sync {
    fn base(&self) -> &BaseAdapterConfig;

    fn base_mut(&mut self) -> &mut BaseAdapterConfig;

    /// Convert into `Any` so the owning adapter can recover its concrete type.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;

    fn enabled(&self) -> bool {
        self.base().enabled
    }

    fn set_shared(&mut self, shared: SharedDeps) {
        self.base_mut().shared = Some(shared);
    }
}

/// Recover a concrete configuration from a boxed one.
///
/// Used by adapters in `set_config`; a value of any other type is a
/// configuration type mismatch.
pub fn downcast_config<C: AdapterConfig>(
    config: Box<dyn AdapterConfig>,
    adapter: &str,
) -> Result<C, AdapterError> {
    config
        .into_any()
        .downcast::<C>()
        .map(|boxed| *boxed)
        .map_err(|_| AdapterError::ConfigMismatch {
            adapter: adapter.to_string(),
        })
}

/// Builds configuration values of one registered adapter's config type.
#[derive(Clone, Copy)]
pub struct ConfigFactory {
    decode: fn(serde_json::Value) -> Result<Box<dyn AdapterConfig>, serde_json::Error>,
    default_value: fn() -> Option<serde_json::Value>,
}

fn decode<C>(value: serde_json::Value) -> Result<Box<dyn AdapterConfig>, serde_json::Error>
where
    C: AdapterConfig + DeserializeOwned,
{
    let config: C = serde_json::from_value(value)?;
    Ok(Box::new(config))
}

fn default_value<C>() -> Option<serde_json::Value>
where
    C: Serialize + Default,
{
    serde_json::to_value(C::default()).ok()
}

impl ConfigFactory {
    /// Factory for configuration type `C`.
    pub fn of<C>() -> Self
    where
        C: AdapterConfig + Serialize + DeserializeOwned + Default,
    {
        Self {
            decode: decode::<C>,
            default_value: default_value::<C>,
        }
    }

    /// Decode a stored JSON value. A value that does not fit the
    /// configuration type is an error.
    pub fn from_value(
        &self,
        adapter: &str,
        value: serde_json::Value,
    ) -> Result<Box<dyn AdapterConfig>, AdapterError> {
        (self.decode)(value).map_err(|e| AdapterError::InvalidConfig(format!("{adapter}: {e}")))
    }

    /// A zero-valued configuration, as JSON.
    pub fn default_value(&self) -> Option<serde_json::Value> {
        (self.default_value)()
    }
}

impl fmt::Debug for ConfigFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigFactory").finish_non_exhaustive()
    }
}
