//! Configuration of the webhook adapter, stored under
//! `adapters.configs.webhook` in `main.json`.

use std::any::Any;

use serde::{Deserialize, Serialize};

use neighbot_core::adapter::config::{AdapterConfig, BaseAdapterConfig};

pub const DEFAULT_BIND: &str = "127.0.0.1:8787";
pub const DEFAULT_BOT_ID: &str = "neighbot";
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(flatten)]
    pub base: BaseAdapterConfig,
    /// Listen address for inbound `POST /messages`.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Bearer token required on inbound requests and sent on outbound ones.
    #[serde(default)]
    pub token: String,
    /// Where replies are delivered.
    #[serde(default)]
    pub callback_url: String,
    /// The bot's user id on the bridged platform.
    #[serde(default = "default_bot_id")]
    pub bot_id: String,
    /// How long `stop` waits for in-flight requests before aborting the server.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_bot_id() -> String {
    DEFAULT_BOT_ID.to_string()
}

fn default_shutdown_grace_secs() -> u64 {
    DEFAULT_SHUTDOWN_GRACE_SECS
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            base: BaseAdapterConfig::default(),
            bind: default_bind(),
            token: String::new(),
            callback_url: String::new(),
            bot_id: default_bot_id(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

impl AdapterConfig for WebhookConfig {
    fn base(&self) -> &BaseAdapterConfig {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseAdapterConfig {
        &mut self.base
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}
