//! Main configuration types for NeighBot.
//!
//! `MainConfig` is the top-level `main.json` in the config directory. Adapter
//! sections are kept as raw JSON values because only the adapter registry
//! knows each adapter's concrete configuration shape.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MainConfig {
    #[serde(default)]
    pub adapters: AdaptersConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

/// Per-adapter configuration blobs, keyed by registered adapter name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdaptersConfig {
    #[serde(default)]
    pub configs: BTreeMap<String, serde_json::Value>,
}

/// Completion endpoint settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
}

// Manual Debug so the API key never lands in logs.
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: "-".to_string(),
            endpoint: "http://localhost:8000".to_string(),
            model: "my-default-model".to_string(),
        }
    }
}

/// Bot identity and reply behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Display name used for assistant turns and the canonical `@Name` token.
    #[serde(default = "default_bot_name")]
    pub name: String,
    #[serde(default = "default_persona")]
    pub persona: String,
    /// Who the bot says created it. Empty omits the line from the prompt.
    #[serde(default = "default_creator")]
    pub creator: String,
    /// Picture the bot links when asked what it looks like. Empty omits it.
    #[serde(default = "default_avatar_url")]
    pub avatar_url: String,
    #[serde(default)]
    pub reply_policy: ReplyPolicy,
}

fn default_bot_name() -> String {
    "NeighBot".to_string()
}

fn default_persona() -> String {
    "friendly virtual horse, who likes carrot cake".to_string()
}

fn default_creator() -> String {
    "DatHorse".to_string()
}

fn default_avatar_url() -> String {
    "https://dathorse.com/SeriousCarrots/neighbot_real_nofake_carrot_certified.jpg".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            persona: default_persona(),
            creator: default_creator(),
            avatar_url: default_avatar_url(),
            reply_policy: ReplyPolicy::default(),
        }
    }
}

/// How concurrent reply generation is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyPolicy {
    /// One generation in flight across the whole process; others are dropped.
    #[default]
    Global,
    /// One generation in flight per context.
    PerContext,
}

impl fmt::Display for ReplyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyPolicy::Global => write!(f, "global"),
            ReplyPolicy::PerContext => write!(f, "per_context"),
        }
    }
}

impl FromStr for ReplyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "global" => Ok(ReplyPolicy::Global),
            "per_context" => Ok(ReplyPolicy::PerContext),
            other => Err(format!("invalid reply policy: '{other}'")),
        }
    }
}
