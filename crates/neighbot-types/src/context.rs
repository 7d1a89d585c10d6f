//! Conversation contexts.
//!
//! A [`Context`] is a logical conversation independent of any chat platform.
//! It owns the message history and the per-context filter switches, and is
//! bound to zero or more external channel identifiers.
//!
//! Serialized form (`config.json`) carries only metadata; the history lives
//! in a separate `memory.json` so the two files can be written independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Filters enabled on freshly created contexts.
pub const DEFAULT_FILTERS: [&str; 3] = ["remove_emojis", "remove_emphasis", "remove_links"];

pub const DEFAULT_CONTEXT_NAME: &str = "New Chat";
pub const DEFAULT_CONTEXT_DESCRIPTION: &str = "New context for testing.";

/// A persisted conversation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Stable identifier; also the directory name on disk.
    ///
    /// Older self-healed files wrote this as `context_id`.
    #[serde(default, alias = "context_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Filter name -> enabled. Ordered by name, which fixes pipeline order.
    #[serde(default)]
    pub filters: BTreeMap<String, bool>,
    /// External channel identifiers bound to this context.
    #[serde(default)]
    pub associated_chats: Vec<String>,
    /// Chronological history. Persisted separately in `memory.json`.
    #[serde(skip)]
    pub messages: Vec<Message>,
}

impl Context {
    /// A new context with default metadata and the three built-in filters on.
    pub fn with_defaults(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: DEFAULT_CONTEXT_NAME.to_string(),
            description: DEFAULT_CONTEXT_DESCRIPTION.to_string(),
            filters: DEFAULT_FILTERS
                .iter()
                .map(|name| (name.to_string(), true))
                .collect(),
            associated_chats: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Names of enabled filters, in pipeline order.
    pub fn enabled_filters(&self) -> impl Iterator<Item = &str> {
        self.filters
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(name, _)| name.as_str())
    }

    /// Whether this context claims the given channel.
    pub fn claims(&self, channel_id: &str) -> bool {
        self.associated_chats.iter().any(|c| c == channel_id)
    }
}
