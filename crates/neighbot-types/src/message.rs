//! Stored conversation messages.
//!
//! A [`Message`] is one turn in a context's history. Messages are appended in
//! chronological order and never edited afterwards; the whole sequence is
//! loaded and saved as a unit in a context's `memory.json`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::llm::MessageRole;

/// One turn in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Display name of the speaker (the assistant name for bot turns).
    pub username: String,
    /// Provenance tag: `<adapter>:<server>:<channel>`.
    pub source: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn now(
        role: MessageRole,
        username: impl Into<String>,
        source: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            source: source.into(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// On-disk shape of a context's `memory.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryFile {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Build a provenance tag from an adapter name and a coarse location.
pub fn source_tag(adapter: &str, server: &str, channel: &str) -> String {
    format!("{adapter}:{server}:{channel}")
}
