//! ChatTransport trait: what the reply handler needs from a platform.

use std::future::Future;

use serde::{Deserialize, Serialize};

use neighbot_types::error::AdapterError;

/// One inbound chat event, already stripped of platform specifics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Platform channel id, the key used for context lookup.
    pub channel_id: String,
    pub author_id: String,
    pub author_name: String,
    /// Human-readable server name, used in the source tag.
    #[serde(default)]
    pub server: String,
    /// Human-readable channel name, used in the source tag.
    #[serde(default)]
    pub channel: String,
    pub content: String,
}

/// Outbound side of a chat platform, as seen by the reply handler.
pub trait ChatTransport: Send + Sync {
    /// The bot's own user id on this platform.
    fn self_id(&self) -> &str;

    /// The platform-native token that mentions the bot.
    fn self_mention(&self) -> String;

    /// The platform-native token that mentions `user_id`.
    fn mention(&self, user_id: &str) -> String;

    /// Whether the message addresses the bot directly.
    fn is_addressed(&self, message: &InboundMessage) -> bool {
        message.content.contains(&self.self_mention())
    }

    /// Show a typing indicator in the channel.
    fn typing(&self, channel_id: &str) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Deliver one message to the channel.
    fn send_text(
        &self,
        channel_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send;
}
