//! ReplyHandler: one inbound message, start to finish.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use neighbot_types::message::source_tag;

use super::chunk::{MESSAGE_CHAR_LIMIT, split_chunks};
use super::transport::{ChatTransport, InboundMessage};
use crate::adapter::config::SharedDeps;

/// How a single inbound message was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// Authored by the bot itself.
    IgnoredSelf,
    /// No context is bound to the channel.
    UnclaimedChannel,
    /// Stored, but the bot was not addressed.
    Recorded,
    /// Addressed, but another generation was in flight.
    Dropped,
    /// Persisting or generating failed; the turn was abandoned.
    Failed,
    Replied {
        chunks_sent: usize,
        chunks_failed: usize,
    },
}

/// Runs the message-handling contract for one adapter.
#[derive(Debug, Clone)]
pub struct ReplyHandler {
    deps: SharedDeps,
    adapter: String,
}

impl ReplyHandler {
    pub fn new(deps: SharedDeps, adapter: impl Into<String>) -> Self {
        Self {
            deps,
            adapter: adapter.into(),
        }
    }

    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    /// Handle one inbound message.
    ///
    /// Failures are logged and reported through the outcome; nothing here
    /// propagates to the caller.
    pub async fn handle<T: ChatTransport>(
        &self,
        transport: &T,
        message: InboundMessage,
    ) -> TurnOutcome {
        let deps = &self.deps;

        if message.author_id == transport.self_id() {
            return TurnOutcome::IgnoredSelf;
        }

        let Some(context_id) = deps.store.context_id_for_channel(&message.channel_id) else {
            debug!(
                adapter = %self.adapter,
                channel_id = %message.channel_id,
                "no context bound to channel, ignoring"
            );
            return TurnOutcome::UnclaimedChannel;
        };

        deps.mentions
            .remember(&self.adapter, &message.author_name, &message.author_id);

        let source = source_tag(&self.adapter, &message.server, &message.channel);
        let canonical = format!("@{}", deps.store.assistant_name());
        let content = message
            .content
            .replace(&transport.self_mention(), &canonical);

        if let Err(e) = deps
            .store
            .add_user_message(&context_id, &source, &message.author_name, &content)
            .await
        {
            error!(context_id = %context_id, error = %e, "failed to record user message");
            return TurnOutcome::Failed;
        }

        if !transport.is_addressed(&message) {
            return TurnOutcome::Recorded;
        }

        let Some(_permit) = deps.gate.try_acquire(&context_id) else {
            info!(
                context_id = %context_id,
                policy = %deps.gate.policy(),
                "reply already in progress, dropping mention"
            );
            return TurnOutcome::Dropped;
        };

        if let Err(e) = transport.typing(&message.channel_id).await {
            warn!(channel_id = %message.channel_id, error = %e, "failed to send typing indicator");
        }

        let Some(history) = deps.store.messages(&context_id).await else {
            warn!(context_id = %context_id, "context disappeared before generation");
            return TurnOutcome::Failed;
        };
        let request = deps.prompt.build_request(&history);

        let response = match deps.llm.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    context_id = %context_id,
                    provider = %deps.llm.name(),
                    error = %e,
                    "failed to generate reply"
                );
                return TurnOutcome::Failed;
            }
        };
        debug!(
            context_id = %context_id,
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "reply generated"
        );

        let filtered = deps.store.apply_filters(&context_id, &response.content).await;

        if let Err(e) = deps
            .store
            .add_assistant_message(&context_id, &source, &filtered)
            .await
        {
            error!(context_id = %context_id, error = %e, "failed to record assistant message");
            return TurnOutcome::Failed;
        }

        let outbound = deps
            .mentions
            .rewrite(&self.adapter, &filtered, |id| transport.mention(id));

        let mut chunks_sent = 0;
        let mut chunks_failed = 0;
        for (index, chunk) in split_chunks(&outbound, MESSAGE_CHAR_LIMIT)
            .iter()
            .enumerate()
        {
            match transport.send_text(&message.channel_id, chunk).await {
                Ok(()) => chunks_sent += 1,
                Err(e) => {
                    chunks_failed += 1;
                    error!(
                        channel_id = %message.channel_id,
                        chunk = index,
                        error = %e,
                        "failed to deliver reply chunk"
                    );
                }
            }
        }

        TurnOutcome::Replied {
            chunks_sent,
            chunks_failed,
        }
    }
}
