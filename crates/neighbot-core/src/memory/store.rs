//! MemoryStore: the set of known contexts and their write-through persistence.
//!
//! Contexts live in a `DashMap` keyed by id, each behind its own async mutex,
//! so traffic on independent channels never contends on a store-wide lock.
//! Every mutation persists the affected document while the context lock is
//! held, which keeps concurrent appends from interleaving file writes.
//!
//! Channel lookup goes through a direct `channel -> context` index rather
//! than scanning every context.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use neighbot_types::context::Context;
use neighbot_types::error::StoreError;
use neighbot_types::message::{Message, MessageRole};

use super::repository::BoxContextRepository;
use crate::filter::pipeline::FilterPipeline;
use crate::filter::registry::FilterRegistry;

/// A context plus its lazily built filter pipeline.
struct ContextSlot {
    context: Context,
    pipeline: Option<FilterPipeline>,
}

impl ContextSlot {
    fn new(context: Context) -> Self {
        Self {
            context,
            pipeline: None,
        }
    }
}

/// Owns every context, indexes them by channel, and persists mutations.
pub struct MemoryStore {
    contexts: DashMap<String, Arc<Mutex<ContextSlot>>>,
    channels: DashMap<String, String>,
    repository: BoxContextRepository,
    filters: Arc<FilterRegistry>,
    assistant_name: String,
}

impl MemoryStore {
    /// Create an empty store backed by the given repository.
    pub fn new(
        repository: BoxContextRepository,
        filters: Arc<FilterRegistry>,
        assistant_name: impl Into<String>,
    ) -> Self {
        Self {
            contexts: DashMap::new(),
            channels: DashMap::new(),
            repository,
            filters,
            assistant_name: assistant_name.into(),
        }
    }

    /// Name recorded as the speaker of assistant turns.
    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    fn slot(&self, context_id: &str) -> Option<Arc<Mutex<ContextSlot>>> {
        self.contexts
            .get(context_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    // --- Context lifecycle ---

    /// Create and persist a context with default metadata.
    ///
    /// If the id already exists this is a logged no-op and the existing
    /// context is returned unchanged.
    pub async fn create_context(&self, context_id: &str) -> Context {
        let slot = match self.contexts.entry(context_id.to_string()) {
            Entry::Occupied(existing) => {
                let slot = Arc::clone(existing.get());
                drop(existing);
                warn!(context_id = %context_id, "context already exists, skipping creation");
                return slot.lock().await.context.clone();
            }
            Entry::Vacant(vacant) => {
                let slot = Arc::new(Mutex::new(ContextSlot::new(Context::with_defaults(
                    context_id,
                ))));
                vacant.insert(Arc::clone(&slot));
                slot
            }
        };
        info!(context_id = %context_id, "context added to memory store");

        let guard = slot.lock().await;
        if let Err(e) = self.repository.save_config(&guard.context).await {
            error!(context_id = %context_id, error = %e, "failed to save context config");
        }
        if let Err(e) = self
            .repository
            .save_memory(context_id, &guard.context.messages)
            .await
        {
            error!(context_id = %context_id, error = %e, "failed to save context memory");
        }
        guard.context.clone()
    }

    /// Snapshot of a context, messages included.
    pub async fn get_context(&self, context_id: &str) -> Option<Context> {
        let slot = self.slot(context_id)?;
        let guard = slot.lock().await;
        Some(guard.context.clone())
    }

    /// Id of the context bound to a channel. Reads only the channel index.
    pub fn context_id_for_channel(&self, channel_id: &str) -> Option<String> {
        self.channels
            .get(channel_id)
            .map(|entry| entry.value().clone())
    }

    /// Snapshot of the context bound to a channel, if any.
    pub async fn context_for_channel(&self, channel_id: &str) -> Option<Context> {
        let context_id = self.context_id_for_channel(channel_id)?;
        self.get_context(&context_id).await
    }

    /// Bind a channel to a context and persist the context's config.
    ///
    /// A channel belongs to at most one context: binding a channel that is
    /// already claimed elsewhere fails. Re-binding to the same context is a no-op.
    pub async fn associate_channel(
        &self,
        context_id: &str,
        channel_id: &str,
    ) -> Result<(), StoreError> {
        let slot = self
            .slot(context_id)
            .ok_or_else(|| StoreError::NotFound(context_id.to_string()))?;

        match self.channels.entry(channel_id.to_string()) {
            Entry::Occupied(existing) if existing.get() != context_id => {
                return Err(StoreError::ChannelClaimed {
                    channel: channel_id.to_string(),
                    context: existing.get().clone(),
                });
            }
            Entry::Occupied(_) => return Ok(()),
            Entry::Vacant(vacant) => {
                vacant.insert(context_id.to_string());
            }
        }

        let mut guard = slot.lock().await;
        if !guard.context.claims(channel_id) {
            guard.context.associated_chats.push(channel_id.to_string());
        }
        info!(context_id = %context_id, channel_id = %channel_id, "channel associated");
        self.repository.save_config(&guard.context).await
    }

    /// Sorted ids of every known context.
    pub fn context_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.contexts.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    // --- Messages ---

    /// Append a user turn and persist the context's message log.
    ///
    /// Unknown context ids are a logged no-op.
    pub async fn add_user_message(
        &self,
        context_id: &str,
        source: &str,
        username: &str,
        content: &str,
    ) -> Result<(), StoreError> {
        let message = Message::now(MessageRole::User, username, source, content);
        self.append(context_id, message).await
    }

    /// Append an assistant turn and persist the context's message log.
    ///
    /// Unknown context ids are a logged no-op.
    pub async fn add_assistant_message(
        &self,
        context_id: &str,
        source: &str,
        content: &str,
    ) -> Result<(), StoreError> {
        let message = Message::now(
            MessageRole::Assistant,
            self.assistant_name.as_str(),
            source,
            content,
        );
        self.append(context_id, message).await
    }

    async fn append(&self, context_id: &str, message: Message) -> Result<(), StoreError> {
        let Some(slot) = self.slot(context_id) else {
            warn!(context_id = %context_id, "context does not exist, message not stored");
            return Ok(());
        };
        let mut guard = slot.lock().await;
        guard.context.messages.push(message);
        self.repository
            .save_memory(context_id, &guard.context.messages)
            .await
    }

    /// Ordered snapshot of a context's history.
    pub async fn messages(&self, context_id: &str) -> Option<Vec<Message>> {
        let slot = self.slot(context_id)?;
        let guard = slot.lock().await;
        Some(guard.context.messages.clone())
    }

    // --- Filters ---

    /// Run text through the context's filter pipeline.
    ///
    /// The pipeline is built on first use. Unknown context ids return the
    /// input unchanged.
    pub async fn apply_filters(&self, context_id: &str, text: &str) -> String {
        let Some(slot) = self.slot(context_id) else {
            warn!(context_id = %context_id, "context does not exist, filters not applied");
            return text.to_string();
        };
        let mut guard = slot.lock().await;
        let slot = &mut *guard;
        let pipeline = slot
            .pipeline
            .get_or_insert_with(|| FilterPipeline::for_context(&slot.context, &self.filters));
        pipeline.apply(text)
    }

    // --- Bulk persistence ---

    /// Persist every context's config and message log.
    ///
    /// Stops at the first failure.
    pub async fn save_all(&self) -> Result<(), StoreError> {
        for context_id in self.context_ids() {
            let Some(slot) = self.slot(&context_id) else {
                continue;
            };
            let guard = slot.lock().await;
            if let Err(e) = self.repository.save_config(&guard.context).await {
                error!(context_id = %context_id, error = %e, "failed to save context config");
                return Err(e);
            }
            if let Err(e) = self
                .repository
                .save_memory(&context_id, &guard.context.messages)
                .await
            {
                error!(context_id = %context_id, error = %e, "failed to save context memory");
                return Err(e);
            }
        }
        info!(count = self.len(), "saved all contexts");
        Ok(())
    }

    /// Load every persisted context and rebuild the channel index.
    ///
    /// Only valid before adapters start delivering events. When several
    /// contexts claim the same channel, the lowest context id keeps it.
    pub async fn load_all(&self) -> Result<usize, StoreError> {
        let mut loaded = self.repository.load_all().await?;
        loaded.sort_by(|a, b| a.id.cmp(&b.id));
        let count = loaded.len();

        self.channels.clear();
        for context in loaded {
            for channel_id in &context.associated_chats {
                match self.channels.entry(channel_id.clone()) {
                    Entry::Occupied(existing) => {
                        warn!(
                            channel_id = %channel_id,
                            kept = %existing.get(),
                            ignored = %context.id,
                            "channel claimed by more than one context"
                        );
                    }
                    Entry::Vacant(vacant) => {
                        vacant.insert(context.id.clone());
                    }
                }
            }
            self.contexts.insert(
                context.id.clone(),
                Arc::new(Mutex::new(ContextSlot::new(context))),
            );
        }

        info!(count, "loaded all contexts");
        Ok(count)
    }

    /// Write default config/memory documents for partially written contexts.
    pub async fn populate_missing_files(&self) -> Result<usize, StoreError> {
        let written = self.repository.populate_missing().await?;
        info!(written, "populated missing context files");
        Ok(written)
    }
}
