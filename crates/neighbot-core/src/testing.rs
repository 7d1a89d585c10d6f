//! In-memory doubles shared by the unit tests of this crate.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use neighbot_types::adapter::AdapterState;
use neighbot_types::config::ReplyPolicy;
use neighbot_types::context::Context;
use neighbot_types::error::{AdapterError, StoreError};
use neighbot_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};
use neighbot_types::message::Message;

use crate::adapter::chat_adapter::ChatAdapter;
use crate::adapter::config::{AdapterConfig, BaseAdapterConfig, SharedDeps, downcast_config};
use crate::adapter::lifecycle::Lifecycle;
use crate::conversation::gate::ReplyGate;
use crate::conversation::mentions::MentionCache;
use crate::conversation::transport::ChatTransport;
use crate::filter::registry::FilterRegistry;
use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::prompt::PromptSettings;
use crate::llm::provider::LlmProvider;
use crate::memory::repository::{BoxContextRepository, ContextRepository};
use crate::memory::store::MemoryStore;

// ---------------------------------------------------------------------------
// Context repository
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RepoState {
    configs: BTreeMap<String, Context>,
    memories: BTreeMap<String, Vec<Message>>,
    bare: BTreeSet<String>,
    writes: usize,
    fail_writes: bool,
}

/// Repository that keeps documents in memory. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryContextRepository {
    state: Arc<Mutex<RepoState>>,
}

impl InMemoryContextRepository {
    /// Store a context (config and messages) without counting a write.
    pub fn seed(&self, context: Context) {
        let mut state = self.state.lock().unwrap();
        state
            .memories
            .insert(context.id.clone(), context.messages.clone());
        let mut config = context;
        config.messages.clear();
        state.configs.insert(config.id.clone(), config);
    }

    /// A context location with neither document.
    pub fn add_bare_location(&self, id: &str) {
        self.state.lock().unwrap().bare.insert(id.to_string());
    }

    pub fn config(&self, id: &str) -> Option<Context> {
        self.state.lock().unwrap().configs.get(id).cloned()
    }

    pub fn memory(&self, id: &str) -> Option<Vec<Message>> {
        self.state.lock().unwrap().memories.get(id).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    fn write(&self, apply: impl FnOnce(&mut RepoState)) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(StoreError::Io("injected write failure".to_string()));
        }
        apply(&mut state);
        state.writes += 1;
        Ok(())
    }
}

impl ContextRepository for InMemoryContextRepository {
    async fn save_config(&self, context: &Context) -> Result<(), StoreError> {
        let mut config = context.clone();
        config.messages.clear();
        self.write(|state| {
            state.configs.insert(config.id.clone(), config);
        })
    }

    async fn save_memory(&self, context_id: &str, messages: &[Message]) -> Result<(), StoreError> {
        let messages = messages.to_vec();
        self.write(|state| {
            state.memories.insert(context_id.to_string(), messages);
        })
    }

    async fn load_all(&self) -> Result<Vec<Context>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .configs
            .values()
            .map(|config| {
                let mut context = config.clone();
                context.messages = state.memories.get(&config.id).cloned().unwrap_or_default();
                context
            })
            .collect())
    }

    async fn populate_missing(&self) -> Result<usize, StoreError> {
        let ids: BTreeSet<String> = {
            let state = self.state.lock().unwrap();
            state
                .bare
                .iter()
                .chain(state.configs.keys())
                .chain(state.memories.keys())
                .cloned()
                .collect()
        };
        let mut written = 0;
        for id in ids {
            if self.config(&id).is_none() {
                let context = Context::with_defaults(id.as_str());
                self.write(|state| {
                    state.configs.insert(id.clone(), context);
                })?;
                written += 1;
            }
            if self.memory(&id).is_none() {
                self.write(|state| {
                    state.memories.insert(id.clone(), Vec::new());
                })?;
                written += 1;
            }
        }
        Ok(written)
    }
}

// ---------------------------------------------------------------------------
// LLM provider
// ---------------------------------------------------------------------------

/// Blocks the first completion until released.
pub struct LlmHold {
    /// Notified once the held completion has started.
    pub entered: Arc<Notify>,
    /// Notify to let the held completion finish.
    pub release: Arc<Notify>,
}

#[derive(Clone)]
pub struct ScriptedLlm {
    reply: Option<String>,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<CompletionRequest>>>,
    hold: Arc<Mutex<Option<LlmHold>>>,
}

impl ScriptedLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            calls: Arc::default(),
            last_request: Arc::default(),
            hold: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            ..Self::replying("")
        }
    }

    /// A provider whose first completion waits for `LlmHold::release`.
    pub fn held(text: &str) -> (Self, LlmHold) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let llm = Self::replying(text);
        *llm.hold.lock().unwrap() = Some(LlmHold {
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
        });
        (llm, LlmHold { entered, release })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let hold = self.hold.lock().unwrap().take();
        if let Some(hold) = hold {
            hold.entered.notify_one();
            hold.release.notified().await;
        }

        match &self.reply {
            Some(text) => Ok(CompletionResponse {
                content: text.clone(),
                model: "scripted-model".to_string(),
                usage: Usage::default(),
            }),
            None => Err(LlmError::Provider {
                message: "scripted failure".to_string(),
            }),
        }
    }
}

/// Shared dependencies over an in-memory repository.
pub fn shared_deps(
    repo: &InMemoryContextRepository,
    llm: ScriptedLlm,
    policy: ReplyPolicy,
) -> SharedDeps {
    SharedDeps {
        store: Arc::new(MemoryStore::new(
            BoxContextRepository::new(repo.clone()),
            Arc::new(FilterRegistry::with_builtins()),
            "NeighBot",
        )),
        llm: Arc::new(BoxLlmProvider::new(llm)),
        gate: Arc::new(ReplyGate::new(policy)),
        mentions: Arc::new(MentionCache::default()),
        prompt: Arc::new(PromptSettings::new("NeighBot", "a friendly virtual horse")),
    }
}

// ---------------------------------------------------------------------------
// Chat transport
// ---------------------------------------------------------------------------

/// Transport that records deliveries. The bot's id is `bot`.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, String)>>,
    attempts: AtomicUsize,
    typing: AtomicUsize,
    fail_attempt: Option<usize>,
}

impl RecordingTransport {
    /// Fails the `index`-th (zero-based) `send_text` call.
    pub fn failing_chunk(index: usize) -> Self {
        Self {
            fail_attempt: Some(index),
            ..Self::default()
        }
    }

    /// Successful deliveries, in order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn typing_count(&self) -> usize {
        self.typing.load(Ordering::SeqCst)
    }
}

impl ChatTransport for RecordingTransport {
    fn self_id(&self) -> &str {
        "bot"
    }

    fn self_mention(&self) -> String {
        "<@bot>".to_string()
    }

    fn mention(&self, user_id: &str) -> String {
        format!("<@{user_id}>")
    }

    async fn typing(&self, _channel_id: &str) -> Result<(), AdapterError> {
        self.typing.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_text(&self, channel_id: &str, text: &str) -> Result<(), AdapterError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_attempt == Some(attempt) {
            return Err(AdapterError::Delivery("scripted delivery failure".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel_id.to_string(), text.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NullConfig {
    #[serde(flatten)]
    pub base: BaseAdapterConfig,
    #[serde(default)]
    pub fail_initialize: bool,
    #[serde(default)]
    pub fail_start: bool,
}

impl AdapterConfig for NullConfig {
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

/// A config type no adapter accepts.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ForeignConfig {
    #[serde(flatten)]
    pub base: BaseAdapterConfig,
}

impl AdapterConfig for ForeignConfig {
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

/// Adapter with no platform behind it, registered as `null`.
#[derive(Default)]
pub struct NullAdapter {
    lifecycle: Lifecycle,
    config: Option<NullConfig>,
}

impl ChatAdapter for NullAdapter {
    fn name(&self) -> &str {
        "null"
    }

    fn state(&self) -> AdapterState {
        self.lifecycle.state()
    }

    fn set_config(&mut self, config: Box<dyn AdapterConfig>) -> Result<(), AdapterError> {
        self.lifecycle.check(AdapterState::Configured)?;
        self.config = Some(downcast_config(config, "null")?);
        self.lifecycle.advance(AdapterState::Configured)
    }

    fn initialize(&mut self) -> Result<(), AdapterError> {
        self.lifecycle.check(AdapterState::Initialized)?;
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| AdapterError::MissingConfig("null".to_string()))?;
        if config.fail_initialize {
            return Err(AdapterError::MissingConfig("token".to_string()));
        }
        if config.base.shared.is_none() {
            return Err(AdapterError::MissingConfig("shared dependencies".to_string()));
        }
        self.lifecycle.advance(AdapterState::Initialized)
    }

    async fn start(&mut self) -> Result<(), AdapterError> {
        self.lifecycle.check(AdapterState::Running)?;
        if self.config.as_ref().is_some_and(|c| c.fail_start) {
            return Err(AdapterError::Connection("scripted start failure".to_string()));
        }
        self.lifecycle.advance(AdapterState::Running)
    }

    async fn stop(&mut self) -> Result<(), AdapterError> {
        self.lifecycle.advance(AdapterState::Stopped)
    }
}

/// A second null adapter, registered as `spare`, for multi-adapter startup.
#[derive(Default)]
pub struct SpareAdapter(NullAdapter);

impl ChatAdapter for SpareAdapter {
    fn name(&self) -> &str {
        "spare"
    }

    fn state(&self) -> AdapterState {
        self.0.state()
    }

    fn set_config(&mut self, config: Box<dyn AdapterConfig>) -> Result<(), AdapterError> {
        self.0.set_config(config)
    }

    fn initialize(&mut self) -> Result<(), AdapterError> {
        self.0.initialize()
    }

    async fn start(&mut self) -> Result<(), AdapterError> {
        self.0.start().await
    }

    async fn stop(&mut self) -> Result<(), AdapterError> {
        self.0.stop().await
    }
}
