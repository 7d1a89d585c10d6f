//! Application state: bootstrap and shutdown wiring.
//!
//! `AppState` pins the core's type-erased ports to the concrete infra
//! implementations (JSON files on disk, OpenAI-compatible client, webhook
//! adapter) and owns the orchestrator for the life of the process.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;

use neighbot_core::adapter::config::SharedDeps;
use neighbot_core::adapter::registry::AdapterRegistry;
use neighbot_core::conversation::gate::ReplyGate;
use neighbot_core::conversation::mentions::MentionCache;
use neighbot_core::filter::registry::FilterRegistry;
use neighbot_core::llm::box_provider::BoxLlmProvider;
use neighbot_core::llm::prompt::PromptSettings;
use neighbot_core::memory::repository::BoxContextRepository;
use neighbot_core::memory::store::MemoryStore;
use neighbot_core::orchestrator::Orchestrator;
use neighbot_infra::config::{load_main_config, save_main_config};
use neighbot_infra::filesystem::context_repo::JsonContextRepository;
use neighbot_infra::filesystem::{data_dir, ensure_layout, main_config_path};
use neighbot_infra::llm::openai_compat::OpenAiCompatibleProvider;
use neighbot_infra::webhook::config::WebhookConfig;
use neighbot_infra::webhook::{WEBHOOK_ADAPTER, WebhookAdapter};
use neighbot_types::config::MainConfig;

/// Every adapter this build knows about.
pub fn adapter_registry() -> anyhow::Result<AdapterRegistry> {
    let mut registry = AdapterRegistry::new();
    registry
        .register::<WebhookAdapter, WebhookConfig>(WEBHOOK_ADAPTER)
        .context("failed to register webhook adapter")?;
    Ok(registry)
}

pub struct AppState {
    pub config_dir: PathBuf,
    pub config: MainConfig,
    pub store: Arc<MemoryStore>,
    pub orchestrator: Orchestrator,
}

impl AppState {
    /// Load configuration and contexts and wire the shared dependencies.
    ///
    /// Adapters are not started yet.
    pub async fn init(config_dir: PathBuf) -> anyhow::Result<Self> {
        ensure_layout(&config_dir)
            .await
            .with_context(|| format!("failed to create {}", data_dir(&config_dir).display()))?;

        let config_path = main_config_path(&config_dir);
        let loaded = load_main_config(&config_path).await?;
        let mut config = loaded.config;
        tracing::info!(config_dir = %config_dir.display(), llm = ?config.llm, "configuration loaded");

        let filters = Arc::new(FilterRegistry::with_builtins());
        let repository = JsonContextRepository::new(data_dir(&config_dir));
        let store = Arc::new(MemoryStore::new(
            BoxContextRepository::new(repository),
            Arc::clone(&filters),
            config.bot.name.clone(),
        ));

        store.load_all().await.context("failed to load contexts")?;
        let written = store
            .populate_missing_files()
            .await
            .context("failed to populate context files")?;
        if written > 0 {
            store.load_all().await.context("failed to reload contexts")?;
        }

        let llm = OpenAiCompatibleProvider::new(&config.llm);
        tracing::info!(base_url = %llm.base_url(), model = %llm.model(), "LLM client ready");

        let shared = SharedDeps {
            store: Arc::clone(&store),
            llm: Arc::new(BoxLlmProvider::new(llm)),
            gate: Arc::new(ReplyGate::new(config.bot.reply_policy)),
            mentions: Arc::new(MentionCache::default()),
            prompt: Arc::new(PromptSettings::from(&config.bot)),
        };

        let orchestrator = Orchestrator::new(adapter_registry()?, shared);
        let seeded = orchestrator.seed_default_configs(&mut config.adapters.configs);
        if loaded.created || seeded > 0 {
            save_main_config(&config_path, &config).await?;
        }

        Ok(Self {
            config_dir,
            config,
            store,
            orchestrator,
        })
    }

    /// Start every enabled adapter. Returns how many are running.
    pub async fn start(&mut self) -> anyhow::Result<usize> {
        let running = self
            .orchestrator
            .start_all(&self.config.adapters.configs)
            .await?;
        Ok(running)
    }

    /// Stop adapters, then flush contexts and the main config to disk.
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.orchestrator.stop_all().await;
        self.store
            .save_all()
            .await
            .context("failed to save contexts")?;
        save_main_config(&main_config_path(&self.config_dir), &self.config).await?;
        tracing::info!("state saved, goodbye");
        Ok(())
    }
}
