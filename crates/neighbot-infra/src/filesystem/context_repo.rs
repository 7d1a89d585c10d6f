//! JSON-file context repository.
//!
//! One directory per context under the data root, holding `config.json`
//! (metadata, filters, channels) and `memory.json` (message log). Files are
//! pretty-printed and rewritten whole on every save.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use neighbot_core::memory::repository::ContextRepository;
use neighbot_types::context::Context;
use neighbot_types::error::StoreError;
use neighbot_types::message::{MemoryFile, Message};

pub const CONFIG_FILE: &str = "config.json";
pub const MEMORY_FILE: &str = "memory.json";

/// Context persistence rooted at a data directory.
#[derive(Debug, Clone)]
pub struct JsonContextRepository {
    root: PathBuf,
}

impl JsonContextRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ids name a directory directly under the root, so they may not contain
    /// separators or dot components.
    pub fn validate_id(context_id: &str) -> Result<(), StoreError> {
        let unsafe_id = context_id.is_empty()
            || context_id == "."
            || context_id == ".."
            || context_id.contains(['/', '\\'])
            || Path::new(context_id).is_absolute();
        if unsafe_id {
            return Err(StoreError::InvalidId(context_id.to_string()));
        }
        Ok(())
    }

    pub fn context_dir(&self, context_id: &str) -> PathBuf {
        self.root.join(context_id)
    }

    pub fn config_path(&self, context_id: &str) -> PathBuf {
        self.context_dir(context_id).join(CONFIG_FILE)
    }

    pub fn memory_path(&self, context_id: &str) -> PathBuf {
        self.context_dir(context_id).join(MEMORY_FILE)
    }

    async fn write_json<T: serde::Serialize + ?Sized>(
        path: &Path,
        value: &T,
    ) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(value)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Subdirectories of the data root, sorted by name.
    async fn context_dirs(&self) -> Result<Vec<(String, PathBuf)>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut dirs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                dirs.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    async fn read_context(dir_name: &str, dir: &Path) -> Result<Option<Context>, StoreError> {
        let config = match tokio::fs::read_to_string(dir.join(CONFIG_FILE)).await {
            Ok(config) => config,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(context_dir = %dir.display(), "no config.json, skipping context");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let mut context: Context = serde_json::from_str(&config)?;
        if context.id.is_empty() {
            context.id = dir_name.to_string();
        }
        Self::validate_id(&context.id)?;

        context.messages = match tokio::fs::read_to_string(dir.join(MEMORY_FILE)).await {
            Ok(memory) => serde_json::from_str::<MemoryFile>(&memory)?.messages,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(context))
    }
}

impl ContextRepository for JsonContextRepository {
    async fn save_config(&self, context: &Context) -> Result<(), StoreError> {
        Self::validate_id(&context.id)?;
        Self::write_json(&self.config_path(&context.id), context).await
    }

    async fn save_memory(&self, context_id: &str, messages: &[Message]) -> Result<(), StoreError> {
        Self::validate_id(context_id)?;
        let file = MemoryFile {
            messages: messages.to_vec(),
        };
        Self::write_json(&self.memory_path(context_id), &file).await
    }

    async fn load_all(&self) -> Result<Vec<Context>, StoreError> {
        let mut contexts = Vec::new();
        for (name, dir) in self.context_dirs().await? {
            if let Some(context) = Self::read_context(&name, &dir).await? {
                debug!(context_id = %context.id, messages = context.messages.len(), "context loaded");
                contexts.push(context);
            }
        }
        Ok(contexts)
    }

    async fn populate_missing(&self) -> Result<usize, StoreError> {
        let mut written = 0;
        for (name, dir) in self.context_dirs().await? {
            if !tokio::fs::try_exists(dir.join(CONFIG_FILE)).await? {
                self.save_config(&Context::with_defaults(name.as_str())).await?;
                debug!(context_id = %name, "wrote default config.json");
                written += 1;
            }
            if !tokio::fs::try_exists(dir.join(MEMORY_FILE)).await? {
                self.save_memory(&name, &[]).await?;
                debug!(context_id = %name, "wrote empty memory.json");
                written += 1;
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use neighbot_core::filter::registry::FilterRegistry;
    use neighbot_core::memory::repository::BoxContextRepository;
    use neighbot_core::memory::store::MemoryStore;
    use neighbot_types::llm::MessageRole;
    use tempfile::tempdir;

    use super::*;

    fn store_at(root: &Path) -> MemoryStore {
        MemoryStore::new(
            BoxContextRepository::new(JsonContextRepository::new(root)),
            Arc::new(FilterRegistry::with_builtins()),
            "NeighBot",
        )
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let tmp = tempdir().unwrap();
        let repo = JsonContextRepository::new(tmp.path());

        let mut ctx = Context::with_defaults("general");
        ctx.associated_chats = vec!["123".to_string()];
        repo.save_config(&ctx).await.unwrap();
        let msg = Message::now(MessageRole::User, "alice", "webhook:s:c", "hi");
        repo.save_memory("general", std::slice::from_ref(&msg))
            .await
            .unwrap();

        let loaded = repo.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "general");
        assert_eq!(loaded[0].associated_chats, vec!["123"]);
        assert_eq!(loaded[0].messages, vec![msg]);
    }

    #[tokio::test]
    async fn test_config_file_layout() {
        let tmp = tempdir().unwrap();
        let repo = JsonContextRepository::new(tmp.path());
        repo.save_config(&Context::with_defaults("abc")).await.unwrap();

        let raw = std::fs::read_to_string(tmp.path().join("abc").join(CONFIG_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["name"], "New Chat");
        assert_eq!(json["filters"]["remove_links"], true);
        assert!(json["associated_chats"].as_array().unwrap().is_empty());
        assert!(json.get("messages").is_none());
    }

    #[tokio::test]
    async fn test_legacy_context_id_key_and_dir_fallback() {
        let tmp = tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("legacy")).unwrap();
        std::fs::write(
            tmp.path().join("legacy").join(CONFIG_FILE),
            r#"{"context_id": "legacy", "name": "Old", "filters": {}}"#,
        )
        .unwrap();
        std::fs::create_dir_all(tmp.path().join("anon")).unwrap();
        std::fs::write(tmp.path().join("anon").join(CONFIG_FILE), r#"{"name": "No id"}"#).unwrap();

        let repo = JsonContextRepository::new(tmp.path());
        let loaded = repo.load_all().await.unwrap();
        let ids: Vec<&str> = loaded.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["anon", "legacy"]);
        assert!(loaded.iter().all(|c| c.messages.is_empty()));
    }

    #[tokio::test]
    async fn test_load_skips_dirs_without_config() {
        let tmp = tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("empty")).unwrap();
        std::fs::write(tmp.path().join("stray.txt"), "not a context").unwrap();

        let repo = JsonContextRepository::new(tmp.path());
        assert!(repo.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_root_is_empty() {
        let tmp = tempdir().unwrap();
        let repo = JsonContextRepository::new(tmp.path().join("nope"));
        assert!(repo.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_config_is_an_error() {
        let tmp = tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("bad")).unwrap();
        std::fs::write(tmp.path().join("bad").join(CONFIG_FILE), "{ nope").unwrap();

        let repo = JsonContextRepository::new(tmp.path());
        let err = repo.load_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_path_like_id_in_config_is_rejected() {
        let tmp = tempdir().unwrap();
        let data = tmp.path().join("data");
        std::fs::create_dir_all(data.join("sneaky")).unwrap();
        std::fs::write(
            data.join("sneaky").join(CONFIG_FILE),
            r#"{"id": "../escaped", "name": "x", "filters": {}}"#,
        )
        .unwrap();

        let repo = JsonContextRepository::new(&data);
        let err = repo.load_all().await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(ref id) if id == "../escaped"));
    }

    #[tokio::test]
    async fn test_save_refuses_ids_outside_root() {
        let tmp = tempdir().unwrap();
        let data = tmp.path().join("data");
        let repo = JsonContextRepository::new(&data);

        for id in ["../escaped", "a/b", "..", "/abs"] {
            let err = repo
                .save_config(&Context::with_defaults(id))
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::InvalidId(_)), "id {id}");
            assert!(repo.save_memory(id, &[]).await.is_err(), "id {id}");
        }
        assert!(!tmp.path().join("escaped").exists());
        assert!(repo.save_config(&Context::with_defaults("fine")).await.is_ok());
    }

    #[tokio::test]
    async fn test_populate_missing_writes_defaults() {
        let tmp = tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("bare")).unwrap();
        let repo = JsonContextRepository::new(tmp.path());
        repo.save_config(&Context::with_defaults("half")).await.unwrap();

        assert_eq!(repo.populate_missing().await.unwrap(), 3);
        assert!(repo.memory_path("half").exists());

        let raw = std::fs::read_to_string(repo.config_path("bare")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["id"], "bare");

        assert_eq!(repo.populate_missing().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_memory_file_reflects_new_message() {
        let tmp = tempdir().unwrap();
        let store = store_at(tmp.path());
        store.create_context("abc").await;

        store
            .add_user_message("abc", "webhook:srv:chan", "alice", "hello there")
            .await
            .unwrap();

        let raw = std::fs::read_to_string(tmp.path().join("abc").join(MEMORY_FILE)).unwrap();
        let file: MemoryFile = serde_json::from_str(&raw).unwrap();
        assert_eq!(file.messages.len(), 1);
        assert_eq!(file.messages[0].role, MessageRole::User);
        assert_eq!(file.messages[0].content, "hello there");
    }

    #[tokio::test]
    async fn test_store_survives_restart() {
        let tmp = tempdir().unwrap();
        {
            let store = store_at(tmp.path());
            store.create_context("abc").await;
            store.associate_channel("abc", "42").await.unwrap();
            store.add_assistant_message("abc", "s", "neigh").await.unwrap();
            store.save_all().await.unwrap();
        }

        let store = store_at(tmp.path());
        assert_eq!(store.load_all().await.unwrap(), 1);
        let ctx = store.context_for_channel("42").await.unwrap();
        assert_eq!(ctx.messages.len(), 1);
        assert_eq!(ctx.messages[0].username, "NeighBot");
    }
}
