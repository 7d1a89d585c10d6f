//! Name-keyed filter registry.
//!
//! Shared (behind an `Arc`) by the memory store so every context resolves
//! filter names against the same set.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use super::builtin::{EmojiFilter, EmphasisFilter, LinkFilter};
use super::TextFilter;

/// Registry of available filters, indexed by name.
pub struct FilterRegistry {
    filters: RwLock<BTreeMap<String, Arc<dyn TextFilter>>>,
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            filters: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registry pre-loaded with the three built-in filters.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(EmojiFilter);
        registry.register(EmphasisFilter);
        registry.register(LinkFilter);
        info!("filters initialized");
        registry
    }

    /// Register a filter under its own name. The last registration wins.
    pub fn register<F: TextFilter + 'static>(&self, filter: F) {
        let name = filter.name().to_string();
        let mut filters = self.filters.write().unwrap_or_else(|e| e.into_inner());
        filters.insert(name.clone(), Arc::new(filter));
        info!(filter_name = %name, "filter registered");
    }

    /// Look up a filter by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn TextFilter>> {
        let filters = self.filters.read().unwrap_or_else(|e| e.into_inner());
        let found = filters.get(name).cloned();
        if found.is_none() {
            warn!(filter_name = %name, "filter not found");
        }
        found
    }

    /// List registered filter names, sorted.
    pub fn names(&self) -> Vec<String> {
        let filters = self.filters.read().unwrap_or_else(|e| e.into_inner());
        filters.keys().cloned().collect()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
