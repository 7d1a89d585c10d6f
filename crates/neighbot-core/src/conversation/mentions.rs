//! Bounded cache of recently seen display names, used to turn `@name`
//! tokens in generated replies into platform-native mentions.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Default number of (platform, display name) pairs kept.
pub const DEFAULT_MENTION_CAPACITY: usize = 1024;

type Key = (String, String);

#[derive(Debug, Default)]
struct Entries {
    ids: HashMap<Key, String>,
    order: VecDeque<Key>,
}

/// Display name -> user id, per platform. Oldest entries are evicted first.
#[derive(Debug)]
pub struct MentionCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl MentionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Record that `name` on `platform` belongs to `user_id`.
    pub fn remember(&self, platform: &str, name: &str, user_id: &str) {
        if name.is_empty() || user_id.is_empty() {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let key = (platform.to_string(), name.to_string());
        if let Some(existing) = entries.ids.get_mut(&key) {
            *existing = user_id.to_string();
            return;
        }
        entries.ids.insert(key.clone(), user_id.to_string());
        entries.order.push_back(key);
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.ids.remove(&oldest);
            }
        }
    }

    /// Look up the user id for a display name.
    pub fn lookup(&self, platform: &str, name: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .ids
            .get(&(platform.to_string(), name.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .ids
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace every `@name` known for `platform` with `mention(user_id)`.
    ///
    /// Longer names are rewritten first so a short name never clobbers the
    /// prefix of a longer one.
    pub fn rewrite(&self, platform: &str, text: &str, mention: impl Fn(&str) -> String) -> String {
        let mut known: Vec<(String, String)> = {
            let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries
                .ids
                .iter()
                .filter(|((p, _), _)| p == platform)
                .map(|((_, name), id)| (name.clone(), id.clone()))
                .collect()
        };
        known.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let mut out = text.to_string();
        for (name, id) in known {
            let token = format!("@{name}");
            if out.contains(&token) {
                out = out.replace(&token, &mention(&id));
            }
        }
        out
    }
}

impl Default for MentionCache {
    fn default() -> Self {
        Self::new(DEFAULT_MENTION_CAPACITY)
    }
}
