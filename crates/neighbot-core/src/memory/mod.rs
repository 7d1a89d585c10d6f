//! Conversation context storage.
//!
//! - `ContextRepository`: persistence port (implemented in neighbot-infra)
//! - `BoxContextRepository`: object-safe wrapper for dynamic dispatch
//! - `MemoryStore`: in-memory set of contexts with per-context locking,
//!   channel index, and write-through persistence

pub mod repository;
pub mod store;
