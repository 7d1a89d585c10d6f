//! Chat adapter plugin system.
//!
//! An adapter integrates one external chat platform. Adapters are registered
//! by name together with their configuration type; the orchestrator builds
//! instances through the registry without knowing the concrete types, and
//! reaches the shared base of every configuration through [`config::AdapterConfig`].

pub mod chat_adapter;
pub mod config;
pub mod lifecycle;
pub mod registry;
