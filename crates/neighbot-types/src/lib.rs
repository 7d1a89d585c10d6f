//! Shared domain types for NeighBot.
//!
//! This crate contains the data shapes used across the workspace: the
//! conversation [`context::Context`] and its [`message::Message`]s, the main
//! configuration file layout, LLM request/response types, adapter lifecycle
//! states, and the error enums returned by the store, adapters and providers.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod adapter;
pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod message;
