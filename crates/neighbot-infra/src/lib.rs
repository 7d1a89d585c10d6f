//! Infrastructure layer for NeighBot.
//!
//! Contains implementations of the ports defined in `neighbot-core`:
//! JSON-file context persistence, the main configuration file, the
//! OpenAI-compatible completion client, and the webhook chat adapter.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod webhook;
