//! LLM provider abstractions for NeighBot.
//!
//! - `LlmProvider`: RPITIT trait for concrete completion backends
//! - `BoxLlmProvider`: object-safe wrapper for dynamic dispatch
//! - `prompt`: system prompt and history rendering

pub mod box_provider;
pub mod prompt;
pub mod provider;
