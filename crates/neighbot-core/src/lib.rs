//! Core logic and capability traits for NeighBot.
//!
//! This crate defines the "ports" the infrastructure layer implements
//! (context persistence, LLM completion, chat transports) together with the
//! pieces that give the system its contracts: the output filter pipeline,
//! the memory store, the adapter registry, the reply handler and the
//! orchestrator. It depends only on `neighbot-types` -- never on
//! `neighbot-infra` or any network/filesystem crate.

pub mod adapter;
pub mod conversation;
pub mod filter;
pub mod llm;
pub mod memory;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod testing;
