//! Output text filters.
//!
//! A filter is a named, stateless `&str -> String` transform applied to
//! assistant text before it is stored and delivered. Filters are registered
//! once into a [`registry::FilterRegistry`]; each context builds its own
//! [`pipeline::FilterPipeline`] from the filters it has enabled.

pub mod builtin;
pub mod pipeline;
pub mod registry;

/// A named text transform. Must not fail.
pub trait TextFilter: Send + Sync {
    /// Registry key (e.g., "remove_links").
    fn name(&self) -> &str;

    /// Transform the input text.
    fn apply(&self, input: &str) -> String;
}
