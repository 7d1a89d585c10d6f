//! Per-context ordered filter pipeline.

use std::sync::Arc;

use tracing::warn;

use neighbot_types::context::Context;

use super::registry::FilterRegistry;
use super::TextFilter;

/// Ordered list of filters folded left-to-right over outbound text.
#[derive(Clone, Default)]
pub struct FilterPipeline {
    filters: Vec<Arc<dyn TextFilter>>,
}

impl FilterPipeline {
    /// Build the pipeline for a context from its enabled filters.
    ///
    /// Order follows the context's filter map, which is sorted by name.
    /// Unknown names are skipped with a warning.
    pub fn for_context(context: &Context, registry: &FilterRegistry) -> Self {
        let mut filters = Vec::new();
        for name in context.enabled_filters() {
            match registry.get(name) {
                Some(filter) => filters.push(filter),
                None => {
                    warn!(filter_name = %name, context_id = %context.id, "unknown filter, skipping");
                }
            }
        }
        Self { filters }
    }

    /// Append a filter to the end of the pipeline.
    pub fn push(&mut self, filter: Arc<dyn TextFilter>) {
        self.filters.push(filter);
    }

    /// Names of the filters in application order.
    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply every filter in order.
    pub fn apply(&self, input: &str) -> String {
        self.filters
            .iter()
            .fold(input.to_string(), |text, filter| filter.apply(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Suffix(&'static str);

    impl TextFilter for Suffix {
        fn name(&self) -> &str {
            self.0
        }

        fn apply(&self, input: &str) -> String {
            format!("{input}{}", self.0)
        }
    }

    #[test]
    fn test_pipeline_from_default_context() {
        let registry = FilterRegistry::with_builtins();
        let ctx = Context::with_defaults("c");
        let pipeline = FilterPipeline::for_context(&ctx, &registry);
        assert_eq!(
            pipeline.names(),
            vec!["remove_emojis", "remove_emphasis", "remove_links"]
        );
        assert_eq!(
            pipeline.apply("I'm *great* 🥕, check http://x.com"),
            "I'm  , check "
        );
    }

    #[test]
    fn test_pipeline_skips_unknown_and_disabled() {
        let registry = FilterRegistry::with_builtins();
        let mut ctx = Context::with_defaults("c");
        ctx.filters.clear();
        ctx.filters.insert("remove_links".to_string(), true);
        ctx.filters.insert("remove_emojis".to_string(), false);
        ctx.filters.insert("no_such_filter".to_string(), true);
        let pipeline = FilterPipeline::for_context(&ctx, &registry);
        assert_eq!(pipeline.names(), vec!["remove_links"]);
    }

    #[test]
    fn test_pipeline_applies_left_to_right() {
        let mut pipeline = FilterPipeline::default();
        pipeline.push(Arc::new(Suffix("a")));
        pipeline.push(Arc::new(Suffix("b")));
        assert_eq!(pipeline.apply("x"), "xab");
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let pipeline = FilterPipeline::default();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.apply("unchanged *text*"), "unchanged *text*");
    }
}
