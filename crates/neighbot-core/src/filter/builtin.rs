//! Built-in filters: symbols/emoji, `*emphasis*` spans, and bare URLs.
//!
//! The three character classes do not overlap, so their relative order does
//! not change the result.

use std::sync::LazyLock;

use regex::Regex;

use super::TextFilter;

static SYMBOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{S}").expect("symbol pattern is valid"));

static EMPHASIS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*.*?\*").expect("emphasis pattern is valid"));

static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("link pattern is valid"));

/// Strips every Unicode symbol character (So, Sk, Sc, Sm), which covers emoji.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmojiFilter;

impl TextFilter for EmojiFilter {
    fn name(&self) -> &str {
        "remove_emojis"
    }

    fn apply(&self, input: &str) -> String {
        SYMBOL_PATTERN.replace_all(input, "").into_owned()
    }
}

/// Strips text enclosed in a pair of asterisks, markers included.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmphasisFilter;

impl TextFilter for EmphasisFilter {
    fn name(&self) -> &str {
        "remove_emphasis"
    }

    fn apply(&self, input: &str) -> String {
        EMPHASIS_PATTERN.replace_all(input, "").into_owned()
    }
}

/// Strips bare http(s) URLs up to the next whitespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkFilter;

impl TextFilter for LinkFilter {
    fn name(&self) -> &str {
        "remove_links"
    }

    fn apply(&self, input: &str) -> String {
        LINK_PATTERN.replace_all(input, "").into_owned()
    }
}
