//! Tokenizer configuration.
//!
//! Deliberately thin: the data root and language tag are the only inputs a
//! caller must supply, and both are passed explicitly rather than read from
//! ambient environment state.

use std::path::PathBuf;

/// Configuration for constructing a [`crate::Tokenizer`] from a data
/// directory.
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    /// `<root>` in `<root>/<lang>/{tokenization,prefix,suffix,infix,lexemes}`.
    pub data_root: PathBuf,
    /// `<lang>` directory name under `data_root`.
    pub language: String,
    /// Initial capacity hint for the tokenization cache, if known.
    pub cache_capacity_hint: Option<usize>,
}

impl TokenizerConfig {
    #[must_use]
    pub fn new(data_root: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            data_root: data_root.into(),
            language: language.into(),
            cache_capacity_hint: None,
        }
    }

    #[must_use]
    pub fn with_cache_capacity_hint(mut self, hint: usize) -> Self {
        self.cache_capacity_hint = Some(hint);
        self
    }
}
