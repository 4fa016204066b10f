//! # lexitok
//!
//! Rule-based natural-language tokenizer core.
//!
//! Converts a block of input text into a sequence of lexical tokens using
//! whitespace segmentation, regex-driven affix peeling, infix splitting,
//! and a special-case rule table, backed by a memoization cache keyed on
//! the fingerprint of each whitespace-separated chunk. The crate also owns
//! the **lexicon**: an append-only interned store of lexical types,
//! persisted to a flat on-disk record format.
//!
//! ## Example
//!
//! ```
//! use lexitok::Tokenizer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tokenizer = Tokenizer::from_rules(
//!     r"\w+",
//!     r"[.,]",
//!     r"-",
//!     &[("ain't", &["are", "not"])],
//!     &[],
//! )?;
//!
//! let tokens = tokenizer.tokenize("hello, world.")?;
//! let surfaces: Vec<&str> = tokens
//!     .iter()
//!     .map(|t| tokenizer.lexicon().resolve(t.lexeme))
//!     .collect();
//! assert_eq!(surfaces, vec!["hello", ",", "world", "."]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Loading from a data directory
//!
//! Real deployments load rules and seed lexemes from a conventional data
//! root (`<root>/<lang>/{tokenization,prefix,suffix,infix,lexemes}`) via
//! [`TokenizerConfig`] and [`Tokenizer::from_config`].

pub mod config;
pub mod features;
pub mod fingerprint;
pub mod lexicon;
pub mod rules;
pub mod string_store;
pub mod tokenizer;

pub use config::TokenizerConfig;
pub use fingerprint::Fingerprint;
pub use lexicon::{Lexeme, LexemeRef, Lexicon};
pub use rules::{LanguageData, RuleSet, SpecialTable};
pub use string_store::{Interner, StringId, StringStore};
pub use tokenizer::{Token, Tokenizer, Tokens};

/// Crate-wide error type.
///
/// Every public fallible operation returns `Result<T, Error>`. The crate
/// never panics on malformed external input; `unwrap`/`expect` are reserved
/// for internal invariants a correct caller cannot violate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O failure on a persistence or data-loading operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invariant violation: a short write during `dump`, a `load` record
    /// whose stored fingerprint doesn't match its recomputed one, or any
    /// other sign the on-disk data is not what this crate wrote.
    #[error("lexicon data is corrupt: {0}")]
    Corrupt(String),

    /// A regex failed to compile, or a rule/lexeme data file was malformed.
    #[error("invalid tokenization rule: {0}")]
    InvalidRule(String),

    /// `<root>/<lang>` does not exist.
    #[error("unknown language: {0}")]
    UnknownLanguage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_example_end_to_end() {
        let mut tokenizer = Tokenizer::from_rules(
            r"\w+",
            r"[.,]",
            r"-",
            &[("ain't", &["are", "not"]), ("U.S.", &["U.S."])],
            &[],
        )
        .unwrap();

        let cases: &[(&str, &[&str])] = &[
            ("", &[]),
            ("hello", &["hello"]),
            ("hello, world.", &["hello", ",", "world", "."]),
            ("ain't", &["are", "not"]),
            ("U.S.", &["U.S."]),
            (
                "state-of-the-art.",
                &["state", "-", "of-the-art", "."],
            ),
        ];

        for (input, expected) in cases {
            let tokens = tokenizer.tokenize(input).unwrap();
            let surfaces: Vec<&str> = tokens
                .iter()
                .map(|t| tokenizer.lexicon().resolve(t.lexeme))
                .collect();
            assert_eq!(&surfaces, expected, "input: {input:?}");
        }
    }
}
