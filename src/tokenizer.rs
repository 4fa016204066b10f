//! Whitespace segmentation, affix peeling, infix split, and cache
//! population — the core tokenization algorithm.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::config::TokenizerConfig;
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::lexicon::{LexemeRef, Lexicon};
use crate::rules::{LanguageData, RuleSet, SpecialTable};
use crate::string_store::{Interner, StringStore};
use crate::Error;

/// A single emitted token: a lexeme occurrence at a specific input offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start_offset: usize,
    pub lexeme: LexemeRef,
}

/// Output sink for a `tokenize` call.
#[derive(Debug, Default, Clone)]
pub struct Tokens {
    tokens: Vec<Token>,
}

impl Tokens {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single lexeme at `start_offset`, returning the offset the
    /// next token should use (`start_offset + surface_len_chars`).
    pub fn push_back(&mut self, start_offset: usize, lexeme: LexemeRef, surface_len_chars: usize) -> usize {
        self.tokens.push(Token {
            start_offset,
            lexeme,
        });
        start_offset + surface_len_chars
    }

    /// Append a contiguous run of lexemes starting at `start_offset`, with
    /// each subsequent token's offset advancing by the paired surface
    /// length in `lens`.
    pub fn extend(&mut self, start_offset: usize, lexemes: &[LexemeRef], lens: &[usize]) {
        let mut offset = start_offset;
        for (&lexeme, &len) in lexemes.iter().zip(lens) {
            offset = self.push_back(offset, lexeme, len);
        }
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }
}

/// Rule-based tokenizer: whitespace scan, affix peeling, infix split, and
/// memoization cache over an interned lexicon.
///
/// Single-threaded cooperative by design: one instance processes one
/// input at a time, with no internal synchronization.
#[derive(Clone)]
pub struct Tokenizer<I: Interner + Clone = StringStore> {
    lexicon: Lexicon<I>,
    rules: RuleSet,
    specials: SpecialTable,
    cache: HashMap<Fingerprint, Vec<LexemeRef>>,
}

impl Tokenizer<StringStore> {
    /// Load a language bundle from `config.data_root`/`config.language`.
    pub fn from_config(config: &TokenizerConfig) -> Result<Self, Error> {
        let mut lexicon = Lexicon::new();
        let (language, cache_seed) =
            LanguageData::load(&config.data_root, &config.language, &mut lexicon)?;
        tracing::info!(language = %config.language, lexemes = lexicon.len(), "loaded language data");
        Ok(Self::assemble(lexicon, language, cache_seed, config.cache_capacity_hint))
    }

    /// Build directly from already-compiled rules, without touching disk —
    /// useful for illustrative rules that are not loaded from a data root.
    pub fn from_rules(
        prefix_src: &str,
        suffix_src: &str,
        infix_src: &str,
        specials: &[(&str, &[&str])],
        lexemes: &[&str],
    ) -> Result<Self, Error> {
        let mut lexicon = Lexicon::new();
        for &surface in lexemes {
            lexicon.get(surface);
        }

        let rules = RuleSet::compile(prefix_src, suffix_src, infix_src)?;
        let mut special_table = SpecialTable::default();
        let mut cache_seed = Vec::new();
        for &(chunk, expansion_surfaces) in specials {
            let expansion: Vec<LexemeRef> = expansion_surfaces.iter().map(|s| lexicon.get(s)).collect();
            let fp = fingerprint(chunk);
            special_table.insert(fp, expansion.clone());
            cache_seed.push((fp, expansion));
        }

        Ok(Self::assemble(
            lexicon,
            crate::rules::LanguageData {
                rules,
                specials: special_table,
            },
            cache_seed,
            None,
        ))
    }

    fn assemble(
        lexicon: Lexicon<StringStore>,
        language: LanguageData,
        cache_seed: crate::rules::CacheSeed,
        cache_capacity_hint: Option<usize>,
    ) -> Self {
        let mut cache = HashMap::with_capacity(cache_capacity_hint.unwrap_or(cache_seed.len()));
        // Specials take priority over any later-computed tokenization:
        // preseeding the cache here means the per-chunk dispatch in
        // `tokenize` never falls through to affix peeling for these chunks.
        for (fp, expansion) in cache_seed {
            cache.insert(fp, expansion);
        }
        Self {
            lexicon,
            rules: language.rules,
            specials: language.specials,
            cache,
        }
    }
}

impl<I: Interner + Clone> Tokenizer<I> {
    /// Tokenize `text` into a [`Tokens`] sequence.
    ///
    /// Empty input returns an empty sequence. Tokens are emitted in strict
    /// left-to-right order of their starting offset.
    pub fn tokenize(&mut self, text: &str) -> Result<Tokens, Error> {
        let mut tokens = Tokens::new();
        let mut cache_misses = 0usize;
        let mut cache_hits = 0usize;

        for (start, chunk) in whitespace_chunks(text) {
            if self.dispatch_chunk(start, chunk, &mut tokens) {
                cache_hits += 1;
            } else {
                cache_misses += 1;
            }
        }

        tracing::debug!(
            chunk_count = cache_hits + cache_misses,
            cache_hits,
            cache_misses,
            tokens = tokens.length(),
            "tokenize call complete"
        );
        Ok(tokens)
    }

    /// Tokenize many independent texts. This never shares a single
    /// tokenizer across threads; instead each worker owns a private
    /// tokenizer seeded from the same language data.
    pub fn tokenize_batch(&self, texts: &[&str]) -> Result<Vec<Tokens>, Error>
    where
        I: Sync,
    {
        texts
            .par_iter()
            .map(|text| self.clone().tokenize(text))
            .collect()
    }

    #[must_use]
    pub fn lexicon(&self) -> &Lexicon<I> {
        &self.lexicon
    }

    /// Returns `true` on a cache hit, `false` on a miss (used only for
    /// diagnostics).
    fn dispatch_chunk(&mut self, start_offset: usize, chunk: &str, tokens: &mut Tokens) -> bool {
        let original_fp = fingerprint(chunk);
        if let Some(cached) = self.cache.get(&original_fp) {
            let cached = cached.clone();
            self.emit(start_offset, &cached, tokens);
            return true;
        }

        let (prefixes, suffixes, residual) = self.peel_affixes(chunk);
        let assembled = self.assemble_tokens(prefixes, suffixes, residual);
        // Cache population happens under the chunk's ORIGINAL fingerprint,
        // captured before peeling — not under any intermediate residual
        // fingerprint.
        self.cache.insert(original_fp, assembled.clone());
        self.emit(start_offset, &assembled, tokens);
        false
    }

    fn emit(&self, start_offset: usize, lexemes: &[LexemeRef], tokens: &mut Tokens) {
        let lens: Vec<usize> = lexemes
            .iter()
            .map(|&lex| self.lexicon.resolve(lex).chars().count())
            .collect();
        tokens.extend(start_offset, lexemes, &lens);
    }

    /// Affix peeling fixed point. Returns the prefixes in emission order,
    /// the suffixes in push order (reverse of emission order), and the
    /// residual string left after peeling.
    fn peel_affixes(&mut self, chunk: &str) -> (Vec<LexemeRef>, Vec<LexemeRef>, String) {
        let mut s = chunk.to_string();
        let mut prefixes = Vec::new();
        let mut suffixes = Vec::new();

        loop {
            if s.is_empty() {
                break;
            }
            let start_len = s.len();

            let pre_len = self.rules.prefix_match(&s);
            if pre_len > 0 {
                let minus_pre = s[pre_len..].to_string();
                if !minus_pre.is_empty() && self.specials.contains(fingerprint(&minus_pre)) {
                    let prefix_surface = s[..pre_len].to_string();
                    prefixes.push(self.lexicon.get(&prefix_surface));
                    s = minus_pre;
                    break;
                }
            }

            let suf_len = self.rules.suffix_match(&s);
            if suf_len > 0 {
                let minus_suf = s[..s.len() - suf_len].to_string();
                if !minus_suf.is_empty() && self.specials.contains(fingerprint(&minus_suf)) {
                    let suffix_surface = s[s.len() - suf_len..].to_string();
                    suffixes.push(self.lexicon.get(&suffix_surface));
                    s = minus_suf;
                    break;
                }
            }

            if pre_len > 0 && suf_len > 0 && pre_len + suf_len <= s.len() {
                let prefix_surface = s[..pre_len].to_string();
                let suffix_surface = s[s.len() - suf_len..].to_string();
                let residual = s[pre_len..s.len() - suf_len].to_string();
                prefixes.push(self.lexicon.get(&prefix_surface));
                suffixes.push(self.lexicon.get(&suffix_surface));
                s = residual;
            } else if pre_len > 0 {
                let prefix_surface = s[..pre_len].to_string();
                prefixes.push(self.lexicon.get(&prefix_surface));
                s = s[pre_len..].to_string();
            } else if suf_len > 0 {
                let suffix_surface = s[s.len() - suf_len..].to_string();
                suffixes.push(self.lexicon.get(&suffix_surface));
                s = s[..s.len() - suf_len].to_string();
            } else {
                // No progress: fixed-point guard terminates the loop before
                // assembly.
                break;
            }

            if self.specials.contains(fingerprint(&s)) {
                break;
            }
            if s.len() == start_len {
                break;
            }
        }

        (prefixes, suffixes, s)
    }

    /// Token assembly: prefixes (FIFO), then the residual (cache hit,
    /// single lexeme, or one infix split), then suffixes emitted LIFO.
    fn assemble_tokens(&mut self, prefixes: Vec<LexemeRef>, suffixes: Vec<LexemeRef>, residual: String) -> Vec<LexemeRef> {
        let mut out = prefixes;

        if !residual.is_empty() {
            let fp = fingerprint(&residual);
            if let Some(cached) = self.cache.get(&fp) {
                out.extend(cached.iter().copied());
            } else {
                match self.rules.infix_match(&residual) {
                    None => out.push(self.lexicon.get(&residual)),
                    Some(offset) => {
                        let (left, rest) = residual.split_at(offset);
                        let infix_len = rest.chars().next().map_or(0, char::len_utf8);
                        let mid = &rest[..infix_len];
                        let right = &rest[infix_len..];
                        if !left.is_empty() {
                            out.push(self.lexicon.get(left));
                        }
                        out.push(self.lexicon.get(mid));
                        if !right.is_empty() {
                            out.push(self.lexicon.get(right));
                        }
                    }
                }
            }
        }

        out.extend(suffixes.into_iter().rev());
        out
    }
}

/// Whitespace segmentation.
fn whitespace_chunks(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    if text.is_empty() {
        return out;
    }

    let mut start = 0usize;
    let mut in_whitespace = text.chars().next().is_some_and(char::is_whitespace);

    for (i, c) in text.char_indices() {
        let is_ws = c.is_whitespace();
        if is_ws != in_whitespace {
            if i > start {
                out.push((start, &text[start..i]));
            }
            start = i;
            if c == ' ' {
                start += 1;
            }
            in_whitespace = is_ws;
        }
    }

    if start < text.len() {
        out.push((start, &text[start..]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> Tokenizer {
        Tokenizer::from_rules(
            r"\w+",
            r"[.,]",
            r"-",
            &[("ain't", &["are", "not"]), ("U.S.", &["U.S."])],
            &[],
        )
        .unwrap()
    }

    fn surfaces(tok: &mut Tokenizer, text: &str) -> Vec<String> {
        let tokens = tok.tokenize(text).unwrap();
        tokens
            .iter()
            .map(|t| tok.lexicon().resolve(t.lexeme).to_string())
            .collect()
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        let mut tok = build();
        assert_eq!(surfaces(&mut tok, ""), Vec::<String>::new());
    }

    #[test]
    fn bare_word_is_single_token() {
        let mut tok = build();
        assert_eq!(surfaces(&mut tok, "hello"), vec!["hello"]);
    }

    #[test]
    fn punctuation_peeled_by_suffix_rule() {
        let mut tok = build();
        assert_eq!(
            surfaces(&mut tok, "hello, world."),
            vec!["hello", ",", "world", "."]
        );
    }

    #[test]
    fn special_case_overrides_affix_rules() {
        let mut tok = build();
        assert_eq!(surfaces(&mut tok, "ain't"), vec!["are", "not"]);
    }

    #[test]
    fn special_case_matches_full_stop_abbreviation() {
        let mut tok = build();
        assert_eq!(surfaces(&mut tok, "U.S."), vec!["U.S."]);
    }

    #[test]
    fn infix_splits_once_per_residual() {
        let mut tok = build();
        assert_eq!(
            surfaces(&mut tok, "state-of-the-art."),
            vec!["state", "-", "of-the-art", "."]
        );
    }

    #[test]
    fn offsets_are_non_decreasing() {
        let mut tok = build();
        let tokens = tok.tokenize("hello, world. state-of-the-art.").unwrap();
        let mut last = 0usize;
        for t in tokens.iter() {
            assert!(t.start_offset >= last);
            last = t.start_offset;
        }
    }

    #[test]
    fn repeated_tokenization_is_idempotent_and_does_not_grow_lexicon() {
        let mut tok = build();
        tok.tokenize("hello, world.").unwrap();
        let lexicon_size = tok.lexicon().len();
        let first = surfaces(&mut tok, "hello, world.");
        let second = surfaces(&mut tok, "hello, world.");
        assert_eq!(first, second);
        assert_eq!(tok.lexicon().len(), lexicon_size);
    }

    #[test]
    fn single_interior_space_is_not_emitted_as_its_own_token() {
        let mut tok = build();
        let out = surfaces(&mut tok, "hello world");
        assert_eq!(out, vec!["hello", "world"]);
    }

    #[test]
    fn multiple_interior_spaces_emit_a_whitespace_token() {
        let mut tok = build();
        let out = surfaces(&mut tok, "hello  world");
        assert_eq!(out, vec!["hello", " ", "world"]);
    }

    #[test]
    fn leading_single_space_is_emitted() {
        let mut tok = build();
        let out = surfaces(&mut tok, " hello");
        assert_eq!(out, vec![" ", "hello"]);
    }
}
