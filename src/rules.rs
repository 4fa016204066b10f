//! Compiled rule sets: prefix/suffix/infix matchers and the special-case
//! table, plus the data-directory loader that builds them.
//!
//! Regex patterns are compiled once and applied via `find`. Every failure
//! mode of `LanguageData::load` is reported before a tokenizer is ever
//! handed to the caller.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use fancy_regex::Regex;

use crate::fingerprint::{fingerprint, Fingerprint};
use crate::lexicon::LexemeRef;
use crate::string_store::Interner;
use crate::Error;

/// Compiled prefix/suffix/infix matchers for one language.
#[derive(Clone, Debug)]
pub struct RuleSet {
    prefix: Regex,
    suffix: Regex,
    infix: Regex,
}

impl RuleSet {
    /// Compile the three matchers from their regex source strings.
    pub fn compile(prefix_src: &str, suffix_src: &str, infix_src: &str) -> Result<Self, Error> {
        let prefix = Regex::new(&format!("^(?:{prefix_src})"))
            .map_err(|e| Error::InvalidRule(format!("prefix pattern {prefix_src:?}: {e}")))?;
        let suffix = Regex::new(&format!("(?:{suffix_src})$"))
            .map_err(|e| Error::InvalidRule(format!("suffix pattern {suffix_src:?}: {e}")))?;
        let infix = Regex::new(infix_src)
            .map_err(|e| Error::InvalidRule(format!("infix pattern {infix_src:?}: {e}")))?;
        Ok(Self {
            prefix,
            suffix,
            infix,
        })
    }

    /// Length of the match anchored at the start of `s`, or 0 if none.
    #[must_use]
    pub fn prefix_match(&self, s: &str) -> usize {
        match self.prefix.find(s) {
            Ok(Some(m)) if m.start() == 0 => m.end(),
            _ => 0,
        }
    }

    /// Length of the match anchored at the end of `s`, or 0 if none.
    #[must_use]
    pub fn suffix_match(&self, s: &str) -> usize {
        match self.suffix.find(s) {
            Ok(Some(m)) if m.end() == s.len() => m.end() - m.start(),
            _ => 0,
        }
    }

    /// Byte offset of the first infix match inside `s`, or `None` if no
    /// match. A real match at offset 0 is possible in principle and must
    /// not be conflated with absence, so "no match" is `None` rather than
    /// a sentinel `0`.
    #[must_use]
    pub fn infix_match(&self, s: &str) -> Option<usize> {
        match self.infix.find(s) {
            Ok(Some(m)) => Some(m.start()),
            _ => None,
        }
    }
}

/// Preseeded chunk -> canonical token expansion table.
#[derive(Default, Clone)]
pub struct SpecialTable {
    entries: HashMap<Fingerprint, Vec<LexemeRef>>,
}

impl SpecialTable {
    #[must_use]
    pub fn get(&self, fp: Fingerprint) -> Option<&[LexemeRef]> {
        self.entries.get(&fp).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, fp: Fingerprint) -> bool {
        self.entries.contains_key(&fp)
    }

    pub(crate) fn insert(&mut self, fp: Fingerprint, expansion: Vec<LexemeRef>) {
        self.entries.insert(fp, expansion);
    }
}

/// Preseeded `(chunk fingerprint, expansion)` pairs to install into the
/// tokenizer's cache before it serves its first call.
pub type CacheSeed = Vec<(Fingerprint, Vec<LexemeRef>)>;

/// Fully loaded language bundle: compiled rules, special-case table, and a
/// seeded lexicon.
pub struct LanguageData {
    pub rules: RuleSet,
    pub specials: SpecialTable,
}

impl LanguageData {
    /// Resolve `<root>/<lang>/{tokenization,prefix,suffix,infix,lexemes}`
    /// and build a [`LanguageData`], seeding `lexicon` with the lexeme list
    /// and the special-case expansions.
    ///
    /// Specials also preseed the tokenizer's cache; that step happens in
    /// [`crate::tokenizer::Tokenizer::new`] once the cache exists, using the
    /// `rules` field returned here.
    pub fn load<I: Interner + Clone>(
        root: &Path,
        lang: &str,
        lexicon: &mut crate::lexicon::Lexicon<I>,
    ) -> Result<(Self, CacheSeed), Error> {
        let lang_dir = root.join(lang);
        if !lang_dir.is_dir() {
            return Err(Error::UnknownLanguage(lang.to_string()));
        }

        let prefix_src = read_trimmed(&lang_dir.join("prefix"))?;
        let suffix_src = read_trimmed(&lang_dir.join("suffix"))?;
        let infix_src = read_trimmed(&lang_dir.join("infix"))?;
        let rules = RuleSet::compile(&prefix_src, &suffix_src, &infix_src)?;

        for (surface, _features) in read_lexeme_lines(&lang_dir.join("lexemes"))? {
            lexicon.get(&surface);
        }

        let mut specials = SpecialTable::default();
        let mut cache_seed = Vec::new();
        for (chunk, expansion_surfaces) in read_tokenization_lines(&lang_dir.join("tokenization"))? {
            let expansion: Vec<LexemeRef> = expansion_surfaces
                .iter()
                .map(|surface| lexicon.get(surface))
                .collect();
            let fp = fingerprint(&chunk);
            specials.insert(fp, expansion.clone());
            cache_seed.push((fp, expansion));
        }

        Ok((Self { rules, specials }, cache_seed))
    }
}

fn read_trimmed(path: &Path) -> Result<String, Error> {
    let contents = fs::read_to_string(path)?;
    Ok(contents.trim().to_string())
}

fn read_lexeme_lines(path: &Path) -> Result<Vec<(String, String)>, Error> {
    let contents = fs::read_to_string(path)?;
    let mut out = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, '\t');
        let surface = parts.next().unwrap_or_default();
        let features = parts.next().unwrap_or_default();
        if surface.is_empty() {
            return Err(Error::InvalidRule(format!(
                "{}:{}: lexeme line missing surface form",
                path.display(),
                lineno + 1
            )));
        }
        out.push((surface.to_string(), features.to_string()));
    }
    Ok(out)
}

fn read_tokenization_lines(path: &Path) -> Result<Vec<(String, Vec<String>)>, Error> {
    let contents = fs::read_to_string(path)?;
    let mut out = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, '\t');
        let chunk = parts.next().unwrap_or_default();
        let rest = parts.next().ok_or_else(|| {
            Error::InvalidRule(format!(
                "{}:{}: tokenization rule missing expansion",
                path.display(),
                lineno + 1
            ))
        })?;
        if chunk.is_empty() {
            return Err(Error::InvalidRule(format!(
                "{}:{}: tokenization rule missing chunk",
                path.display(),
                lineno + 1
            )));
        }
        let expansion: Vec<String> = rest.split(',').map(str::to_string).collect();
        out.push((chunk.to_string(), expansion));
    }
    Ok(out)
}
