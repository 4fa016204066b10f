//! Round-trip persistence property and the data-directory loader.

use lexitok::{Lexicon, TokenizerConfig};
use lexitok::Tokenizer;
use std::fs;

#[test]
fn dump_then_load_preserves_every_fingerprint_and_payload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lexicon.bin");

    let mut original: Lexicon = Lexicon::new();
    for surface in ["hello", "world", ",", ".", "state", "-"] {
        original.get(surface);
    }
    original.dump(&path).unwrap();

    let mut loaded: Lexicon = Lexicon::new();
    loaded.load(&path).unwrap();

    assert_eq!(loaded.len(), original.len());
    for surface in ["hello", "world", ",", ".", "state", "-"] {
        let before = original.lookup(surface).unwrap();
        let after = loaded.lookup(surface).unwrap();
        assert_eq!(before.fingerprint(), after.fingerprint());
        assert_eq!(before.payload(), after.payload());
    }
}

fn write_language(root: &std::path::Path, lang: &str) {
    let dir = root.join(lang);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("prefix"), r"\w+").unwrap();
    fs::write(dir.join("suffix"), r"[.,]").unwrap();
    fs::write(dir.join("infix"), r"-").unwrap();
    fs::write(dir.join("tokenization"), "ain't\tare,not\nU.S.\tU.S.\n").unwrap();
    fs::write(dir.join("lexemes"), "hello\t0\nworld\t0\n").unwrap();
}

#[test]
fn loads_a_language_from_a_data_root_and_tokenizes() {
    let root = tempfile::tempdir().unwrap();
    write_language(root.path(), "en");

    let config = TokenizerConfig::new(root.path(), "en");
    let mut tok = Tokenizer::from_config(&config).unwrap();

    let tokens = tok.tokenize("ain't, hello world.").unwrap();
    let surfaces: Vec<&str> = tokens
        .iter()
        .map(|t| tok.lexicon().resolve(t.lexeme))
        .collect();
    assert_eq!(surfaces, vec!["are", "not", ",", "hello", "world", "."]);
}

#[test]
fn unknown_language_is_a_typed_error() {
    let root = tempfile::tempdir().unwrap();
    let config = TokenizerConfig::new(root.path(), "xx");
    let err = Tokenizer::from_config(&config).err().unwrap();
    assert!(matches!(err, lexitok::Error::UnknownLanguage(_)));
}

#[test]
fn malformed_regex_is_a_typed_error_before_any_tokenizer_is_returned() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("en");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("prefix"), "(").unwrap();
    fs::write(dir.join("suffix"), r"[.,]").unwrap();
    fs::write(dir.join("infix"), r"-").unwrap();
    fs::write(dir.join("tokenization"), "").unwrap();
    fs::write(dir.join("lexemes"), "").unwrap();

    let config = TokenizerConfig::new(root.path(), "en");
    let err = Tokenizer::from_config(&config).err().unwrap();
    assert!(matches!(err, lexitok::Error::InvalidRule(_)));
}
