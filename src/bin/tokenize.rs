//! Tokenize stdin or a file against a language data root. Prints one
//! surface form per line, or a `--json` array of `{offset, surface}`
//! records.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lexitok::{Tokenizer, TokenizerConfig};
use serde_json::json;

/// Rule-based whitespace/affix tokenizer.
#[derive(Parser, Debug)]
#[command(name = "lexitok", about = "Tokenize text against a language data root")]
struct Args {
    /// Data root containing `<lang>/{tokenization,prefix,suffix,infix,lexemes}`.
    #[arg(long)]
    data_root: PathBuf,

    /// Language directory name under `data_root`.
    #[arg(long)]
    lang: String,

    /// File to tokenize; reads stdin if omitted.
    file: Option<PathBuf>,

    /// Emit a JSON array of `{offset, surface}` instead of one line per token.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::try_init().ok();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), lexitok::Error> {
    let config = TokenizerConfig::new(&args.data_root, &args.lang);
    let mut tokenizer = Tokenizer::from_config(&config)?;

    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let tokens = tokenizer.tokenize(&text)?;

    if args.json {
        let records: Vec<_> = tokens
            .iter()
            .map(|t| json!({"offset": t.start_offset, "surface": tokenizer.lexicon().resolve(t.lexeme)}))
            .collect();
        println!("{}", serde_json::Value::Array(records));
    } else {
        for t in tokens.iter() {
            println!("{}", tokenizer.lexicon().resolve(t.lexeme));
        }
    }

    Ok(())
}
