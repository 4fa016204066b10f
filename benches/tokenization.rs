//! Cache-hit vs. cache-miss tokenization throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lexitok::Tokenizer;

fn build() -> Tokenizer {
    Tokenizer::from_rules(
        r"\w+",
        r"[.,!?;:]",
        r"-",
        &[("ain't", &["are", "not"]), ("U.S.", &["U.S."])],
        &[],
    )
    .expect("illustrative rules always compile")
}

fn bench_cache_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize_cache_miss");

    for size in &[10, 100, 1000] {
        // Every chunk is distinct, so every call is a fresh cache miss.
        let text: String = (0..*size)
            .map(|i| format!("word{i}-of-the-art,"))
            .collect::<Vec<_>>()
            .join(" ");

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            let mut tok = build();
            b.iter(|| tok.tokenize(black_box(&text)));
        });
    }
    group.finish();
}

fn bench_cache_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize_cache_hit");

    for size in &[10, 100, 1000] {
        let text = "hello, world. state-of-the-art. ".repeat(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            let mut tok = build();
            tok.tokenize(&text).unwrap(); // warm the cache once
            b.iter(|| tok.tokenize(black_box(&text)));
        });
    }
    group.finish();
}

fn bench_lexicon_get(c: &mut Criterion) {
    c.bench_function("lexicon_get_repeated_surface", |b| {
        let mut lex = lexitok::Lexicon::new();
        lex.get("hello");
        b.iter(|| lex.get(black_box("hello")));
    });
}

criterion_group!(benches, bench_cache_miss, bench_cache_hit, bench_lexicon_get);
criterion_main!(benches);
