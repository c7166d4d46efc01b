use blogsmith_highlight::{BuiltinGrammars, GrammarSource, Highlighter, ThemePair};
use criterion::{Criterion, criterion_group, criterion_main};
use futures::executor::block_on;

const RUST_SNIPPET: &str = r#"/// Sum the even numbers
#[inline]
pub fn sum_even(values: &[i64]) -> i64 {
    /* filter, then fold */
    values.iter().filter(|v| *v % 2 == 0).sum::<i64>()
}

fn main() {
    let label = "total: \"even\"";
    println!("{label} {}", sum_even(&[1, 2, 3, 4, 0x10]));
}
"#;

fn highlighter_with(language: &str) -> Highlighter {
    let engine = Highlighter::new(&ThemePair::vitesse()).expect("themes compile");
    let fetch = BuiltinGrammars.fetch(language).expect("builtin grammar");
    let spec = block_on(fetch).expect("grammar parses");
    engine.register(language, spec).expect("grammar registers");
    engine
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    group.sample_size(20);

    let engine = highlighter_with("rust");
    let small = RUST_SNIPPET.to_string();
    let large = RUST_SNIPPET.repeat(200);

    group.bench_function("rust_small", |b| {
        b.iter(|| std::hint::black_box(engine.tokenize(std::hint::black_box(&small), "rust")));
    });
    group.bench_function("rust_large", |b| {
        b.iter(|| std::hint::black_box(engine.tokenize(std::hint::black_box(&large), "rust")));
    });
    group.bench_function("plaintext_large", |b| {
        b.iter(|| std::hint::black_box(engine.tokenize(std::hint::black_box(&large), "text")));
    });

    group.finish();
}

fn bench_long_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("long_line");
    group.sample_size(10);

    let engine = highlighter_with("python");
    // Just under the default line limit, one token per byte
    let line = "a+".repeat(9_999);

    group.bench_function("python_operator_run", |b| {
        b.iter(|| std::hint::black_box(engine.tokenize(std::hint::black_box(&line), "python")));
    });

    group.finish();
}

fn bench_grammar_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("grammar");
    group.sample_size(10);

    group.bench_function("register_typescript", |b| {
        b.iter(|| std::hint::black_box(highlighter_with("typescript")));
    });

    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_long_line, bench_grammar_load);
criterion_main!(benches);
