use std::hint::black_box;
use std::rc::Rc;

use blogsmith_editor::{Cmd, DecorationSync, Document, Transaction};
use blogsmith_highlight::{BuiltinGrammars, GrammarSource, Highlighter, ThemePair};
use criterion::{Criterion, criterion_group, criterion_main};
use futures::executor::block_on;

fn generate_post(blocks: usize) -> String {
    let mut post = String::from("# Benchmarks\n\n");
    for i in 0..blocks {
        post.push_str(&format!("Paragraph {i} explaining the snippet below.\n\n"));
        post.push_str("```rust\n");
        post.push_str(&format!(
            "fn item_{i}(x: u32) -> u32 {{\n    // double it\n    x * 2 + {i}\n}}\n"
        ));
        post.push_str("```\n\n");
    }
    post
}

fn engine() -> Rc<Highlighter> {
    let engine = Highlighter::new(&ThemePair::vitesse()).expect("themes compile");
    let fetch = BuiltinGrammars.fetch("rust").expect("builtin grammar");
    let spec = block_on(fetch).expect("grammar parses");
    engine.register("rust", spec).expect("grammar registers");
    Rc::new(engine)
}

fn bench_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync");
    group.sample_size(20);

    let post = generate_post(50);
    let engine = engine();

    group.bench_function("recompute_50_blocks", |b| {
        let doc = Document::from_text(&post);
        b.iter(|| {
            let mut sync = DecorationSync::new();
            sync.on_engine_ready(engine.clone(), &doc);
            black_box(sync.decorations().len());
        });
    });

    group.bench_function("map_after_prose_edit", |b| {
        let mut doc = Document::from_text(&post);
        doc.set_selection(2..2);
        let mut sync = DecorationSync::new();
        sync.on_engine_ready(engine.clone(), &doc);
        b.iter(|| {
            let tx = Transaction::cmd(Cmd::InsertText {
                at: 2,
                text: "x".into(),
            });
            let old_selection = doc.selection();
            let patch = doc.apply(&tx).expect("valid edit");
            black_box(sync.apply(&tx, &patch, &old_selection, &doc).len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_sync);
criterion_main!(benches);
