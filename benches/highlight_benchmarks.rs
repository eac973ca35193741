//! Benchmarks for highlighting and message parsing.
//!
//! Run with: cargo bench

use codechat_core::{EditorDocument, InsertionController, MessageParser, TracingNotifier};
use codechat_syntax::{GrammarRegistry, Highlighter};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// Generates a Python source of the given line count.
fn generate_python(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("def f{i}(x):  # line {i}\n    return len(\"<{i}>\") + x * 0x{i:x}\n"))
        .collect()
}

/// Generates a chat reply with `blocks` fenced code blocks.
fn generate_message(blocks: usize) -> String {
    (0..blocks)
        .map(|i| format!("Step {i}: call `run({i})`.\n```python step{i}.py\n{}```\n", generate_python(20)))
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let registry = GrammarRegistry::with_builtin();
    let highlighter = Highlighter::new(&registry);
    let mut group = c.benchmark_group("tokenize");

    for lines in [10, 100, 1000, 10000] {
        let code = generate_python(lines);
        group.bench_with_input(BenchmarkId::new("python", lines), &code, |b, code| {
            b.iter(|| black_box(highlighter.tokenize(black_box(code), "python")))
        });
    }

    group.finish();
}

fn bench_highlight(c: &mut Criterion) {
    let registry = GrammarRegistry::with_builtin();
    let highlighter = Highlighter::new(&registry);
    let code = generate_python(1000);
    let mut group = c.benchmark_group("highlight");

    for lang in ["python", "javascript", "sql", "unknown"] {
        group.bench_with_input(BenchmarkId::new("markup", lang), &code, |b, code| {
            b.iter(|| black_box(highlighter.highlight(black_box(code), lang)))
        });
    }

    group.finish();
}

fn bench_parse_message(c: &mut Criterion) {
    let registry = GrammarRegistry::with_builtin();
    let parser = MessageParser::new(Highlighter::new(&registry));
    let mut group = c.benchmark_group("parse_message");

    for blocks in [1, 10, 50] {
        let message = generate_message(blocks);
        group.bench_with_input(BenchmarkId::new("blocks", blocks), &message, |b, message| {
            b.iter(|| black_box(parser.parse(black_box(message))))
        });
    }

    group.finish();
}

fn bench_insertion(c: &mut Criterion) {
    let controller = InsertionController::new(TracingNotifier);
    let base = generate_python(10000);
    let code = generate_python(20);

    c.bench_function("insert_into_large_document", |b| {
        b.iter_with_setup(
            || {
                let mut doc = EditorDocument::new();
                doc.load("big.py", base.as_str());
                doc
            },
            |mut doc| {
                controller.insert(&mut doc, black_box(&code), "step.py").unwrap();
                black_box(doc)
            },
        )
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_highlight,
    bench_parse_message,
    bench_insertion,
);
criterion_main!(benches);
