use criterion::{Criterion, criterion_group, criterion_main};
use docqa::embeddings::chunking::{ChunkingConfig, split_text};
use std::hint::black_box;

fn synthetic_document() -> String {
    let paragraph = "The quick brown fox jumps over the lazy dog. \
                     Pack my box with five dozen liquor jugs. \
                     How vexingly quick daft zebras jump.\n\
                     Sphinx of black quartz, judge my vow.";
    (0..200)
        .map(|i| format!("Section {}\n{}", i, paragraph))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let text = synthetic_document();
    let config = ChunkingConfig::default();
    c.bench_function("chunking", |b| {
        b.iter(|| split_text(black_box(&text), black_box(&config)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
