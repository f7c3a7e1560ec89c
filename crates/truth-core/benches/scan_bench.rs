// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Truth Kernel Scan Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks for the full text scan with the hashing
//! embedder standing in for a sentence-transformer.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use truth_core::{HashingEmbedder, ModelHandle, TruthScanner};
use truth_types::{PipelineConfig, VerdictConfig};

const TOPICS: [&str; 6] = [
    "the orbital station adjusted its altitude after the burn",
    "local farmers reported an early harvest of winter wheat",
    "the committee postponed the vote on the transit budget",
    "researchers measured the thermal drift of the sensor array",
    "the orchestra rehearsed the final movement twice this week",
    "engineers replaced the worn bearings in the northern turbine",
];

fn scanner() -> TruthScanner {
    TruthScanner::new(
        PipelineConfig::default(),
        Arc::new(ModelHandle::with_provider(Arc::new(HashingEmbedder::default()))),
    )
    .expect("default pipeline is valid")
}

fn text(sentences: usize) -> String {
    (0..sentences)
        .map(|i| format!("{} on day {i}.", TOPICS[i % TOPICS.len()]))
        .collect::<Vec<_>>()
        .join(" ")
}

// ── TruthScanner.scan() ─────────────────────────────────────────────

fn bench_scan_10_sentences(c: &mut Criterion) {
    let scanner = scanner();
    let cfg = VerdictConfig::default();
    let input = text(10);
    c.bench_function("scan_10_sentences", |b| {
        b.iter(|| scanner.scan(black_box(&input), &cfg))
    });
}

fn bench_scan_40_sentences(c: &mut Criterion) {
    let scanner = scanner();
    let cfg = VerdictConfig::adaptive();
    let input = text(40);
    c.bench_function("scan_40_sentences_adaptive", |b| {
        b.iter(|| scanner.scan(black_box(&input), &cfg))
    });
}

// ── Early exits ─────────────────────────────────────────────────────

fn bench_scan_code_skip(c: &mut Criterion) {
    let scanner = scanner();
    let cfg = VerdictConfig::default();
    let input = "import sys\nclass Gate:\n    def run(self):\n        return {}";
    c.bench_function("scan_code_skip", |b| {
        b.iter(|| scanner.scan(black_box(input), &cfg))
    });
}

criterion_group!(
    benches,
    bench_scan_10_sentences,
    bench_scan_40_sentences,
    bench_scan_code_skip,
);
criterion_main!(benches);
