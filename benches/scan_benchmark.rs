//! Benchmarks for chapter boundary scanning.
//!
//! Run with: cargo bench
//!
//! Pages are served from memory so the numbers reflect the heuristics,
//! not PDF text extraction.

use std::io::Write;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chapsplit::{BoundaryScanner, DocumentInfo, PatternSet, PdfBackend, ScanOptions};

/// In-memory document with a chapter heading every `every` pages.
struct SyntheticBook {
    pages: Vec<String>,
}

impl SyntheticBook {
    fn new(page_count: usize, every: usize) -> Self {
        let pages = (0..page_count)
            .map(|i| {
                let mut lines: Vec<String> = (0..40)
                    .map(|l| format!("Line {} of page {} with some ordinary prose in it.", l, i))
                    .collect();
                if i % every == 0 {
                    lines[0] = format!("Chapter {} The Next Part", i / every + 1);
                }
                lines.join("\n")
            })
            .collect();
        Self { pages }
    }
}

impl PdfBackend for SyntheticBook {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> chapsplit::Result<String> {
        Ok(self.pages[index].clone())
    }

    fn check_page(&self, _index: usize) -> chapsplit::Result<()> {
        Ok(())
    }

    fn write_pages(&self, _pages: &[usize], _out: &mut dyn Write) -> chapsplit::Result<()> {
        Ok(())
    }

    fn info(&self) -> DocumentInfo {
        DocumentInfo::default()
    }
}

/// Benchmark scanning at various document sizes.
fn bench_scan(c: &mut Criterion) {
    let patterns = PatternSet::with_builtins();
    let options = ScanOptions::default();
    let mut group = c.benchmark_group("scan");

    for page_count in [10, 100, 500].iter() {
        let book = SyntheticBook::new(*page_count, 12);
        group.bench_function(format!("{}_pages", page_count), |b| {
            let scanner = BoundaryScanner::new(&patterns, &options);
            b.iter(|| scanner.scan(black_box(&book)));
        });
    }

    group.finish();
}

/// Benchmark a single line against the full pattern set.
fn bench_pattern_match(c: &mut Criterion) {
    let patterns = PatternSet::with_builtins()
        .with_pattern(r"^Appendix\s+[A-Z]")
        .unwrap();

    c.bench_function("match_heading", |b| {
        b.iter(|| patterns.matches(black_box("Chapter 12 The Return")));
    });

    c.bench_function("match_miss", |b| {
        b.iter(|| patterns.matches(black_box("It was the best of times, it was the worst")));
    });
}

/// Benchmark filename sanitization.
fn bench_sanitize(c: &mut Criterion) {
    c.bench_function("sanitize_filename", |b| {
        b.iter(|| chapsplit::sanitize_filename(black_box(" Part 2: Who/What? <draft>. ")));
    });
}

criterion_group!(benches, bench_scan, bench_pattern_match, bench_sanitize);
criterion_main!(benches);
