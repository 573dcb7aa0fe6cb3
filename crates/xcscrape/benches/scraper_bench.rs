// Copyright (c) 2026 - present The xcscrape Authors
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use xcscrape::{Destination, ScrapeContext, SummarySink, grammar};

fn transcript(suites: usize, cases: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for s in 0..suites {
        lines.push(format!("Test Suite 'Suite{s}' started at 2026-01-01 12:00:00.000"));
        for c in 0..cases {
            let id = format!("-[Module.Suite{s} test{c}]");
            lines.push(format!("Test Case '{id}' started."));
            lines.push(format!("output from test {c}"));
            if c % 5 == 0 {
                lines.push(format!("/src/Suite{s}.swift:{c}: error: {id} : XCTAssertTrue failed"));
                lines.push(format!("Test Case '{id}' failed (0.001 seconds)."));
            } else {
                lines.push(format!("Test Case '{id}' passed (0.001 seconds)."));
            }
        }
        lines.push(format!("Test Suite 'Suite{s}' failed at 2026-01-01 12:00:01.000"));
    }
    lines
}

fn scraper_benchmark(c: &mut Criterion) {
    let lines = transcript(20, 50);

    c.bench_function("scrape_transcript", |b| {
        b.iter(|| {
            let summary = Arc::new(SummarySink::new());
            let context = ScrapeContext::new(summary.clone());
            let stdout = context.scraper(Destination::StdOut);
            for line in &lines {
                let _ = stdout.text(line);
            }
            std::hint::black_box(summary.summary().total)
        })
    });

    c.bench_function("classify_line", |b| {
        b.iter(|| {
            for line in &lines {
                let _ = std::hint::black_box(grammar::classify(line));
            }
        })
    });
}

criterion_group!(benches, scraper_benchmark);
criterion_main!(benches);
