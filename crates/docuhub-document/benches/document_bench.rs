// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for text layout in the docuhub-document crate:
// wrapping a long text with Helvetica metrics and paginating the result.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use docuhub_core::config::TextLayoutConfig;
use docuhub_document::layout::{StandardFontMetrics, paginate, tokenize, wrap};
use docuhub_document::layout_text;

/// Roughly 60 pages of A4 text.
fn sample_text() -> String {
    "The quick brown fox jumps over the lazy dog while seventeen wizards box quickly. "
        .repeat(2_000)
}

fn bench_wrap(c: &mut Criterion) {
    let text = sample_text();
    let tokens = tokenize(&text);
    let metrics = StandardFontMetrics::helvetica(12.0);
    let width = TextLayoutConfig::default().max_line_width();

    c.bench_function("wrap (16k tokens, helvetica 12pt)", |b| {
        b.iter(|| black_box(wrap(black_box(&tokens), &metrics, width)));
    });
}

fn bench_paginate(c: &mut Criterion) {
    let text = sample_text();
    let config = TextLayoutConfig::default();
    let metrics = StandardFontMetrics::helvetica(config.font_size);
    let lines = wrap(&tokenize(&text), &metrics, config.max_line_width());

    c.bench_function("paginate (A4, uncapped)", |b| {
        b.iter(|| {
            black_box(paginate(
                black_box(lines.clone()),
                config.page_height,
                config.margin,
                config.line_pitch(),
                None,
            ))
        });
    });

    c.bench_function("layout_text (wrap + paginate)", |b| {
        b.iter(|| black_box(layout_text(black_box(&text), &metrics, &config)));
    });
}

criterion_group!(benches, bench_wrap, bench_paginate);
criterion_main!(benches);
