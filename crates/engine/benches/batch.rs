// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Batch compilation and diagnostics benchmarks
//!
//! Measures the per-request setup and the per-fragment pipeline against the
//! shop fixture model.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use trilogy_studio_catalog::ImportDirective;
use trilogy_studio_engine::{BatchRequest, EngineConfig, QueryFragment, compile_batch, get_diagnostics};
use trilogy_studio_test_utils::ModelFixtures;

fn batch_request(fragments: usize) -> BatchRequest {
    let queries = [
        "select order_id, amount;",
        "select region, sum(amount) as region_revenue order by region_revenue desc;",
        ModelFixtures::revenue_by_region(),
        "select customer_name, order_count;",
    ];
    let mut request = BatchRequest::new(ModelFixtures::shop_sources())
        .with_import(ImportDirective::new("shop"))
        .with_filter("amount > 10");
    for i in 0..fragments {
        request = request.with_query(QueryFragment::new(
            format!("q{}", i),
            queries[i % queries.len()],
        ));
    }
    request
}

fn bench_batch_by_size(c: &mut Criterion) {
    let config = EngineConfig::default();
    let mut group = c.benchmark_group("batch/compile");

    for size in [1, 10, 50] {
        let request = batch_request(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &request, |b, request| {
            b.iter(|| {
                let results = compile_batch(black_box(request), &config);
                black_box(results)
            });
        });
    }

    group.finish();
}

fn bench_diagnostics(c: &mut Criterion) {
    let config = EngineConfig::default();
    let sources = ModelFixtures::shop_sources();
    let text = format!("import shop;\n{}", ModelFixtures::incomplete_query());

    c.bench_function("diagnostics/incomplete", |b| {
        b.iter(|| black_box(get_diagnostics(black_box(&text), &sources, &config)));
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(50);
    targets =
        bench_batch_by_size,
        bench_diagnostics
);

criterion_main!(benches);
