// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use criterion::{criterion_group, criterion_main, Criterion};
use evently::middleware::RouteGuard;
use std::hint::black_box;

fn benchmark_classify(c: &mut Criterion) {
    let guard = RouteGuard::standard().expect("Invalid route patterns");

    let mut group = c.benchmark_group("route_guard_classify");

    group.bench_function("protected_event_page", |b| {
        b.iter(|| guard.classify(black_box("/events/665f1c2e9b1e8a0012345678")))
    });

    group.bench_function("ignored_webhook", |b| {
        b.iter(|| guard.classify(black_box("/api/webhook/clerk")))
    });

    group.bench_function("nested_protected_file", |b| {
        b.iter(|| guard.classify(black_box("/events/665f1c2e9b1e8a0012345678/banner.png")))
    });

    group.bench_function("public_page", |b| {
        b.iter(|| guard.classify(black_box("/sign-in")))
    });

    group.finish();
}

criterion_group!(benches, benchmark_classify);
criterion_main!(benches);
