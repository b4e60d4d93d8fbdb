// Copyright 2024 The Regents of the University of California
// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

#[cfg(feature = "benchmark")]
use criterion::{criterion_group, criterion_main, Criterion};
#[cfg(feature = "benchmark")]
use wavehist::{HistoryChain, HistoryValue};

#[cfg(feature = "benchmark")]
fn criterion_benchmark(c: &mut Criterion) {
    let mut chain = HistoryChain::with_capacity(100_000);
    for ii in 0..100_000u64 {
        chain
            .push((ii * 5) as i64, HistoryValue::from_unsigned(ii, 32))
            .unwrap();
    }
    c.bench_function("find_at", |b| b.iter(|| chain.find_at(371_113)));
    c.bench_function("find_at_linear", |b| {
        b.iter(|| chain.find_at_linear(371_113))
    });
}

#[cfg(feature = "benchmark")]
criterion_group!(benches, criterion_benchmark);
#[cfg(feature = "benchmark")]
criterion_main!(benches);

#[cfg(not(feature = "benchmark"))]
fn main() {}
