//! Reassembly benchmark: Measure fragment buffering and release cost.
//!
//! Target: < 1µs per fragment for scrambled arrivals

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use typecast::{Fragment, FragmentStore, ReassemblyController};

/// Deterministic scramble: reverse every block of `block` indices.
fn scrambled(n: u64, block: u64) -> Vec<u64> {
    let mut order: Vec<u64> = (0..n).collect();
    for chunk in order.chunks_mut(block as usize) {
        chunk.reverse();
    }
    order
}

fn store_put_and_drain(c: &mut Criterion) {
    c.bench_function("store_put_drain_1k", |b| {
        let order = scrambled(1_000, 8);
        b.iter(|| {
            let mut store = FragmentStore::new();
            for &index in &order {
                store.put(index, "tok ");
            }
            let mut cursor = 0;
            black_box(store.drain_contiguous(&mut cursor))
        });
    });
}

fn controller_scrambled(c: &mut Criterion) {
    let mut group = c.benchmark_group("controller_scrambled_1k");
    for block in [1u64, 4, 16, 64] {
        let order = scrambled(1_000, block);
        group.bench_with_input(BenchmarkId::from_parameter(block), &order, |b, order| {
            b.iter(|| {
                let mut controller = ReassemblyController::new(5);
                controller.begin();
                let mut released = 0;
                for &index in order {
                    if let Some(release) = controller.on_fragment(Fragment::new(index, "tok ")) {
                        released += release.fragments;
                    }
                }
                if let Some(release) = controller.on_end() {
                    released += release.fragments;
                }
                black_box(released)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, store_put_and_drain, controller_scrambled);
criterion_main!(benches);
