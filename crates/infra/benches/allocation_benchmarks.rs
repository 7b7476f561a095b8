use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Duration, Utc};
use stockalloc_allocation::{allocate, Batch, OrderLine};
use stockalloc_core::{BatchRef, OrderId, Sku};
use stockalloc_infra::{BatchRepository, InMemoryBatchRepository};

/// Build `n` same-sku candidate batches with staggered etas (one in-stock
/// batch per ten shipments), mimicking a realistic availability horizon.
fn candidate_batches(n: usize) -> Vec<Batch> {
    let today = Utc::now().date_naive();
    (0..n)
        .map(|i| {
            let eta = if i % 10 == 0 {
                None
            } else {
                Some(today + Duration::days((i % 90) as i64))
            };
            Batch::new(BatchRef::new(format!("batch-{i:05}")), Sku::new("BLUE-LAMP"), 1_000, eta)
                .unwrap()
        })
        .collect()
}

fn order_line(i: usize) -> OrderLine {
    OrderLine::new(OrderId::new(format!("order-{i:05}")), Sku::new("BLUE-LAMP"), 10).unwrap()
}

fn bench_selection_over_candidate_sets(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate_selection");

    for size in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || candidate_batches(size),
                |mut batches| {
                    let reference = allocate(&order_line(0), &mut batches).unwrap();
                    black_box(reference)
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_bulk_allocation_through_repository(c: &mut Criterion) {
    c.bench_function("bulk_allocate_100_lines_via_repository", |b| {
        b.iter_batched(
            || {
                let repo =
                    InMemoryBatchRepository::with_batches(candidate_batches(100)).unwrap();
                let candidates = repo.list().unwrap();
                (repo, candidates)
            },
            |(_repo, mut candidates)| {
                for i in 0..100 {
                    let _ = black_box(allocate(&order_line(i), &mut candidates));
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_selection_over_candidate_sets,
    bench_bulk_allocation_through_repository
);
criterion_main!(benches);
