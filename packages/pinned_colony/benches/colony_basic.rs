//! Basic benchmarks for the `pinned_colony` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use pinned_colony::Colony;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

type TestItem = usize;
const TEST_VALUE: TestItem = 1024;

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("colony_basic");

    let allocs_op = allocs.operation("build_empty");
    group.bench_function("build_empty", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(Colony::<TestItem>::new()));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_first");
    group.bench_function("push_first", |b| {
        b.iter_custom(|iters| {
            let mut colonies = iter::repeat_with(Colony::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for colony in &mut colonies {
                _ = black_box(colony.push(black_box(TEST_VALUE)));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_reuse");
    group.bench_function("push_reuse", |b| {
        b.iter_custom(|iters| {
            let mut colonies = iter::repeat_with(Colony::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            // Leave one vacated slot in each colony, so the push takes the reuse path.
            for colony in &mut colonies {
                colony.push(TEST_VALUE);
                let cursor = colony.push(TEST_VALUE);
                colony.erase(cursor);
            }

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for colony in &mut colonies {
                _ = black_box(colony.push(black_box(TEST_VALUE)));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("read_one");
    group.bench_function("read_one", |b| {
        b.iter_custom(|iters| {
            let mut colony = Colony::<TestItem>::new();
            let cursor = colony.push(TEST_VALUE);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(colony.get(cursor));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("erase_one");
    group.bench_function("erase_one", |b| {
        b.iter_custom(|iters| {
            let mut colonies = iter::repeat_with(Colony::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let cursors = colonies
                .iter_mut()
                .map(|colony| colony.push(TEST_VALUE))
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for (colony, cursor) in colonies.iter_mut().zip(cursors) {
                colony.erase(cursor);
            }

            start.elapsed()
        });
    });

    group.finish();

    let mut group = c.benchmark_group("colony_slow");

    let allocs_op = allocs.operation("push_10k");
    group.bench_function("push_10k", |b| {
        b.iter_custom(|iters| {
            let mut colonies = iter::repeat_with(Colony::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for colony in &mut colonies {
                for _ in 0..10_000 {
                    _ = black_box(colony.push(black_box(TEST_VALUE)));
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("iter_10k");
    group.bench_function("iter_10k", |b| {
        b.iter_custom(|iters| {
            let mut colony = Colony::<TestItem>::new();

            for _ in 0..10_000 {
                colony.push(TEST_VALUE);
            }

            // Punch holes so that traversal has to skip around.
            let mut index = 0_usize;
            colony.retain(|_| {
                index = index.wrapping_add(1);
                index % 7 != 0
            });

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                for value in &colony {
                    _ = black_box(value);
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("erase_10k");
    group.bench_function("erase_10k", |b| {
        b.iter_custom(|iters| {
            let mut colonies = iter::repeat_with(Colony::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            for colony in &mut colonies {
                for _ in 0..10_000 {
                    colony.push(TEST_VALUE);
                }
            }

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for colony in &mut colonies {
                while !colony.is_end(colony.begin()) {
                    colony.erase(colony.begin());
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("clone_10k");
    group.bench_function("clone_10k", |b| {
        b.iter_custom(|iters| {
            let mut colony = Colony::<TestItem>::new();

            for _ in 0..10_000 {
                colony.push(TEST_VALUE);
            }

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(colony.clone()));
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
