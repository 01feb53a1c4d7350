use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};
use tickflake::{
    ConcurrentGenerator, IdParser, IdSource, MonotonicClock, SequentialGenerator,
    SnowflakeConfig, TimeSource,
};

struct FixedMockTime {
    millis: i64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> i64 {
        self.millis
    }
}

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

/// Benchmarks the single-caller hot path.
fn bench_generator<G: IdSource>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> G,
) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.next_id());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks one generator shared across threads.
fn bench_generator_contended<G: IdSource + Send + Sync>(
    c: &mut Criterion,
    group_name: &str,
    generator_factory: impl Fn() -> G,
) {
    let mut group = c.benchmark_group(group_name);
    let max_threads = num_cpus::get().max(2);

    for thread_count in [1, 2, 4, 8, 16].into_iter().filter(|&t| t <= max_threads) {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(format!("elems/{TOTAL_IDS}/threads/{thread_count}"), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();

                for _ in 0..iters {
                    let generator = Arc::new(generator_factory());
                    let barrier = Arc::new(Barrier::new(thread_count));
                    scope(|s| {
                        for _ in 0..thread_count {
                            let generator = Arc::clone(&generator);
                            let barrier = Arc::clone(&barrier);
                            s.spawn(move || {
                                barrier.wait();
                                for _ in 0..ids_per_thread {
                                    black_box(generator.next_id());
                                }
                            });
                        }
                    });
                }

                start.elapsed()
            });
        });
    }

    group.finish();
}

fn bench_parser(c: &mut Criterion) {
    let config = SnowflakeConfig::default();
    let parser = IdParser::new(&config).expect("default config is valid");
    let generator = SequentialGenerator::new(&config, 1).expect("default config is valid");
    let ids: Vec<u64> = (0..TOTAL_IDS).map(|_| generator.next_id()).collect();

    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));
    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter(|| {
            for &id in &ids {
                black_box(parser.parse(black_box(id)));
            }
        });
    });
    group.finish();
}

fn benchmarks(c: &mut Criterion) {
    let config = SnowflakeConfig::default();
    let fixed = SnowflakeConfig::new(0, 0, 10, 12);

    bench_generator(c, "sequential/fixed", || {
        SequentialGenerator::with_clock(&fixed, 1, FixedMockTime { millis: 1 })
            .expect("valid config")
    });
    bench_generator(c, "sequential/system_clock", || {
        SequentialGenerator::new(&config, 1).expect("valid config")
    });
    bench_generator(c, "concurrent/fixed", || {
        ConcurrentGenerator::with_clock(&fixed, 1, FixedMockTime { millis: 1 })
            .expect("valid config")
    });
    bench_generator(c, "concurrent/system_clock", || {
        ConcurrentGenerator::new(&config, 1).expect("valid config")
    });

    let clock = MonotonicClock::new();
    bench_generator_contended(c, "concurrent/contended/monotonic_clock", || {
        ConcurrentGenerator::with_clock(&config, 1, clock.clone()).expect("valid config")
    });
    bench_generator_contended(c, "concurrent/contended/system_clock", || {
        ConcurrentGenerator::new(&config, 1).expect("valid config")
    });

    bench_parser(c);
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
