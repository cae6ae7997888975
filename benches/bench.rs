use maglev::{Blake3, Maglev, DEFAULT_TABLE_SIZE};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use std::env;

const NODE_COUNTS: [usize; 4] = [5, 10, 50, 100];

fn table_size() -> usize {
    env::var("MAGLEV_TABLE_SIZE")
        .ok()
        .and_then(|size| size.parse().ok())
        .unwrap_or(DEFAULT_TABLE_SIZE)
}

fn nodes(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("10.0.{}.{}:11211", i / 256, i % 256)).collect()
}

fn keys() -> Vec<String> {
    // Use seeded RNG for consistent keys across runs
    let mut rng = StdRng::seed_from_u64(1337);
    (0..1024)
        .map(|_| format!("key-{}", rng.gen::<u64>()))
        .collect()
}

fn bench_get(c: &mut Criterion) {
    let maglev = Maglev::new(nodes(5), 13);
    c.bench_function("get_small_table", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            black_box(maglev.get(i.to_string()).unwrap());
        })
    });

    let keys = keys();
    let mut group = c.benchmark_group("get");
    for count in NODE_COUNTS {
        let maglev = Maglev::new(nodes(count), table_size());
        group.bench_with_input(BenchmarkId::new("crc64", count), &maglev, |b, maglev| {
            b.iter(|| {
                for key in &keys {
                    black_box(maglev.get(key).unwrap());
                }
            })
        });

        let maglev = Maglev::with_hasher(nodes(count), table_size(), Blake3);
        group.bench_with_input(BenchmarkId::new("blake3", count), &maglev, |b, maglev| {
            b.iter(|| {
                for key in &keys {
                    black_box(maglev.get(key).unwrap());
                }
            })
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);
    for count in NODE_COUNTS {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, count| {
            b.iter(|| black_box(Maglev::new(nodes(*count), table_size())))
        });
    }
    group.finish();
}

fn bench_add_remove_node(c: &mut Criterion) {
    let mut group = c.benchmark_group("membership");
    group.sample_size(10);
    for count in NODE_COUNTS {
        let maglev = Maglev::new(nodes(count), table_size());
        group.bench_with_input(BenchmarkId::new("add_node", count), &maglev, |b, maglev| {
            b.iter_batched(
                || maglev.clone(),
                |mut maglev| maglev.add_node("10.1.0.1:11211").unwrap(),
                BatchSize::LargeInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("remove_node", count), &maglev, |b, maglev| {
            b.iter_batched(
                || maglev.clone(),
                |mut maglev| maglev.remove_node("10.0.0.0:11211").unwrap(),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_get, bench_build, bench_add_remove_node);
criterion_main!(benches);
