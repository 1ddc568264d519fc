use criterion::{black_box, criterion_group, criterion_main, Criterion};
use localcache::Cache;
use rand::{Rng, SeedableRng};

fn bench_set(c: &mut Criterion) {
    let cache = Cache::builder().build().unwrap();
    let mut i: u64 = 0;
    c.bench_function("set", |b| {
        b.iter(|| {
            i = i.wrapping_add(1);
            cache
                .set(black_box(&i.to_le_bytes()), black_box(b"benchmark-value"))
                .unwrap();
        })
    });
}

fn bench_get_hit(c: &mut Criterion) {
    let cache = Cache::builder().build().unwrap();
    for i in 0..10_000u64 {
        cache.set(&i.to_le_bytes(), b"benchmark-value").unwrap();
    }
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    c.bench_function("get_hit", |b| {
        b.iter(|| {
            let i: u64 = rng.gen_range(0..10_000);
            black_box(cache.get(&i.to_le_bytes()).ok());
        })
    });
}

fn bench_mixed(c: &mut Criterion) {
    let cache = Cache::builder().build().unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    c.bench_function("mixed_90_read_10_write", |b| {
        b.iter(|| {
            let i: u64 = rng.gen_range(0..10_000);
            if i % 10 == 0 {
                cache.set(&i.to_le_bytes(), b"benchmark-value").unwrap();
            } else {
                black_box(cache.get(&i.to_le_bytes()).ok());
            }
        })
    });
}

criterion_group!(benches, bench_set, bench_get_hit, bench_mixed);
criterion_main!(benches);
