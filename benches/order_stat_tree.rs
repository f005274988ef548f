use containment_index::order_stat_tree::OrderStatTree;
use criterion::{criterion_group, criterion_main, Criterion};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn build_shuffled(n: u32, seed: u64) -> Vec<u32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut keys: Vec<u32> = (0..n).collect();
    keys.shuffle(&mut rng);
    keys
}

fn add(c: &mut Criterion) {
    let keys = build_shuffled(100_000, 7);

    c.bench_function("order_stat_tree add 100k shuffled keys", |b| {
        b.iter(|| {
            let mut tree = OrderStatTree::new();
            for &k in &keys {
                tree.add(k);
            }
            tree
        });
    });
}

fn count_ge(c: &mut Criterion) {
    let keys = build_shuffled(100_000, 7);
    let mut tree = OrderStatTree::new();
    for &k in &keys {
        tree.add(k);
    }

    c.bench_function("order_stat_tree count_ge on 100k keys", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for q in (0..100_000u32).step_by(997) {
                total += tree.count_ge(&q);
            }
            total
        });
    });
}

fn remove(c: &mut Criterion) {
    let keys = build_shuffled(50_000, 11);

    c.bench_function("order_stat_tree add+remove 50k keys", |b| {
        b.iter(|| {
            let mut tree = OrderStatTree::new();
            for &k in &keys {
                tree.add(k);
            }
            for &k in &keys {
                tree.remove(&k);
            }
            tree.is_empty()
        });
    });
}

criterion_group!(benches, add, count_ge, remove);
criterion_main!(benches);
