use containment_index::{Backend, Config, ContainmentIndex, IndexedEntry, Universe};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

#[derive(Clone, PartialEq, Eq)]
struct Entry(Vec<u32>);

impl IndexedEntry<u32> for Entry {
    fn elements(&self) -> &[u32] {
        &self.0
    }
}

const UNIVERSE_SIZE: u32 = 500;
const ENTRY_COUNT: usize = 5_000;

fn random_sets(count: usize, universe_size: u32, max_elements: usize, seed: u64) -> Vec<Vec<u32>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut all: Vec<u32> = (0..universe_size).collect();

    (0..count)
        .map(|_| {
            let k = rng.random_range(1..=max_elements);
            all.shuffle(&mut rng);
            let mut set: Vec<u32> = all[..k].to_vec();
            set.sort_unstable();
            set
        })
        .collect()
}

fn bench_backend(c: &mut Criterion, label: &str, backend: Backend) {
    let universe = Arc::new(Universe::new(0u32..UNIVERSE_SIZE).unwrap());
    let sets = random_sets(ENTRY_COUNT, UNIVERSE_SIZE, 30, 42);

    let mut index = Config::new(Arc::clone(&universe))
        .backend(backend)
        .permutation_count(4)
        .build::<Entry>()
        .unwrap();

    for set in &sets {
        index.add(Entry(set.clone())).unwrap();
    }

    let queries = random_sets(200, UNIVERSE_SIZE, 30, 1337);
    let mut rng = ChaCha8Rng::seed_from_u64(99);

    c.bench_function(&format!("{label} num_supersets"), |b| {
        b.iter(|| {
            let q = queries.choose(&mut rng).unwrap();
            index.num_supersets(q).unwrap()
        });
    });

    c.bench_function(&format!("{label} num_subsets"), |b| {
        b.iter(|| {
            let q = queries.choose(&mut rng).unwrap();
            index.num_subsets(q).unwrap()
        });
    });
}

fn simple_backend(c: &mut Criterion) {
    bench_backend(c, "simple", Backend::Simple);
}

fn multi_backend(c: &mut Criterion) {
    bench_backend(c, "multi", Backend::Multi);
}

fn trie_backend(c: &mut Criterion) {
    bench_backend(c, "trie", Backend::Trie);
}

criterion_group!(benches, simple_backend, multi_backend, trie_backend);
criterion_main!(benches);
