//! `N` reader threads issuing random queries concurrently with one writer
//! thread issuing adds and removes, quiesced and checked against the
//! writer's own accounting. Run over a short, CI-friendly duration.

use containment_index::{Config, ContainmentIndex, IndexedEntry, Universe};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use test_log::test;

#[derive(Clone, PartialEq, Eq)]
struct Entry {
    id: u32,
    elements: Vec<u32>,
}

impl IndexedEntry<u32> for Entry {
    fn elements(&self) -> &[u32] {
        &self.elements
    }
}

const UNIVERSE_SIZE: u32 = 300;
const READERS: usize = 30;
const RUN_TIME: Duration = Duration::from_millis(800);

#[test]
fn n_readers_and_one_writer_never_observe_inconsistent_entries() {
    let universe = Arc::new(Universe::new(0u32..UNIVERSE_SIZE).unwrap());
    let wrapped = Arc::new(
        Config::new(universe)
            .flush_threshold(16)
            .build_buffered::<Entry>()
            .unwrap(),
    );

    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let wrapped = Arc::clone(&wrapped);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            let mut all: Vec<u32> = (0..UNIVERSE_SIZE).collect();
            let mut next_id = 0u32;
            let mut present: HashMap<u32, Entry> = HashMap::new();

            while !stop.load(Ordering::Relaxed) {
                let remove_existing = !present.is_empty() && rng.random_bool(0.3);
                if remove_existing {
                    let idx = rng.random_range(0..present.len());
                    let id = *present.keys().nth(idx).expect("index within bounds");
                    let entry = present.get(&id).expect("id taken from this map").clone();
                    let removed = wrapped.remove(&entry).unwrap();
                    assert!(
                        removed,
                        "remove() returned false for entry {id} the writer still tracks as present"
                    );
                    present.remove(&id);
                } else {
                    all.shuffle(&mut rng);
                    let k = 1 + (next_id as usize % 10);
                    let mut elements = all[..k].to_vec();
                    elements.sort_unstable();
                    let entry = Entry { id: next_id, elements };
                    next_id += 1;
                    let added = wrapped.add(entry.clone()).unwrap();
                    assert!(added, "add() returned false for a never-before-seen id");
                    present.insert(entry.id, entry);
                }
            }
            present
        })
    };

    let readers: Vec<_> = (0..READERS)
        .map(|i| {
            let wrapped = Arc::clone(&wrapped);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut rng = ChaCha8Rng::seed_from_u64(100 + i as u64);
                let mut all: Vec<u32> = (0..UNIVERSE_SIZE).collect();
                let mut consistent = true;

                while !stop.load(Ordering::Relaxed) {
                    all.shuffle(&mut rng);
                    let query = &all[..5];

                    let guard = wrapped.read_lock().unwrap();
                    // Every entry the reader sees as a superset of `query`
                    // must truly be one -- no partial/torn entry is ever
                    // visible, whether still in the add-buffer or already
                    // flushed.
                    for e in guard.supersets(query).unwrap() {
                        let q: std::collections::HashSet<&u32> = query.iter().collect();
                        let s: std::collections::HashSet<&u32> = e.elements().iter().collect();
                        if !q.is_subset(&s) {
                            consistent = false;
                        }
                    }
                }
                consistent
            })
        })
        .collect();

    let deadline = Instant::now() + RUN_TIME;
    while Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    stop.store(true, Ordering::Relaxed);

    let present = writer.join().expect("writer thread panicked");
    assert!(!present.is_empty(), "writer made no net progress");

    for (i, r) in readers.into_iter().enumerate() {
        assert!(r.join().expect("reader thread panicked"), "reader {i} observed inconsistency");
    }

    assert_eq!(wrapped.size().unwrap(), present.len());
    let guard = wrapped.read_lock().unwrap();
    let final_ids: std::collections::HashSet<u32> =
        guard.iterate_all().map(|e| e.id).collect();
    let expected_ids: std::collections::HashSet<u32> = present.keys().copied().collect();
    assert_eq!(final_ids, expected_ids);
}
