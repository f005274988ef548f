// Copyright (c) 2024-present, the containment-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Multi-permutation bitset index and query planner — component E.
//!
//! `k` permutations share one bucket map keyed by the canonical fingerprint,
//! so `contains`/`iterateAll`/bucketing coincide with the simple index. Each
//! permutation additionally maintains its own ordered set of fingerprints
//! *encoded under that permutation* — one fingerprint per permutation,
//! rather than reinterpreting bit positions of a single shared fingerprint —
//! plus a lookup back to the canonical fingerprint the bucket map is keyed
//! by.

use super::{ContainmentIndex, IndexedEntry};
use crate::bitvec::BitVector;
use crate::error::Result;
use crate::lazy::FlatMapLazy;
use crate::order_stat_tree::OrderStatTree;
use crate::universe::{Permutation, PermutationFactory, Universe};
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::Arc;

/// One permutation's view: fingerprints encoded under that permutation,
/// ordered (component C), plus the map back to the canonical fingerprint
/// each one corresponds to.
struct PermutationOrdering {
    tree: OrderStatTree<BitVector>,
    to_canonical: FxHashMap<BitVector, BitVector>,
}

impl PermutationOrdering {
    fn new() -> Self {
        Self {
            tree: OrderStatTree::new(),
            to_canonical: FxHashMap::default(),
        }
    }
}

/// Chooses the permutation index minimizing `candidate_counts`, the
/// narrowed-range size each permutation's ordering would produce for a
/// query. Ties favor the lowest index.
///
/// # Panics
///
/// Panics if `candidate_counts` is empty; every index is constructed with
/// at least one permutation (the canonical one), so this never happens in
/// practice.
#[must_use]
pub fn pick_permutation(candidate_counts: &[usize]) -> usize {
    candidate_counts
        .iter()
        .enumerate()
        .min_by_key(|&(_, count)| count)
        .map(|(j, _)| j)
        .expect("at least one permutation")
}

/// A containment index backed by `k` permutation-ordered sets of
/// fingerprints, with a query planner that picks the tightest one per query
/// (component E).
pub struct MultiPermutationIndex<T, E> {
    universe: Arc<Universe<T>>,
    permutations: Vec<Permutation>,
    orderings: Vec<PermutationOrdering>,
    buckets: FxHashMap<BitVector, Vec<E>>,
    size: usize,
}

impl<T, E> MultiPermutationIndex<T, E>
where
    T: Clone + Eq + Hash,
    E: IndexedEntry<T>,
{
    /// Builds an index with `k` permutations over `universe`: the canonical
    /// permutation plus `k - 1` seeded pseudo-random shuffles.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidUniverse`] if `k == 0`.
    pub fn new(universe: Arc<Universe<T>>, seed: u64, k: usize) -> Result<Self> {
        let permutations = PermutationFactory::build(universe.len(), seed, k)?;
        Ok(Self::with_permutations(universe, permutations))
    }

    /// Builds an index from `k` explicit permutations `π₀..π_{k−1}`.
    #[must_use]
    pub fn with_permutations(universe: Arc<Universe<T>>, permutations: Vec<Permutation>) -> Self {
        let orderings = permutations.iter().map(|_| PermutationOrdering::new()).collect();
        Self {
            universe,
            permutations,
            orderings,
            buckets: FxHashMap::default(),
            size: 0,
        }
    }

    fn canonical_fingerprint(&self, elements: &[T]) -> Result<BitVector> {
        let canonical = self
            .permutations
            .first()
            .expect("at least one permutation (the canonical one) always exists");
        BitVector::encode(canonical, &self.universe, elements)
    }

    fn fingerprints(&self, elements: &[T]) -> Result<Vec<BitVector>> {
        self.permutations
            .iter()
            .map(|p| BitVector::encode(p, &self.universe, elements))
            .collect()
    }

    /// Number of distinct element sets currently indexed. Diagnostic only;
    /// see [`crate::index::simple::SimpleIndex::num_distinct_fingerprints`].
    #[must_use]
    pub fn num_distinct_fingerprints(&self) -> usize {
        self.buckets.len()
    }
}

impl<T, E> ContainmentIndex<T, E> for MultiPermutationIndex<T, E>
where
    T: Clone + Eq + Hash,
    E: IndexedEntry<T>,
{
    fn add(&mut self, entry: E) -> Result<bool> {
        self.universe.validate(entry.elements())?;
        let fps = self.fingerprints(entry.elements())?;
        let canonical = fps
            .first()
            .expect("fingerprints() returns one entry per permutation")
            .clone();

        let is_new_bucket = !self.buckets.contains_key(&canonical);
        let bucket = self.buckets.entry(canonical.clone()).or_default();
        if bucket.contains(&entry) {
            return Ok(false);
        }

        bucket.push(entry);
        self.size += 1;

        if is_new_bucket {
            for (ordering, fp) in self.orderings.iter_mut().zip(fps) {
                ordering.tree.add(fp.clone());
                ordering.to_canonical.insert(fp, canonical.clone());
            }
        }
        Ok(true)
    }

    fn remove(&mut self, entry: &E) -> bool {
        let Ok(fps) = self.fingerprints(entry.elements()) else {
            return false;
        };
        let canonical = fps
            .first()
            .expect("fingerprints() returns one entry per permutation");

        let Some(bucket) = self.buckets.get_mut(canonical) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|e| e == entry) else {
            return false;
        };

        bucket.remove(pos);
        self.size -= 1;

        if bucket.is_empty() {
            self.buckets.remove(canonical);
            for (ordering, fp) in self.orderings.iter_mut().zip(fps) {
                ordering.tree.remove(&fp);
                ordering.to_canonical.remove(&fp);
            }
        }
        true
    }

    fn contains(&self, entry: &E) -> bool {
        let Ok(canonical) = self.canonical_fingerprint(entry.elements()) else {
            return false;
        };
        self.buckets.get(&canonical).is_some_and(|b| b.contains(entry))
    }

    fn size(&self) -> usize {
        self.size
    }

    fn iterate_all(&self) -> Box<dyn Iterator<Item = E> + '_> {
        Box::new(self.buckets.values().flat_map(|v| v.iter()).cloned())
    }

    fn subsets(&self, query: &[T]) -> Result<Box<dyn Iterator<Item = E> + '_>> {
        self.universe.validate(query)?;
        let qs = self.fingerprints(query)?;
        let counts: Vec<usize> = self
            .orderings
            .iter()
            .zip(&qs)
            .map(|(o, q)| o.tree.count_le(q))
            .collect();
        let j = pick_permutation(&counts);
        let q = qs
            .get(j)
            .expect("pick_permutation returns an index within qs's bounds")
            .clone();
        let ordering = self
            .orderings
            .get(j)
            .expect("pick_permutation returns an index within orderings's bounds");

        let candidates = ordering.tree.iter_le(&q).filter(move |c| c.is_subset_of(&q));
        let iter = FlatMapLazy::new(candidates, move |order_key| {
            let bucket: &[E] = ordering
                .to_canonical
                .get(&order_key)
                .and_then(|canon| self.buckets.get(canon))
                .map_or(&[][..], Vec::as_slice);
            bucket.iter().cloned()
        });
        Ok(Box::new(iter))
    }

    fn supersets(&self, query: &[T]) -> Result<Box<dyn Iterator<Item = E> + '_>> {
        self.universe.validate(query)?;
        let qs = self.fingerprints(query)?;
        let counts: Vec<usize> = self
            .orderings
            .iter()
            .zip(&qs)
            .map(|(o, q)| o.tree.count_ge(q))
            .collect();
        let j = pick_permutation(&counts);
        let q = qs
            .get(j)
            .expect("pick_permutation returns an index within qs's bounds")
            .clone();
        let ordering = self
            .orderings
            .get(j)
            .expect("pick_permutation returns an index within orderings's bounds");

        let candidates = ordering.tree.iter_ge(&q).filter(move |c| q.is_subset_of(c));
        let iter = FlatMapLazy::new(candidates, move |order_key| {
            let bucket: &[E] = ordering
                .to_canonical
                .get(&order_key)
                .and_then(|canon| self.buckets.get(canon))
                .map_or(&[][..], Vec::as_slice);
            bucket.iter().cloned()
        });
        Ok(Box::new(iter))
    }

    fn num_subsets(&self, query: &[T]) -> Result<usize> {
        self.universe.validate(query)?;
        let qs = self.fingerprints(query)?;
        let counts: Vec<usize> = self
            .orderings
            .iter()
            .zip(&qs)
            .map(|(o, q)| o.tree.count_le(q))
            .collect();
        let j = pick_permutation(&counts);
        let q = qs
            .get(j)
            .expect("pick_permutation returns an index within qs's bounds");
        let ordering = self
            .orderings
            .get(j)
            .expect("pick_permutation returns an index within orderings's bounds");

        Ok(ordering
            .tree
            .iter_le(q)
            .filter(|c| c.is_subset_of(q))
            .map(|fp| {
                ordering
                    .to_canonical
                    .get(&fp)
                    .and_then(|canon| self.buckets.get(canon))
                    .map_or(0, Vec::len)
            })
            .sum())
    }

    fn num_supersets(&self, query: &[T]) -> Result<usize> {
        self.universe.validate(query)?;
        let qs = self.fingerprints(query)?;
        let counts: Vec<usize> = self
            .orderings
            .iter()
            .zip(&qs)
            .map(|(o, q)| o.tree.count_ge(q))
            .collect();
        let j = pick_permutation(&counts);
        let q = qs
            .get(j)
            .expect("pick_permutation returns an index within qs's bounds");
        let ordering = self
            .orderings
            .get(j)
            .expect("pick_permutation returns an index within orderings's bounds");

        Ok(ordering
            .tree
            .iter_ge(q)
            .filter(|c| q.is_subset_of(c))
            .map(|fp| {
                ordering
                    .to_canonical
                    .get(&fp)
                    .and_then(|canon| self.buckets.get(canon))
                    .map_or(0, Vec::len)
            })
            .sum())
    }
}
