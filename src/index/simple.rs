// Copyright (c) 2024-present, the containment-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Single-permutation bitset index — component D.
//!
//! One ordered set of fingerprints (component C) plus one bucket map
//! (fingerprint → entries). Queries use range narrowing:
//! the permutation embeds the subset partial order into an integer chain,
//! so a contiguous range of the ordered set is a sound (but not complete)
//! candidate set, completed by the bit-test filter.

use super::{ContainmentIndex, IndexedEntry};
use crate::bitvec::BitVector;
use crate::error::Result;
use crate::lazy::FlatMapLazy;
use crate::order_stat_tree::OrderStatTree;
use crate::universe::{Permutation, Universe};
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::Arc;

/// A containment index backed by a single permutation-ordered set of
/// fingerprints (component D).
pub struct SimpleIndex<T, E> {
    universe: Arc<Universe<T>>,
    permutation: Permutation,
    tree: OrderStatTree<BitVector>,
    buckets: FxHashMap<BitVector, Vec<E>>,
    size: usize,
}

impl<T, E> SimpleIndex<T, E>
where
    T: Clone + Eq + Hash,
    E: IndexedEntry<T>,
{
    /// Builds an index over `universe` using the canonical (identity)
    /// permutation.
    #[must_use]
    pub fn new(universe: Arc<Universe<T>>) -> Self {
        let permutation = Permutation::identity(universe.len());
        Self::with_permutation(universe, permutation)
    }

    /// Builds an index over `universe` using an explicit permutation as
    /// `π₀`.
    #[must_use]
    pub fn with_permutation(universe: Arc<Universe<T>>, permutation: Permutation) -> Self {
        Self {
            universe,
            permutation,
            tree: OrderStatTree::new(),
            buckets: FxHashMap::default(),
            size: 0,
        }
    }

    fn fingerprint(&self, elements: &[T]) -> Result<BitVector> {
        BitVector::encode(&self.permutation, &self.universe, elements)
    }

    /// Number of distinct element sets currently indexed, i.e. the number of
    /// occupied buckets. Diagnostic only; `size()` (entry count) is the
    /// crate-wide definition used everywhere else.
    #[must_use]
    pub fn num_distinct_fingerprints(&self) -> usize {
        self.buckets.len()
    }
}

impl<T, E> ContainmentIndex<T, E> for SimpleIndex<T, E>
where
    T: Clone + Eq + Hash,
    E: IndexedEntry<T>,
{
    fn add(&mut self, entry: E) -> Result<bool> {
        self.universe.validate(entry.elements())?;
        let fp = self.fingerprint(entry.elements())?;

        let is_new_bucket = !self.buckets.contains_key(&fp);
        let bucket = self.buckets.entry(fp.clone()).or_default();
        if bucket.contains(&entry) {
            return Ok(false);
        }

        bucket.push(entry);
        self.size += 1;
        if is_new_bucket {
            self.tree.add(fp);
        }
        Ok(true)
    }

    fn remove(&mut self, entry: &E) -> bool {
        let Ok(fp) = self.fingerprint(entry.elements()) else {
            return false;
        };
        let Some(bucket) = self.buckets.get_mut(&fp) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|e| e == entry) else {
            return false;
        };

        bucket.remove(pos);
        self.size -= 1;
        if bucket.is_empty() {
            self.buckets.remove(&fp);
            self.tree.remove(&fp);
        }
        true
    }

    fn contains(&self, entry: &E) -> bool {
        let Ok(fp) = self.fingerprint(entry.elements()) else {
            return false;
        };
        self.buckets.get(&fp).is_some_and(|b| b.contains(entry))
    }

    fn size(&self) -> usize {
        self.size
    }

    fn iterate_all(&self) -> Box<dyn Iterator<Item = E> + '_> {
        Box::new(self.buckets.values().flat_map(|v| v.iter()).cloned())
    }

    fn subsets(&self, query: &[T]) -> Result<Box<dyn Iterator<Item = E> + '_>> {
        self.universe.validate(query)?;
        let q = self.fingerprint(query)?;
        let candidates = self.tree.iter_le(&q).filter(move |c| c.is_subset_of(&q));
        let iter = FlatMapLazy::new(candidates, move |fp| {
            self.buckets.get(&fp).into_iter().flat_map(|v| v.iter()).cloned()
        });
        Ok(Box::new(iter))
    }

    fn supersets(&self, query: &[T]) -> Result<Box<dyn Iterator<Item = E> + '_>> {
        self.universe.validate(query)?;
        let q = self.fingerprint(query)?;
        let candidates = self
            .tree
            .iter_ge(&q)
            .filter(move |c| q.is_subset_of(c));
        let iter = FlatMapLazy::new(candidates, move |fp| {
            self.buckets.get(&fp).into_iter().flat_map(|v| v.iter()).cloned()
        });
        Ok(Box::new(iter))
    }

    fn num_subsets(&self, query: &[T]) -> Result<usize> {
        self.universe.validate(query)?;
        let q = self.fingerprint(query)?;
        Ok(self
            .tree
            .iter_le(&q)
            .filter(|c| c.is_subset_of(&q))
            .map(|fp| self.buckets.get(&fp).map_or(0, Vec::len))
            .sum())
    }

    fn num_supersets(&self, query: &[T]) -> Result<usize> {
        self.universe.validate(query)?;
        let q = self.fingerprint(query)?;
        Ok(self
            .tree
            .iter_ge(&q)
            .filter(|c| q.is_subset_of(c))
            .map(|fp| self.buckets.get(&fp).map_or(0, Vec::len))
            .sum())
    }
}
