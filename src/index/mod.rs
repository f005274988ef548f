// Copyright (c) 2024-present, the containment-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The index contract common to every backend, plus a closed dispatch enum
//! over the three raw backends (D, E, F).

pub mod multi;
pub mod simple;
pub mod trie;

pub use multi::MultiPermutationIndex;
pub use simple::SimpleIndex;
pub use trie::TrieIndex;

use crate::error::Result;
use std::hash::Hash;

/// The capability set an entry must provide to be indexed.
///
/// An entry is used only via its own equality and its element set, never via
/// an inheritance hierarchy. This trait is that capability set.
pub trait IndexedEntry<T>: Clone + Eq {
    /// The entry's element set, `S(E)`. Order and duplicates within the
    /// slice do not matter to any backend.
    fn elements(&self) -> &[T];
}

/// Generic containment index API, common to the simple (D),
/// multi-permutation (E) and UBT (F) backends, and to the buffered wrapper
/// (G) that layers on top of any of them.
pub trait ContainmentIndex<T, E: IndexedEntry<T>> {
    /// Inserts `entry`. Returns `true` iff it was not already present (by
    /// the entry's own equality — a second `add` of an equal entry is a
    /// no-op).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidElement`] if `entry.elements()`
    /// contains an element outside the index's universe.
    fn add(&mut self, entry: E) -> Result<bool>;

    /// Removes the entry equal to `entry`, if present. Returns `true` iff
    /// one was removed.
    fn remove(&mut self, entry: &E) -> bool;

    /// `true` iff an entry equal to `entry` is present.
    fn contains(&self, entry: &E) -> bool;

    /// Number of entries currently indexed. Counts entries, not distinct
    /// element sets.
    fn size(&self) -> usize;

    /// Lazily yields every indexed entry exactly once, in unspecified order.
    fn iterate_all(&self) -> Box<dyn Iterator<Item = E> + '_>;

    /// Lazily yields every entry `E` with `S(E) ⊆ query`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidElement`] if `query` contains an
    /// element outside the universe.
    fn subsets(&self, query: &[T]) -> Result<Box<dyn Iterator<Item = E> + '_>>;

    /// Lazily yields every entry `E` with `S(E) ⊇ query`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidElement`] if `query` contains an
    /// element outside the universe.
    fn supersets(&self, query: &[T]) -> Result<Box<dyn Iterator<Item = E> + '_>>;

    /// `subsets(query)`'s cardinality, without materializing it.
    fn num_subsets(&self, query: &[T]) -> Result<usize>;

    /// `supersets(query)`'s cardinality, without materializing it.
    fn num_supersets(&self, query: &[T]) -> Result<usize>;
}

/// One of the three raw backends, behind a single type.
///
/// A closed enum over the concrete implementations, so callers can pick a
/// backend at construction time without paying for a `dyn` trait object on
/// the query hot path. Hand-dispatched rather than `#[enum_dispatch]`-
/// generated, since `ContainmentIndex` is generic over both `T` and `E` and
/// the macro targets non-generic traits (see `DESIGN.md`).
pub enum AnyIndex<T, E: IndexedEntry<T>> {
    Simple(SimpleIndex<T, E>),
    Multi(MultiPermutationIndex<T, E>),
    Trie(TrieIndex<T, E>),
}

impl<T: Clone + Eq + Hash + Ord, E: IndexedEntry<T>> ContainmentIndex<T, E> for AnyIndex<T, E> {
    fn add(&mut self, entry: E) -> Result<bool> {
        match self {
            Self::Simple(i) => i.add(entry),
            Self::Multi(i) => i.add(entry),
            Self::Trie(i) => i.add(entry),
        }
    }

    fn remove(&mut self, entry: &E) -> bool {
        match self {
            Self::Simple(i) => i.remove(entry),
            Self::Multi(i) => i.remove(entry),
            Self::Trie(i) => i.remove(entry),
        }
    }

    fn contains(&self, entry: &E) -> bool {
        match self {
            Self::Simple(i) => i.contains(entry),
            Self::Multi(i) => i.contains(entry),
            Self::Trie(i) => i.contains(entry),
        }
    }

    fn size(&self) -> usize {
        match self {
            Self::Simple(i) => i.size(),
            Self::Multi(i) => i.size(),
            Self::Trie(i) => i.size(),
        }
    }

    fn iterate_all(&self) -> Box<dyn Iterator<Item = E> + '_> {
        match self {
            Self::Simple(i) => i.iterate_all(),
            Self::Multi(i) => i.iterate_all(),
            Self::Trie(i) => i.iterate_all(),
        }
    }

    fn subsets(&self, query: &[T]) -> Result<Box<dyn Iterator<Item = E> + '_>> {
        match self {
            Self::Simple(i) => i.subsets(query),
            Self::Multi(i) => i.subsets(query),
            Self::Trie(i) => i.subsets(query),
        }
    }

    fn supersets(&self, query: &[T]) -> Result<Box<dyn Iterator<Item = E> + '_>> {
        match self {
            Self::Simple(i) => i.supersets(query),
            Self::Multi(i) => i.supersets(query),
            Self::Trie(i) => i.supersets(query),
        }
    }

    fn num_subsets(&self, query: &[T]) -> Result<usize> {
        match self {
            Self::Simple(i) => i.num_subsets(query),
            Self::Multi(i) => i.num_subsets(query),
            Self::Trie(i) => i.num_subsets(query),
        }
    }

    fn num_supersets(&self, query: &[T]) -> Result<usize> {
        match self {
            Self::Simple(i) => i.num_supersets(query),
            Self::Multi(i) => i.num_supersets(query),
            Self::Trie(i) => i.num_supersets(query),
        }
    }
}
