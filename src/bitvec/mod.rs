// Copyright (c) 2024-present, the containment-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Packed bit vector over a fixed-size universe — component B.
//!
//! Two interchangeable storage representations are provided, [`DenseBits`]
//! and [`SparseBits`], unified behind [`BitVector`].

mod dense;
mod sparse;

pub use dense::DenseBits;
pub use sparse::SparseBits;

use crate::error::{Error, Result};
use crate::universe::{Permutation, Universe};
use std::cmp::Ordering;
use std::hash::Hash;

/// Word width used for dense block storage. Comparisons here stay in
/// unsigned arithmetic, so there is no signed-shift overflow ceiling to
/// respect.
pub(crate) const WORD_BITS: u32 = 64;

pub(crate) fn n_blocks(n: usize) -> usize {
    n.div_ceil(WORD_BITS as usize)
}

/// A fixed-width vector of `n` bits, encoding the fingerprint of some
/// element set under a particular permutation.
///
/// The vector itself is permutation-neutral storage: once encoded,
/// `BitVector`'s own bit indices already reflect whichever permutation
/// produced it, so [`BitVector::cmp`] never needs to take a permutation
/// argument — the permutation is implicit in how the vector's bits were
/// assigned at encoding time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BitVector {
    /// Word-array storage, one `u64` block per 64 bits of the universe.
    Dense(DenseBits),
    /// Sparse block-map storage, for fingerprints with few set bits.
    Sparse(SparseBits),
}

impl BitVector {
    /// Builds an empty dense-backed vector over a universe of `n` bits.
    #[must_use]
    pub fn dense_with_capacity(n: usize) -> Self {
        Self::Dense(DenseBits::with_capacity(n))
    }

    /// Builds an empty sparse-backed vector over a universe of `n` bits.
    #[must_use]
    pub fn sparse_with_capacity(n: usize) -> Self {
        Self::Sparse(SparseBits::with_capacity(n))
    }

    /// The universe size this vector was built over.
    #[must_use]
    pub fn n_bits(&self) -> usize {
        match self {
            Self::Dense(d) => d.n_bits(),
            Self::Sparse(s) => s.n_bits(),
        }
    }

    /// Sets (or clears) bit `i`.
    pub fn set(&mut self, i: u32, val: bool) {
        match self {
            Self::Dense(d) => d.set(i, val),
            Self::Sparse(s) => s.set(i, val),
        }
    }

    /// Reads bit `i`.
    #[must_use]
    pub fn get(&self, i: u32) -> bool {
        match self {
            Self::Dense(d) => d.get(i),
            Self::Sparse(s) => s.get(i),
        }
    }

    /// Number of set bits.
    #[must_use]
    pub fn popcount(&self) -> u32 {
        match self {
            Self::Dense(d) => d.popcount(),
            Self::Sparse(s) => s.popcount(),
        }
    }

    fn n_blocks(&self) -> u32 {
        match self {
            Self::Dense(d) => d.n_blocks(),
            Self::Sparse(s) => s.n_blocks(),
        }
    }

    fn block(&self, idx: u32) -> u64 {
        match self {
            Self::Dense(d) => d.block(idx),
            Self::Sparse(s) => s.block(idx),
        }
    }

    /// `true` iff every bit set in `self` is also set in `other`
    /// (word-wise AND-and-compare).
    #[must_use]
    pub fn is_subset_of(&self, other: &BitVector) -> bool {
        let blocks = self.n_blocks().max(other.n_blocks());
        (0..blocks).all(|b| self.block(b) & !other.block(b) == 0)
    }

    /// Encodes an element set as a fingerprint under the given permutation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidElement`] if `set` contains an element not in
    /// `universe`.
    pub fn encode<T: Clone + Eq + Hash>(
        permutation: &Permutation,
        universe: &Universe<T>,
        set: &[T],
    ) -> Result<Self> {
        let mut bv = Self::dense_with_capacity(universe.len());
        for e in set {
            let idx = universe.index_of(e).ok_or(Error::InvalidElement)?;
            bv.set(permutation.bit_of(idx), true);
        }
        Ok(bv)
    }
}

impl PartialOrd for BitVector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BitVector {
    /// Lexicographic integer comparison: the highest block is compared
    /// first, ties cascading down to lower blocks.
    fn cmp(&self, other: &Self) -> Ordering {
        let blocks = self.n_blocks().max(other.n_blocks());
        for b in (0..blocks).rev() {
            let ord = self.block(b).cmp(&other.block(b));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}
