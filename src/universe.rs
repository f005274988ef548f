// Copyright (c) 2024-present, the containment-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The element domain `U` and the permutations bijecting it onto `{0..n-1}`.

use crate::error::{Error, Result};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::Arc;

/// The fixed, finite set elements are drawn from.
///
/// `Universe` assigns every element a stable `u32` index in `0..n`; this
/// index is what permutations (and, downstream, bit vectors) actually
/// operate on. Construction is the only place element identity is resolved;
/// everything above this layer works in terms of indices.
#[derive(Debug)]
pub struct Universe<T> {
    elements: Vec<T>,
    index_of: FxHashMap<T, u32>,
}

impl<T: Clone + Eq + Hash> Universe<T> {
    /// Builds a universe from an iteration order. The order given here is
    /// also the order the canonical permutation uses, so it is deterministic
    /// in the caller's iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUniverse`] if `elements` is empty or contains
    /// duplicates.
    pub fn new(elements: impl IntoIterator<Item = T>) -> Result<Self> {
        let elements: Vec<T> = elements.into_iter().collect();

        if elements.is_empty() {
            return Err(Error::InvalidUniverse("universe must be non-empty".into()));
        }

        let mut index_of = FxHashMap::default();
        index_of.reserve(elements.len());

        for (idx, e) in elements.iter().enumerate() {
            let idx = u32::try_from(idx)
                .map_err(|_| Error::InvalidUniverse("universe too large".into()))?;

            if index_of.insert(e.clone(), idx).is_some() {
                return Err(Error::InvalidUniverse(
                    "universe elements must be distinct".into(),
                ));
            }
        }

        Ok(Self {
            elements,
            index_of,
        })
    }

    /// Number of elements in the universe (`n`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Resolves an element to its stable universe index, or `None` if it is
    /// not a member.
    #[must_use]
    pub fn index_of(&self, element: &T) -> Option<u32> {
        self.index_of.get(element).copied()
    }

    /// Resolves a universe index back to its element. Panics if `idx >= len()`.
    #[must_use]
    pub fn element_at(&self, idx: u32) -> &T {
        self.elements
            .get(idx as usize)
            .expect("idx is a previously resolved universe index")
    }

    /// Validates that every element of `set` is a member of this universe.
    pub fn validate(&self, set: &[T]) -> Result<()> {
        for e in set {
            if !self.index_of.contains_key(e) {
                return Err(Error::InvalidElement);
            }
        }
        Ok(())
    }
}

/// A bijection `U -> {0..n-1}`.
///
/// `image[i]` is the bit position assigned to the universe element whose
/// stable index is `i`. The canonical permutation (`id()`) is the identity;
/// additional permutations are pseudo-random shuffles of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permutation {
    /// universe-index -> bit-position
    image: Arc<[u32]>,
}

impl Permutation {
    /// The canonical permutation `π₀`: identity on `{0..n-1}`.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self {
            image: (0..n as u32).collect(),
        }
    }

    /// Builds a permutation from an explicit image, validating that it is a
    /// bijection onto `{0..n-1}`.
    pub fn from_image(image: Vec<u32>) -> Result<Self> {
        let n = image.len();
        let mut seen = vec![false; n];

        for &bit in &image {
            let bit = bit as usize;
            let Some(slot) = seen.get_mut(bit) else {
                return Err(Error::InvalidUniverse(
                    "permutation image is not a bijection onto 0..n-1".into(),
                ));
            };
            if std::mem::replace(slot, true) {
                return Err(Error::InvalidUniverse(
                    "permutation image is not a bijection onto 0..n-1".into(),
                ));
            }
        }

        Ok(Self {
            image: image.into(),
        })
    }

    /// The bit position assigned to universe index `i`.
    #[must_use]
    pub fn bit_of(&self, universe_index: u32) -> u32 {
        *self
            .image
            .get(universe_index as usize)
            .expect("universe_index is a previously resolved universe index")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.image.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }
}

/// Produces `k` independent permutations over a universe of size `n`: the
/// canonical (identity) permutation followed by `k - 1` pseudo-random
/// shuffles driven by a seed.
pub struct PermutationFactory;

impl PermutationFactory {
    /// Builds `k` permutations. `k` must be at least 1 (the canonical one).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUniverse`] if `k == 0`.
    pub fn build(n: usize, seed: u64, k: usize) -> Result<Vec<Permutation>> {
        if k == 0 {
            return Err(Error::InvalidUniverse(
                "at least one permutation (the canonical one) is required".into(),
            ));
        }

        let mut out = Vec::with_capacity(k);
        out.push(Permutation::identity(n));

        for j in 1..k {
            // Each additional permutation gets its own independent stream,
            // derived from the caller's seed so the whole factory is
            // reproducible for a given (seed, k).
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(j as u64));
            let mut image: Vec<u32> = (0..n as u32).collect();
            image.shuffle(&mut rng);
            out.push(Permutation { image: image.into() });
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_rejects_empty() {
        assert!(Universe::<u32>::new(std::iter::empty()).is_err());
    }

    #[test]
    fn universe_rejects_duplicates() {
        assert!(Universe::new([1, 2, 2, 3]).is_err());
    }

    #[test]
    fn universe_round_trips_indices() {
        let u = Universe::new(['a', 'b', 'c']).unwrap();
        assert_eq!(u.index_of(&'b'), Some(1));
        assert_eq!(u.element_at(2), &'c');
        assert_eq!(u.index_of(&'z'), None);
    }

    #[test]
    fn identity_permutation_is_noop() {
        let p = Permutation::identity(5);
        for i in 0..5 {
            assert_eq!(p.bit_of(i), i);
        }
    }

    #[test]
    fn from_image_rejects_non_bijection() {
        assert!(Permutation::from_image(vec![0, 0, 2]).is_err());
        assert!(Permutation::from_image(vec![0, 1, 3]).is_err());
        assert!(Permutation::from_image(vec![0, 1, 2]).is_ok());
    }

    #[test]
    #[allow(clippy::indexing_slicing)]
    fn factory_produces_k_permutations_deterministically() {
        let a = PermutationFactory::build(20, 42, 4).unwrap();
        let b = PermutationFactory::build(20, 42, 4).unwrap();
        assert_eq!(a.len(), 4);
        assert_eq!(a, b);
        assert!(a[0] == Permutation::identity(20));
        // Shuffled permutations should (almost certainly) differ from identity
        // and from each other.
        assert_ne!(a[1], a[0]);
        assert_ne!(a[1], a[2]);
    }

    #[test]
    fn factory_rejects_zero_permutations() {
        assert!(PermutationFactory::build(10, 1, 0).is_err());
    }
}
