// Copyright (c) 2024-present, the containment-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Index configuration builder.

use crate::buffered::BufferedIndex;
use crate::error::{Error, Result};
use crate::index::{AnyIndex, IndexedEntry, MultiPermutationIndex, SimpleIndex, TrieIndex};
use crate::universe::Universe;
use std::hash::Hash;
use std::sync::Arc;

/// Which raw backend to build.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Single-permutation bitset index. Cheapest to build and query when
    /// queries and entries share little structure across permutations.
    Simple,

    /// Multi-permutation bitset index with a query planner. Costs `k×` the
    /// fingerprint storage of `Simple` in exchange for tighter candidate
    /// ranges on average.
    Multi,

    /// Unlimited-branching trie over sorted element sequences. Favors
    /// workloads with highly overlapping element sets, since shared
    /// prefixes are stored once.
    Trie,
}

const DEFAULT_SEED: u64 = 0x5EED_u64;
const DEFAULT_PERMUTATION_COUNT: usize = 4;
const DEFAULT_FLUSH_THRESHOLD: usize = 64;

/// Builder for a containment index over a fixed universe.
///
/// ```
/// use containment_index::{Backend, Config, ContainmentIndex, IndexedEntry, Universe};
/// use std::sync::Arc;
///
/// #[derive(Clone, PartialEq, Eq)]
/// struct Tags(Vec<u32>);
///
/// impl IndexedEntry<u32> for Tags {
///     fn elements(&self) -> &[u32] {
///         &self.0
///     }
/// }
///
/// let universe = Arc::new(Universe::new(0u32..100).unwrap());
/// let mut index = Config::new(universe)
///     .backend(Backend::Multi)
///     .permutation_count(8)
///     .seed(42)
///     .build::<Tags>()
///     .unwrap();
///
/// index.add(Tags(vec![1, 2])).unwrap();
/// assert_eq!(index.num_subsets(&[1, 2, 3]).unwrap(), 1);
/// ```
#[derive(Clone)]
pub struct Config<T> {
    universe: Arc<Universe<T>>,
    backend: Backend,
    seed: u64,
    permutation_count: usize,
    flush_threshold: usize,
}

impl<T> Config<T>
where
    T: Clone + Eq + Hash + Ord,
{
    /// Starts a builder over `universe`, defaulting to [`Backend::Simple`].
    #[must_use]
    pub fn new(universe: Arc<Universe<T>>) -> Self {
        Self {
            universe,
            backend: Backend::Simple,
            seed: DEFAULT_SEED,
            permutation_count: DEFAULT_PERMUTATION_COUNT,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }

    /// Sets which raw backend to build.
    #[must_use]
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the seed driving [`Backend::Multi`]'s pseudo-random permutations.
    /// Ignored by the other backends.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets `k`, the number of permutations [`Backend::Multi`] maintains
    /// (including the canonical one). Ignored by the other backends. Must
    /// be at least 1; invalid values are rejected at [`Config::build`] time.
    #[must_use]
    pub fn permutation_count(mut self, k: usize) -> Self {
        self.permutation_count = k;
        self
    }

    /// Sets the flush threshold used by [`Config::build_buffered`].
    #[must_use]
    pub fn flush_threshold(mut self, n: usize) -> Self {
        self.flush_threshold = n.max(1);
        self
    }

    /// Builds the configured raw backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUniverse`] if `backend` is [`Backend::Multi`]
    /// and `permutation_count()` is 0.
    pub fn build<E: IndexedEntry<T>>(&self) -> Result<AnyIndex<T, E>> {
        Ok(match self.backend {
            Backend::Simple => AnyIndex::Simple(SimpleIndex::new(Arc::clone(&self.universe))),
            Backend::Multi => {
                if self.permutation_count == 0 {
                    return Err(Error::InvalidUniverse(
                        "permutation_count must be at least 1".into(),
                    ));
                }
                AnyIndex::Multi(MultiPermutationIndex::new(
                    Arc::clone(&self.universe),
                    self.seed,
                    self.permutation_count,
                )?)
            }
            Backend::Trie => AnyIndex::Trie(TrieIndex::new(Arc::clone(&self.universe))),
        })
    }

    /// Builds the configured raw backend wrapped in [`BufferedIndex`] for
    /// concurrent use.
    ///
    /// # Errors
    ///
    /// See [`Config::build`].
    pub fn build_buffered<E>(&self) -> Result<BufferedIndex<T, E, AnyIndex<T, E>>>
    where
        E: IndexedEntry<T> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let inner = self.build::<E>()?;
        Ok(BufferedIndex::new(inner, self.flush_threshold))
    }
}
