// Copyright (c) 2024-present, the containment-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! An in-memory set containment index.
//!
//! Given a universe of elements `U` and a collection of entries, each
//! carrying its own element set `S(E) ⊆ U`, this crate answers:
//!
//! - `subsets(Q)`: every entry `E` with `S(E) ⊆ Q`
//! - `supersets(Q)`: every entry `E` with `S(E) ⊇ Q`
//! - `contains(E)`: is an entry equal to `E` indexed?
//!
//! Entries are bucketed by element set: two entries with the same `S(E)`
//! share a bucket but remain distinct (`size()` counts entries, not
//! buckets).
//!
//! Three backends make different storage/query tradeoffs over the same
//! contract ([`ContainmentIndex`]):
//!
//! - [`index::SimpleIndex`] — one permutation-ordered set of bit-vector
//!   fingerprints.
//! - [`index::MultiPermutationIndex`] — `k` orderings plus a planner that
//!   picks the tightest one per query.
//! - [`index::TrieIndex`] — a prefix tree over sorted element sequences,
//!   good when entries share a lot of structure.
//!
//! [`AnyIndex`] closes over all three behind one type, and [`Config`] builds
//! one from a handful of options. [`BufferedIndex`] wraps any backend for
//! concurrent use: batched background writes, many concurrent readers.
//!
//! # Example
//!
//! ```
//! use containment_index::{Backend, Config, ContainmentIndex, IndexedEntry, Universe};
//! use std::sync::Arc;
//!
//! #[derive(Clone, PartialEq, Eq)]
//! struct Tags(Vec<u32>);
//!
//! impl IndexedEntry<u32> for Tags {
//!     fn elements(&self) -> &[u32] {
//!         &self.0
//!     }
//! }
//!
//! let universe = Arc::new(Universe::new(0u32..100)?);
//! let mut index = Config::new(universe).backend(Backend::Trie).build::<Tags>()?;
//!
//! index.add(Tags(vec![1, 2]))?;
//! index.add(Tags(vec![1, 2, 3]))?;
//!
//! let subsets: Vec<_> = index.subsets(&[1, 2, 3])?.collect();
//! assert_eq!(subsets.len(), 2);
//!
//! assert_eq!(index.num_supersets(&[1, 2, 3])?, 1);
//! # Ok::<(), containment_index::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs, clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]
#![allow(clippy::module_name_repetitions)]

pub mod bitvec;
mod buffered;
mod config;
pub mod error;
pub mod index;
mod lazy;
pub mod order_stat_tree;
mod stop_signal;
pub mod universe;

pub use buffered::{BufferedIndex, BufferedReadGuard};
pub use config::{Backend, Config};
pub use error::{Error, Result};
pub use index::{AnyIndex, ContainmentIndex, IndexedEntry, MultiPermutationIndex, SimpleIndex, TrieIndex};
pub use universe::{Permutation, PermutationFactory, Universe};
