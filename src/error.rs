// Copyright (c) 2024-present, the containment-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// Represents errors that can occur in the containment index
#[derive(Debug)]
pub enum Error {
    /// Construction-time error: universe size < 1, a permutation's image is
    /// not exactly `{0..n-1}`, or permutations disagree on the universe.
    InvalidUniverse(String),

    /// An entry's element set contains an element outside the universe.
    InvalidElement,

    /// A UBT entry's element set exceeds `MAX_ELEMENTS`.
    TooLargeEntry(usize),

    /// An internal invariant was violated. These are fatal: the index must
    /// not be used after one is observed.
    InvariantViolation(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUniverse(msg) => write!(f, "invalid universe: {msg}"),
            Self::InvalidElement => write!(f, "element not in universe"),
            Self::TooLargeEntry(n) => write!(f, "entry has {n} elements, exceeds MAX_ELEMENTS"),
            Self::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(value: std::sync::PoisonError<T>) -> Self {
        Self::InvariantViolation(format!("lock poisoned: {value}"))
    }
}

/// Containment index result
pub type Result<T> = std::result::Result<T, Error>;
