// Copyright (c) 2024-present, the containment-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{n_blocks, WORD_BITS};

/// Sparse bit storage: a sorted mapping block-index -> non-zero block-word.
/// Suited to very large, very sparse universes where most words are zero.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SparseBits {
    n: usize,
    // Sorted ascending by block index; never contains a zero word.
    blocks: Vec<(u32, u64)>,
}

impl SparseBits {
    /// Builds an empty vector over `n` bits.
    #[must_use]
    pub fn with_capacity(n: usize) -> Self {
        Self {
            n,
            blocks: Vec::new(),
        }
    }

    /// The universe size this vector was built over.
    #[must_use]
    pub fn n_bits(&self) -> usize {
        self.n
    }

    fn find(&self, block: u32) -> std::result::Result<usize, usize> {
        self.blocks.binary_search_by_key(&block, |&(b, _)| b)
    }

    /// Sets (or clears) bit `i`.
    pub fn set(&mut self, i: u32, val: bool) {
        let block = i / WORD_BITS;
        let offset = i % WORD_BITS;
        let bit = 1u64 << offset;

        match self.find(block) {
            Ok(pos) => {
                let entry = self
                    .blocks
                    .get_mut(pos)
                    .expect("find() only returns Ok for positions in range");
                if val {
                    entry.1 |= bit;
                } else {
                    entry.1 &= !bit;
                    if entry.1 == 0 {
                        self.blocks.remove(pos);
                    }
                }
            }
            Err(pos) => {
                if val {
                    self.blocks.insert(pos, (block, bit));
                }
                // clearing a bit that was never set is a no-op
            }
        }
    }

    /// Reads bit `i`.
    #[must_use]
    pub fn get(&self, i: u32) -> bool {
        let block = i / WORD_BITS;
        let offset = i % WORD_BITS;
        self.find(block).ok().is_some_and(|pos| {
            let entry = self
                .blocks
                .get(pos)
                .expect("find() only returns Ok for positions in range");
            (entry.1 >> offset) & 1 == 1
        })
    }

    /// Number of set bits.
    #[must_use]
    pub fn popcount(&self) -> u32 {
        self.blocks.iter().map(|&(_, w)| w.count_ones()).sum()
    }

    /// The raw word at block `idx`, or 0 if `idx` is out of range.
    #[must_use]
    pub fn block(&self, idx: u32) -> u64 {
        self.find(idx)
            .ok()
            .and_then(|pos| self.blocks.get(pos))
            .map_or(0, |&(_, w)| w)
    }

    /// Number of 64-bit blocks the universe size implies (sparse storage
    /// only materializes the non-zero ones).
    #[must_use]
    pub fn n_blocks(&self) -> u32 {
        n_blocks(self.n) as u32
    }
}
