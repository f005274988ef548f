// Copyright (c) 2024-present, the containment-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::arena::NodeId;
use super::OrderStatTree;

/// Ascending in-order iterator, walking successor links one step at a time.
/// Borrows the tree immutably for its entire lifetime, so the borrow checker
/// itself enforces "no mutation while an iterator is alive".
pub struct AscendingIter<'a, K> {
    pub(super) tree: &'a OrderStatTree<K>,
    pub(super) current: Option<NodeId>,
}

impl<'a, K: Ord + Clone> Iterator for AscendingIter<'a, K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let key = self.tree.arena.get(id).key.clone();
        self.current = self.tree.successor(id);
        Some(key)
    }
}
