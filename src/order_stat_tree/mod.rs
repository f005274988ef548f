// Copyright (c) 2024-present, the containment-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Size-augmented red-black tree — component C.
//!
//! A balanced BST that additionally tracks subtree sizes, turning it into an
//! order-statistic tree: `count_ge`/`count_le` are O(log n) instead of
//! O(n). This is the decisive operation for the multi-permutation index's
//! query planner.
//!
//! Deletion follows CLRS chapter 13 exactly, fixup cases written directly
//! from the textbook.

mod arena;
mod iter;

use arena::{Arena, Color, NodeId};
pub use iter::AscendingIter;
use std::cmp::Ordering;

/// A size-augmented red-black tree over keys `K`.
///
/// Bucketing is not this type's concern: it stores *distinct* keys only, as
/// an ordered set rather than a multiset. Callers needing bucketed entries
/// layer a map from key to bucket on top, as the simple and
/// multi-permutation indexes do.
#[derive(Debug)]
pub struct OrderStatTree<K> {
    arena: Arena<K>,
    root: Option<NodeId>,
    count: usize,
}

impl<K> Default for OrderStatTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> OrderStatTree<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            count: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn left(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).left
    }

    fn right(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).right
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).parent
    }

    fn set_left(&mut self, id: NodeId, child: Option<NodeId>) {
        self.arena.get_mut(id).left = child;
    }

    fn set_right(&mut self, id: NodeId, child: Option<NodeId>) {
        self.arena.get_mut(id).right = child;
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.arena.get_mut(id).parent = parent;
    }

    fn set_color(&mut self, id: NodeId, color: Color) {
        self.arena.get_mut(id).color = color;
    }

    fn color_of(&self, id: Option<NodeId>) -> Color {
        self.arena.color_of(id)
    }

    fn minimum(&self, mut x: NodeId) -> NodeId {
        while let Some(l) = self.left(x) {
            x = l;
        }
        x
    }

    fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(r) = self.right(id) {
            return Some(self.minimum(r));
        }
        let mut x = id;
        let mut p = self.parent(x);
        while let Some(pp) = p {
            if self.right(pp) == Some(x) {
                x = pp;
                p = self.parent(x);
            } else {
                return Some(pp);
            }
        }
        None
    }

    /// Recomputes `left_size`/`right_size` from `node` up to the root,
    /// inclusive. Safe to call after any structural change, since it derives
    /// sizes purely from the (already-correct) sizes of direct children.
    fn fix_sizes_up(&mut self, mut node: Option<NodeId>) {
        while let Some(id) = node {
            let (l, r) = {
                let n = self.arena.get(id);
                (n.left, n.right)
            };
            let ls = self.arena.size_of(l);
            let rs = self.arena.size_of(r);
            let n = self.arena.get_mut(id);
            n.left_size = ls;
            n.right_size = rs;
            node = self.parent(id);
        }
    }

    /// Recomputes sizes of a single node from its current children, without
    /// climbing further. Used after rotations, which only change the local
    /// 3-node relationship and never the total count of an ancestor's
    /// subtree.
    fn recompute_local(&mut self, id: NodeId) {
        let (l, r) = {
            let n = self.arena.get(id);
            (n.left, n.right)
        };
        let ls = self.arena.size_of(l);
        let rs = self.arena.size_of(r);
        let n = self.arena.get_mut(id);
        n.left_size = ls;
        n.right_size = rs;
    }

    fn rotate_left(&mut self, x: NodeId) {
        let y = self.right(x).expect("rotate_left requires a right child");
        let beta = self.left(y);
        self.set_right(x, beta);
        if let Some(b) = beta {
            self.set_parent(b, Some(x));
        }
        let xp = self.parent(x);
        self.set_parent(y, xp);
        match xp {
            None => self.root = Some(y),
            Some(p) => {
                if self.left(p) == Some(x) {
                    self.set_left(p, Some(y));
                } else {
                    self.set_right(p, Some(y));
                }
            }
        }
        self.set_left(y, Some(x));
        self.set_parent(x, Some(y));
        self.recompute_local(x);
        self.recompute_local(y);
    }

    fn rotate_right(&mut self, x: NodeId) {
        let y = self.left(x).expect("rotate_right requires a left child");
        let beta = self.right(y);
        self.set_left(x, beta);
        if let Some(b) = beta {
            self.set_parent(b, Some(x));
        }
        let xp = self.parent(x);
        self.set_parent(y, xp);
        match xp {
            None => self.root = Some(y),
            Some(p) => {
                if self.left(p) == Some(x) {
                    self.set_left(p, Some(y));
                } else {
                    self.set_right(p, Some(y));
                }
            }
        }
        self.set_right(y, Some(x));
        self.set_parent(x, Some(y));
        self.recompute_local(x);
        self.recompute_local(y);
    }

    fn transplant(&mut self, u: NodeId, v: Option<NodeId>) {
        let up = self.parent(u);
        match up {
            None => self.root = v,
            Some(p) => {
                if self.left(p) == Some(u) {
                    self.set_left(p, v);
                } else {
                    self.set_right(p, v);
                }
            }
        }
        if let Some(v) = v {
            self.set_parent(v, up);
        }
    }
}

impl<K: Ord> OrderStatTree<K> {
    fn find_node(&self, key: &K) -> Option<NodeId> {
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = self.arena.get(id);
            match key.cmp(&node.key) {
                Ordering::Equal => return Some(id),
                Ordering::Less => cur = node.left,
                Ordering::Greater => cur = node.right,
            }
        }
        None
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    /// Inserts `key`. Returns `true` iff it was not already present.
    pub fn add(&mut self, key: K) -> bool {
        let mut cur = self.root;
        let mut parent = None;
        let mut went_left = false;

        while let Some(id) = cur {
            parent = Some(id);
            match key.cmp(&self.arena.get(id).key) {
                Ordering::Equal => return false,
                Ordering::Less => {
                    went_left = true;
                    cur = self.left(id);
                }
                Ordering::Greater => {
                    went_left = false;
                    cur = self.right(id);
                }
            }
        }

        let z = self.arena.alloc(key);
        self.set_parent(z, parent);
        match parent {
            None => self.root = Some(z),
            Some(p) => {
                if went_left {
                    self.set_left(p, Some(z));
                } else {
                    self.set_right(p, Some(z));
                }
            }
        }

        self.count += 1;
        self.fix_sizes_up(Some(z));
        self.insert_fixup(z);
        true
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.color_of(self.parent(z)) == Color::Red {
            let zp = self.parent(z).expect("red node has a parent (root is black)");
            let zpp = self
                .parent(zp)
                .expect("zp is red, so zp cannot be the root");

            if Some(zp) == self.left(zpp) {
                let y = self.right(zpp);
                if self.color_of(y) == Color::Red {
                    self.set_color(zp, Color::Black);
                    self.set_color(y.expect("red uncle exists"), Color::Black);
                    self.set_color(zpp, Color::Red);
                    z = zpp;
                } else {
                    if Some(z) == self.right(zp) {
                        z = zp;
                        self.rotate_left(z);
                    }
                    let zp = self.parent(z).expect("z has a parent mid-fixup");
                    let zpp = self.parent(zp).expect("zp is red, cannot be root");
                    self.set_color(zp, Color::Black);
                    self.set_color(zpp, Color::Red);
                    self.rotate_right(zpp);
                }
            } else {
                let y = self.left(zpp);
                if self.color_of(y) == Color::Red {
                    self.set_color(zp, Color::Black);
                    self.set_color(y.expect("red uncle exists"), Color::Black);
                    self.set_color(zpp, Color::Red);
                    z = zpp;
                } else {
                    if Some(z) == self.left(zp) {
                        z = zp;
                        self.rotate_right(z);
                    }
                    let zp = self.parent(z).expect("z has a parent mid-fixup");
                    let zpp = self.parent(zp).expect("zp is red, cannot be root");
                    self.set_color(zp, Color::Black);
                    self.set_color(zpp, Color::Red);
                    self.rotate_left(zpp);
                }
            }
        }

        if let Some(r) = self.root {
            self.set_color(r, Color::Black);
        }
    }

    /// Removes `key`. Returns `true` iff it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(z) = self.find_node(key) else {
            return false;
        };
        self.delete_node(z);
        self.count -= 1;
        true
    }

    fn delete_node(&mut self, z: NodeId) {
        let z_color = self.arena.get(z).color;
        let mut y_original_color = z_color;
        let x: Option<NodeId>;
        let x_parent: Option<NodeId>;

        if self.left(z).is_none() {
            x = self.right(z);
            x_parent = self.parent(z);
            self.transplant(z, x);
        } else if self.right(z).is_none() {
            x = self.left(z);
            x_parent = self.parent(z);
            self.transplant(z, x);
        } else {
            let y = self.minimum(self.right(z).expect("checked above"));
            y_original_color = self.arena.get(y).color;
            let y_right = self.right(y);

            if self.parent(y) == Some(z) {
                x = y_right;
                x_parent = Some(y);
            } else {
                x = y_right;
                x_parent = self.parent(y);
                self.transplant(y, y_right);
                let zr = self.right(z);
                self.set_right(y, zr);
                if let Some(zr) = zr {
                    self.set_parent(zr, Some(y));
                }
            }

            self.transplant(z, Some(y));
            let zl = self.left(z);
            self.set_left(y, zl);
            if let Some(zl) = zl {
                self.set_parent(zl, Some(y));
            }
            self.set_color(y, z_color);
        }

        self.arena.free(z);
        self.fix_sizes_up(x_parent);

        if y_original_color == Color::Black {
            self.delete_fixup(x, x_parent);
        }
    }

    fn delete_fixup(&mut self, mut x: Option<NodeId>, mut x_parent: Option<NodeId>) {
        while x != self.root && self.color_of(x) == Color::Black {
            let xp = x_parent.expect("x is not the root, so it has a parent");

            if x == self.left(xp) {
                let mut w = self
                    .right(xp)
                    .expect("black-height invariant guarantees a sibling");

                if self.color_of(Some(w)) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(xp, Color::Red);
                    self.rotate_left(xp);
                    w = self.right(xp).expect("sibling restored after rotation");
                }

                if self.color_of(self.left(w)) == Color::Black
                    && self.color_of(self.right(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = Some(xp);
                    x_parent = self.parent(xp);
                } else {
                    if self.color_of(self.right(w)) == Color::Black {
                        if let Some(wl) = self.left(w) {
                            self.set_color(wl, Color::Black);
                        }
                        self.set_color(w, Color::Red);
                        self.rotate_right(w);
                        w = self.right(xp).expect("sibling restored after rotation");
                    }
                    self.set_color(w, self.color_of(Some(xp)));
                    self.set_color(xp, Color::Black);
                    if let Some(wr) = self.right(w) {
                        self.set_color(wr, Color::Black);
                    }
                    self.rotate_left(xp);
                    x = self.root;
                    x_parent = None;
                }
            } else {
                let mut w = self
                    .left(xp)
                    .expect("black-height invariant guarantees a sibling");

                if self.color_of(Some(w)) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(xp, Color::Red);
                    self.rotate_right(xp);
                    w = self.left(xp).expect("sibling restored after rotation");
                }

                if self.color_of(self.right(w)) == Color::Black
                    && self.color_of(self.left(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = Some(xp);
                    x_parent = self.parent(xp);
                } else {
                    if self.color_of(self.left(w)) == Color::Black {
                        if let Some(wr) = self.right(w) {
                            self.set_color(wr, Color::Black);
                        }
                        self.set_color(w, Color::Red);
                        self.rotate_left(w);
                        w = self.left(xp).expect("sibling restored after rotation");
                    }
                    self.set_color(w, self.color_of(Some(xp)));
                    self.set_color(xp, Color::Black);
                    if let Some(wl) = self.left(w) {
                        self.set_color(wl, Color::Black);
                    }
                    self.rotate_right(xp);
                    x = self.root;
                    x_parent = None;
                }
            }
        }

        if let Some(x) = x {
            self.set_color(x, Color::Black);
        }
    }

    /// Count of keys `>= key`, in O(log n).
    #[must_use]
    pub fn count_ge(&self, key: &K) -> usize {
        let mut cur = self.root;
        let mut count = 0u32;
        while let Some(id) = cur {
            let node = self.arena.get(id);
            if node.key >= *key {
                count += 1 + node.right_size;
                cur = node.left;
            } else {
                cur = node.right;
            }
        }
        count as usize
    }

    /// Count of keys `<= key`, in O(log n).
    #[must_use]
    pub fn count_le(&self, key: &K) -> usize {
        let mut cur = self.root;
        let mut count = 0u32;
        while let Some(id) = cur {
            let node = self.arena.get(id);
            if node.key <= *key {
                count += 1 + node.left_size;
                cur = node.right;
            } else {
                cur = node.left;
            }
        }
        count as usize
    }

    fn find_first_ge(&self, key: &K) -> Option<NodeId> {
        let mut cur = self.root;
        let mut best = None;
        while let Some(id) = cur {
            let node = self.arena.get(id);
            if node.key >= *key {
                best = Some(id);
                cur = node.left;
            } else {
                cur = node.right;
            }
        }
        best
    }
}

impl<K: Ord + Clone> OrderStatTree<K> {
    /// Ascending iterator over all keys `>= key`.
    pub fn iter_ge(&self, key: &K) -> AscendingIter<'_, K> {
        AscendingIter {
            tree: self,
            current: self.find_first_ge(key),
        }
    }

    /// Iterator over all keys `<= key`, ascending. Subset/superset filtering
    /// downstream is order-independent; ascending was chosen to share
    /// `AscendingIter` with `iter_ge`.
    pub fn iter_le(&self, key: &K) -> impl Iterator<Item = K> + '_ {
        let start = self.root.map(|r| self.minimum(r));
        let bound = key.clone();
        AscendingIter {
            tree: self,
            current: start,
        }
        .take_while(move |k| *k <= bound)
    }
}

/// Self-check routines. Not gated behind `#[cfg(test)]` so the
/// integration test suite (a separate crate) can call them too.
impl<K: Ord + std::fmt::Debug> OrderStatTree<K> {
    /// Checks invariant (2): `subtree_size(x) = 1 + left_size(x) + right_size(x)`,
    /// recomputed independently of the stored fields, plus that `self.len()`
    /// matches the root's subtree size.
    pub fn check_sizes(&self) -> Result<(), String> {
        fn walk<K>(arena: &Arena<K>, id: Option<NodeId>) -> Result<u32, String> {
            let Some(id) = id else { return Ok(0) };
            let node = arena.get(id);
            let actual_left = walk(arena, node.left)?;
            let actual_right = walk(arena, node.right)?;
            if actual_left != node.left_size {
                return Err(format!(
                    "node {id}: stored left_size {} != actual {actual_left}",
                    node.left_size
                ));
            }
            if actual_right != node.right_size {
                return Err(format!(
                    "node {id}: stored right_size {} != actual {actual_right}",
                    node.right_size
                ));
            }
            Ok(1 + actual_left + actual_right)
        }

        let total = walk(&self.arena, self.root)?;
        if total as usize != self.count {
            return Err(format!(
                "tree size {} != root subtree size {total}",
                self.count
            ));
        }
        Ok(())
    }

    /// Checks the classical red-black properties: the root is black, no red
    /// node has a red child, and every root-to-nil path has the same black
    /// height.
    pub fn check_red_black(&self) -> Result<(), String> {
        if let Some(root) = self.root {
            if self.arena.get(root).color != Color::Black {
                return Err("root is not black".into());
            }
        }

        fn walk<K>(arena: &Arena<K>, id: Option<NodeId>) -> Result<u32, String> {
            let Some(id) = id else { return Ok(1) }; // nil counts as black
            let node = arena.get(id);

            if node.color == Color::Red {
                for child in [node.left, node.right] {
                    if let Some(child) = child {
                        if arena.get(child).color == Color::Red {
                            return Err(format!("red node {id} has red child {child}"));
                        }
                    }
                }
            }

            let bh_left = walk(arena, node.left)?;
            let bh_right = walk(arena, node.right)?;
            if bh_left != bh_right {
                return Err(format!(
                    "black-height mismatch at node {id}: left={bh_left} right={bh_right}"
                ));
            }

            Ok(bh_left + u32::from(node.color == Color::Black))
        }

        walk(&self.arena, self.root)?;
        Ok(())
    }

    /// Checks BST ordering and parent/child pointer coherence.
    pub fn check_coherence(&self) -> Result<(), String> {
        fn walk<K: Ord + std::fmt::Debug>(
            arena: &Arena<K>,
            id: Option<NodeId>,
            lo: Option<&K>,
            hi: Option<&K>,
        ) -> Result<(), String> {
            let Some(id) = id else { return Ok(()) };
            let node = arena.get(id);

            if let Some(lo) = lo {
                if &node.key <= lo {
                    return Err(format!("node {id} ({:?}) violates lower bound", node.key));
                }
            }
            if let Some(hi) = hi {
                if &node.key >= hi {
                    return Err(format!("node {id} ({:?}) violates upper bound", node.key));
                }
            }

            for child in [node.left, node.right] {
                if let Some(child) = child {
                    if arena.get(child).parent != Some(id) {
                        return Err(format!("child {child} of {id} has inconsistent parent"));
                    }
                }
            }

            walk(arena, node.left, lo, Some(&node.key))?;
            walk(arena, node.right, Some(&node.key), hi)
        }

        if let Some(root) = self.root {
            if self.arena.get(root).parent.is_some() {
                return Err("root has a parent".into());
            }
        }
        walk(&self.arena, self.root, None, None)
    }
}
