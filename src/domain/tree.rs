//! Red-black tree engine over a generational arena.
//!
//! Every link is an arena [`Index`]. Missing children and the root's parent
//! point at a per-tree sentinel slot which is always black and carries no key.
//! During erase the sentinel may stand in for a removed child, in which case
//! its parent link is borrowed so the fixup can climb from it.

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use super::error::{TreeError, TreeResult};
use super::node::{next_tree_id, Color, Node, NodeRef, Side};
use crate::config::TreeConfig;

/// Ordered key storage with logarithmic insert, erase and lookup.
///
/// Duplicate keys are allowed; an equal key descends into the right subtree.
/// Handles returned by [`insert`](Self::insert), [`find`](Self::find),
/// [`min`](Self::min) and [`max`](Self::max) remain valid until their own node is
/// erased.
#[derive(Debug)]
pub struct RbTree<K> {
    id: u64,
    arena: Arena<Node<K>>,
    root: Index,
    nil: Index,
    config: TreeConfig,
}

impl<K> Default for RbTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RbTree<K> {
    /// Empty, unbounded tree with default settings.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Tree built from `config`. The up-front reservation is capped by
    /// [`TreeConfig::reserved_slots`], so an oversized capacity never panics here.
    pub fn with_config(config: TreeConfig) -> Self {
        let mut arena = Arena::with_capacity(config.reserved_slots() + 1);
        let nil = arena.insert_with(Node::sentinel);
        Self {
            id: next_tree_id(),
            arena,
            root: nil,
            nil,
            config,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.arena.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.root == self.nil
    }

    /// Key stored under `handle`, or `None` if the handle does not resolve here.
    pub fn key(&self, handle: NodeRef) -> Option<&K> {
        if handle.tree != self.id {
            return None;
        }
        self.arena.get(handle.index).and_then(|node| node.key.as_ref())
    }

    pub fn color(&self, handle: NodeRef) -> Option<Color> {
        self.key(handle)?;
        Some(self.node(handle.index).color)
    }

    /// True if `handle` was produced by this tree and its node is still stored.
    pub fn contains(&self, handle: NodeRef) -> bool {
        self.key(handle).is_some()
    }

    /// Handle of the smallest key, `None` on an empty tree.
    pub fn min(&self) -> Option<NodeRef> {
        if self.is_empty() {
            return None;
        }
        Some(self.handle(self.extreme(self.root, Side::Left)))
    }

    /// Handle of the largest key, `None` on an empty tree.
    pub fn max(&self) -> Option<NodeRef> {
        if self.is_empty() {
            return None;
        }
        Some(self.handle(self.extreme(self.root, Side::Right)))
    }

    /// Removes every node, children before their parent, and keeps the
    /// sentinel so the tree can be reused.
    #[instrument(level = "debug", skip_all)]
    pub fn clear(&mut self) {
        let order: Vec<Index> = self.post_order().collect();
        debug!(nodes = order.len(), "tearing down tree");
        for idx in order {
            self.arena.remove(idx);
        }
        self.root = self.nil;
        let nil = self.nil;
        self.node_mut(nil).parent = nil;
    }

    // --- internal accessors -------------------------------------------------

    pub(crate) fn nil(&self) -> Index {
        self.nil
    }

    pub(crate) fn root(&self) -> Index {
        self.root
    }

    pub(crate) fn node(&self, idx: Index) -> &Node<K> {
        &self.arena[idx]
    }

    fn node_mut(&mut self, idx: Index) -> &mut Node<K> {
        &mut self.arena[idx]
    }

    pub(crate) fn child(&self, idx: Index, side: Side) -> Index {
        self.node(idx).child(side)
    }

    fn set_child(&mut self, idx: Index, side: Side, child: Index) {
        self.node_mut(idx).set_child(side, child);
    }

    pub(crate) fn parent(&self, idx: Index) -> Index {
        self.node(idx).parent
    }

    fn set_parent(&mut self, idx: Index, parent: Index) {
        self.node_mut(idx).parent = parent;
    }

    pub(crate) fn color_of(&self, idx: Index) -> Color {
        self.node(idx).color
    }

    fn set_color(&mut self, idx: Index, color: Color) {
        debug_assert!(
            idx != self.nil || color == Color::Black,
            "sentinel must stay black"
        );
        self.node_mut(idx).color = color;
    }

    /// Which slot of its parent `idx` occupies.
    ///
    /// For a sentinel cursor this relies on the borrowed parent link and on the
    /// sibling being a real node, which the erase fixup guarantees.
    fn side_of(&self, idx: Index) -> Side {
        if self.child(self.parent(idx), Side::Left) == idx {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Last real node reached by following `side` links from `from`.
    fn extreme(&self, from: Index, side: Side) -> Index {
        let mut current = from;
        while self.child(current, side) != self.nil {
            current = self.child(current, side);
        }
        current
    }

    fn handle(&self, index: Index) -> NodeRef {
        NodeRef {
            tree: self.id,
            index,
        }
    }

    fn resolve(&self, handle: NodeRef) -> TreeResult<Index> {
        if handle.tree != self.id {
            return Err(TreeError::ForeignHandle(handle));
        }
        if handle.index == self.nil || !self.arena.contains(handle.index) {
            return Err(TreeError::StaleHandle(handle));
        }
        Ok(handle.index)
    }

    // --- restructuring ------------------------------------------------------

    /// Rotates around `x` towards `side`, promoting the child on the opposite side.
    ///
    /// Pre: that child is a real node. Post: in-order sequence unchanged; the
    /// promoted node occupies `x`'s former slot and `x` hangs below it on `side`.
    fn rotate(&mut self, x: Index, side: Side) {
        let y = self.child(x, side.opposite());
        debug_assert!(y != self.nil, "rotation needs a real child to promote");
        let beta = self.child(y, side);
        let parent = self.parent(x);

        self.set_parent(y, parent);
        if x == self.root {
            self.root = y;
        } else {
            let slot = self.side_of(x);
            self.set_child(parent, slot, y);
        }

        if beta != self.nil {
            self.set_parent(beta, x);
        }
        self.set_child(x, side.opposite(), beta);

        self.set_child(y, side, x);
        self.set_parent(x, y);
    }

    /// Swaps the colors of `a` and `b`.
    fn exchange_color(&mut self, a: Index, b: Index) {
        let (ca, cb) = (self.color_of(a), self.color_of(b));
        self.set_color(a, cb);
        self.set_color(b, ca);
    }

    /// Pushes `top`'s color down: `top` takes the children's color, both children take `top`'s.
    fn push_down_color(&mut self, top: Index, first: Index, second: Index) {
        let top_color = self.color_of(top);
        let child_color = self.color_of(first);
        self.set_color(top, child_color);
        self.set_color(first, top_color);
        self.set_color(second, top_color);
    }

    /// Puts the subtree rooted at `v` into `u`'s slot. `v` may be the sentinel,
    /// whose parent link is then borrowed.
    fn transplant(&mut self, u: Index, v: Index) {
        let parent = self.parent(u);
        if parent == self.nil {
            self.root = v;
        } else {
            let slot = self.side_of(u);
            self.set_child(parent, slot, v);
        }
        self.set_parent(v, parent);
    }

    /// Restores "no red node has a red child" after linking the red node `x`.
    ///
    /// Loop entry: the only possible violation is `x` and its parent both red.
    fn insert_fixup(&mut self, mut x: Index) {
        while self.color_of(self.parent(x)) == Color::Red {
            let parent = self.parent(x);
            let grandparent = self.parent(parent);
            let side = self.side_of(parent);
            let uncle = self.child(grandparent, side.opposite());

            if self.color_of(uncle) == Color::Red {
                trace!("insert fixup: red uncle, recolor and climb");
                self.push_down_color(grandparent, parent, uncle);
                x = grandparent;
                continue;
            }

            if x == self.child(parent, side.opposite()) {
                trace!("insert fixup: inner grandchild, rotate at parent");
                x = parent;
                self.rotate(x, side);
            }

            trace!("insert fixup: outer grandchild, rotate at grandparent");
            let parent = self.parent(x);
            let grandparent = self.parent(parent);
            self.exchange_color(grandparent, parent);
            self.rotate(grandparent, side.opposite());
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Repays the missing black on the path through `x` after a black node was spliced out.
    ///
    /// Loop entry: every path through `x` is one black short; all other
    /// properties hold. Ends when `x` is red or the root, then paints it black.
    fn erase_fixup(&mut self, mut x: Index) {
        while x != self.root && self.color_of(x) == Color::Black {
            let parent = self.parent(x);
            let near = self.side_of(x);
            let far = near.opposite();
            let mut sibling = self.child(parent, far);

            if self.color_of(sibling) == Color::Red {
                trace!("erase fixup: red sibling, rotate at parent");
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(parent, near);
                sibling = self.child(parent, far);
            }

            let near_nephew = self.child(sibling, near);
            let far_nephew = self.child(sibling, far);
            if self.color_of(near_nephew) == Color::Black && self.color_of(far_nephew) == Color::Black {
                trace!("erase fixup: black nephews, recolor sibling and climb");
                self.set_color(sibling, Color::Red);
                x = parent;
                continue;
            }

            if self.color_of(far_nephew) == Color::Black {
                trace!("erase fixup: red near nephew, rotate at sibling");
                self.set_color(near_nephew, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, far);
                sibling = self.child(parent, far);
            }

            trace!("erase fixup: red far nephew, rotate at parent");
            let parent_color = self.color_of(parent);
            self.set_color(sibling, parent_color);
            self.set_color(parent, Color::Black);
            let far_nephew = self.child(sibling, far);
            self.set_color(far_nephew, Color::Black);
            self.rotate(parent, near);
            x = self.root;
        }
        self.set_color(x, Color::Black);
    }
}

impl<K: Ord> RbTree<K> {
    /// Stores `key` and returns its handle.
    ///
    /// Fails with `CapacityExhausted` when the configured node limit is
    /// reached, before the tree is touched.
    ///
    /// With `check_invariants` enabled an `InvariantViolation` is reported
    /// after the key has been linked in. The key stays stored and is reachable
    /// through [`find`](Self::find).
    #[instrument(level = "trace", skip_all, fields(len = self.len()))]
    pub fn insert(&mut self, key: K) -> TreeResult<NodeRef> {
        if let Some(limit) = self.config.max_nodes {
            if self.len() >= limit {
                debug!(limit, "insert refused, node limit reached");
                return Err(TreeError::CapacityExhausted { limit });
            }
        }

        let mut parent = self.nil;
        let mut side = Side::Left;
        let mut current = self.root;
        while current != self.nil {
            parent = current;
            side = match self.node(current).key.as_ref() {
                Some(existing) if key < *existing => Side::Left,
                _ => Side::Right,
            };
            current = self.child(current, side);
        }

        let nil = self.nil;
        let idx = self.arena.insert(Node::new(key, parent, nil));
        if parent == self.nil {
            self.root = idx;
        } else {
            self.set_child(parent, side, idx);
        }

        self.insert_fixup(idx);
        self.check_invariants()?;
        Ok(self.handle(idx))
    }

    /// Any node holding `key`, or `None` if it is absent.
    pub fn find(&self, key: &K) -> Option<NodeRef> {
        let mut current = self.root;
        while current != self.nil {
            let node = self.node(current);
            match node.key.as_ref() {
                Some(existing) if key == existing => return Some(self.handle(current)),
                Some(existing) if key < existing => current = node.left,
                _ => current = node.right,
            }
        }
        None
    }

    /// Removes the node behind `handle` and returns its key.
    ///
    /// A node with two children is replaced by its in-order successor node,
    /// which moves into the erased slot and takes over its color. Only
    /// `handle` is invalidated; every other handle keeps pointing at its key.
    ///
    /// With `check_invariants` enabled an `InvariantViolation` is reported
    /// after the node has been unlinked and dropped, so its key is not returned.
    #[instrument(level = "trace", skip_all, fields(len = self.len()))]
    pub fn erase(&mut self, handle: NodeRef) -> TreeResult<K> {
        let z = self.resolve(handle)?;
        let left = self.child(z, Side::Left);
        let right = self.child(z, Side::Right);

        let mut removed_color = self.color_of(z);
        let x;
        if left == self.nil {
            x = right;
            self.transplant(z, right);
        } else if right == self.nil {
            x = left;
            self.transplant(z, left);
        } else {
            let successor = self.extreme(right, Side::Left);
            removed_color = self.color_of(successor);
            x = self.child(successor, Side::Right);

            if self.parent(successor) == z {
                self.set_parent(x, successor);
            } else {
                self.transplant(successor, x);
                self.set_child(successor, Side::Right, right);
                self.set_parent(right, successor);
            }

            self.transplant(z, successor);
            self.set_child(successor, Side::Left, left);
            self.set_parent(left, successor);
            let color = self.color_of(z);
            self.set_color(successor, color);
        }

        if removed_color == Color::Black {
            self.erase_fixup(x);
        }

        let key = self
            .arena
            .remove(z)
            .and_then(|node| node.key)
            .ok_or(TreeError::StaleHandle(handle))?;
        self.check_invariants()?;
        Ok(key)
    }

    fn check_invariants(&self) -> TreeResult<()> {
        if self.config.check_invariants {
            self.validate()?;
        }
        Ok(())
    }
}

impl<K: Clone> RbTree<K> {
    /// Up to `capacity` keys in ascending order.
    ///
    /// A capacity below [`len`](Self::len) silently truncates to the smallest keys.
    pub fn to_array(&self, capacity: usize) -> Vec<K> {
        self.in_order()
            .take(capacity)
            .filter_map(|idx| self.node(idx).key.clone())
            .collect()
    }

    /// Writes keys in ascending order into `buf` until it is full, returning the count written.
    pub fn fill_slice(&self, buf: &mut [K]) -> usize {
        let mut written = 0;
        for (slot, idx) in buf.iter_mut().zip(self.in_order()) {
            if let Some(key) = self.node(idx).key.as_ref() {
                *slot = key.clone();
                written += 1;
            }
        }
        written
    }
}

impl<K> Drop for RbTree<K> {
    fn drop(&mut self) {
        self.clear();
    }
}
