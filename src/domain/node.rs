//! Node storage types and the external node handle.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use generational_arena::Index;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a process-unique id used to tag handles with their owning tree.
pub(crate) fn next_tree_id() -> u64 {
    NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Node color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "R"),
            Color::Black => write!(f, "B"),
        }
    }
}

/// Child slot, also used as the rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// One slot in the tree arena.
///
/// The sentinel is stored in the same arena and is the only node without a key.
#[derive(Debug)]
pub(crate) struct Node<K> {
    pub(crate) key: Option<K>,
    pub(crate) color: Color,
    pub(crate) parent: Index,
    pub(crate) left: Index,
    pub(crate) right: Index,
}

impl<K> Node<K> {
    /// Fresh red node linked below `parent`, both children on the sentinel.
    pub(crate) fn new(key: K, parent: Index, nil: Index) -> Self {
        Self {
            key: Some(key),
            color: Color::Red,
            parent,
            left: nil,
            right: nil,
        }
    }

    /// Sentinel for a tree, pointing at itself until a transplant borrows its parent link.
    pub(crate) fn sentinel(own: Index) -> Self {
        Self {
            key: None,
            color: Color::Black,
            parent: own,
            left: own,
            right: own,
        }
    }

    pub(crate) fn child(&self, side: Side) -> Index {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Index) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

/// Handle to a node stored in an [`RbTree`](crate::RbTree).
///
/// Handles are cheap to copy. A handle is only meaningful for the tree that
/// produced it and stops resolving once its node is erased; both conditions
/// are detected by the tree instead of corrupting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub(crate) tree: u64,
    pub(crate) index: Index,
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.index.into_raw_parts();
        write!(f, "tree {} slot {} gen {}", self.tree, slot, generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_side_when_opposite_then_mirrors() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }

    #[test]
    fn given_two_calls_when_allocating_tree_ids_then_ids_differ() {
        assert_ne!(next_tree_id(), next_tree_id());
    }

    #[test]
    fn given_color_when_displayed_then_uses_single_letter() {
        assert_eq!(Color::Red.to_string(), "R");
        assert_eq!(Color::Black.to_string(), "B");
    }
}
