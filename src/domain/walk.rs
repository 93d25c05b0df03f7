//! Explicit-stack traversals over the arena, no recursion.

use generational_arena::Index;

use super::node::Side;
use super::tree::RbTree;

/// Ascending key order.
pub(crate) struct InOrder<'a, K> {
    tree: &'a RbTree<K>,
    stack: Vec<Index>,
    current: Index,
}

impl<'a, K> Iterator for InOrder<'a, K> {
    type Item = Index;

    fn next(&mut self) -> Option<Self::Item> {
        let nil = self.tree.nil();
        while self.current != nil {
            self.stack.push(self.current);
            self.current = self.tree.child(self.current, Side::Left);
        }
        let idx = self.stack.pop()?;
        self.current = self.tree.child(idx, Side::Right);
        Some(idx)
    }
}

/// Children before parent, left subtree first. Drives teardown.
pub(crate) struct PostOrder<'a, K> {
    tree: &'a RbTree<K>,
    stack: Vec<(Index, bool)>,
}

impl<'a, K> Iterator for PostOrder<'a, K> {
    type Item = Index;

    fn next(&mut self) -> Option<Self::Item> {
        let nil = self.tree.nil();
        while let Some((idx, visited)) = self.stack.pop() {
            if visited {
                return Some(idx);
            }
            self.stack.push((idx, true));
            // Right pushed first so the left subtree is emitted first
            for side in [Side::Right, Side::Left] {
                let child = self.tree.child(idx, side);
                if child != nil {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}

impl<K> RbTree<K> {
    pub(crate) fn in_order(&self) -> InOrder<'_, K> {
        InOrder {
            tree: self,
            stack: Vec::new(),
            current: self.root(),
        }
    }

    pub(crate) fn post_order(&self) -> PostOrder<'_, K> {
        let mut stack = Vec::new();
        if self.root() != self.nil() {
            stack.push((self.root(), false));
        }
        PostOrder { tree: self, stack }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(tree: &RbTree<u32>, order: impl Iterator<Item = Index>) -> Vec<u32> {
        order.filter_map(|idx| tree.node(idx).key).collect()
    }

    #[test]
    fn given_empty_tree_when_walking_then_yields_nothing() {
        let tree: RbTree<u32> = RbTree::new();
        assert_eq!(tree.in_order().count(), 0);
        assert_eq!(tree.post_order().count(), 0);
    }

    #[test]
    fn given_balanced_tree_when_walking_post_order_then_children_precede_parent() {
        let mut tree = RbTree::new();
        for key in [4, 2, 6, 1, 3, 5, 7] {
            tree.insert(key).unwrap();
        }
        assert_eq!(keys(&tree, tree.in_order()), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(keys(&tree, tree.post_order()), vec![1, 3, 2, 5, 7, 6, 4]);
    }
}
