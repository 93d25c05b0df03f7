//! Diagnostic rendering of a tree as a `termtree::Tree<String>`.
use std::fmt::Display;

use generational_arena::Index;
use termtree::Tree;

use super::node::Side;
use super::tree::RbTree;

pub trait TreeRender {
    fn render(&self) -> Tree<String>;
}

impl<K: Display> TreeRender for RbTree<K> {
    /// Each node prints as `key (color)`; a node with a single child lists
    /// the missing side as `nil` so left and right stay distinguishable.
    fn render(&self) -> Tree<String> {
        fn label<K: Display>(tree: &RbTree<K>, idx: Index) -> String {
            match tree.node(idx).key.as_ref() {
                Some(key) => format!("{} ({})", key, tree.color_of(idx)),
                None => "nil".to_string(),
            }
        }

        // Depth is bounded by 2 * log2(n + 1), recursion is fine here
        fn build<K: Display>(tree: &RbTree<K>, idx: Index) -> Tree<String> {
            let mut out = Tree::new(label(tree, idx));
            let left = tree.child(idx, Side::Left);
            let right = tree.child(idx, Side::Right);
            if left != tree.nil() || right != tree.nil() {
                out.push(build(tree, left));
                out.push(build(tree, right));
            }
            out
        }

        if self.is_empty() {
            Tree::new("(empty)".to_string())
        } else {
            build(self, self.root())
        }
    }
}
