//! Invariant checks and shape metrics.

use itertools::Itertools;

use super::error::{TreeError, TreeResult};
use super::node::{Color, Side};
use super::tree::RbTree;

impl<K> RbTree<K> {
    /// Node count on the longest root-to-leaf path, 0 for an empty tree.
    pub fn height(&self) -> usize {
        let nil = self.nil();
        let mut deepest = 0;
        let mut stack = Vec::new();
        if self.root() != nil {
            stack.push((self.root(), 1));
        }
        while let Some((idx, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            for side in [Side::Left, Side::Right] {
                let child = self.child(idx, side);
                if child != nil {
                    stack.push((child, depth + 1));
                }
            }
        }
        deepest
    }

    /// Black nodes on the leftmost root-to-sentinel path, sentinel excluded.
    ///
    /// Equals the black-height of every path while the tree is valid.
    pub fn black_height(&self) -> usize {
        let nil = self.nil();
        let mut count = 0;
        let mut current = self.root();
        while current != nil {
            if self.color_of(current) == Color::Black {
                count += 1;
            }
            current = self.child(current, Side::Left);
        }
        count
    }
}

impl<K: Ord> RbTree<K> {
    /// Checks every red-black property plus link consistency and key order.
    ///
    /// Returns the black-height of the root (sentinel excluded).
    pub fn validate(&self) -> TreeResult<usize> {
        let nil = self.nil();
        let root = self.root();

        if self.color_of(nil) != Color::Black {
            return Err(TreeError::violation("sentinel is not black"));
        }
        if root == nil {
            return Ok(0);
        }
        if self.color_of(root) != Color::Black {
            return Err(TreeError::violation("root is red"));
        }
        if self.parent(root) != nil {
            return Err(TreeError::violation("root has a parent"));
        }

        let mut black_height = None;
        let mut visited = 0;
        let mut stack = vec![(root, 1)];
        while let Some((idx, blacks)) = stack.pop() {
            visited += 1;
            let red = self.color_of(idx) == Color::Red;
            for side in [Side::Left, Side::Right] {
                let child = self.child(idx, side);
                if child == nil {
                    match black_height {
                        None => black_height = Some(blacks),
                        Some(expected) if expected != blacks => {
                            return Err(TreeError::violation(format!(
                                "black-height differs: {expected} vs {blacks}"
                            )));
                        }
                        Some(_) => {}
                    }
                    continue;
                }
                if self.parent(child) != idx {
                    return Err(TreeError::violation("child does not link back to its parent"));
                }
                let child_red = self.color_of(child) == Color::Red;
                if red && child_red {
                    return Err(TreeError::violation("red node has a red child"));
                }
                stack.push((child, blacks + usize::from(!child_red)));
            }
        }

        if visited != self.len() {
            return Err(TreeError::violation(format!(
                "{visited} nodes reachable but {} stored",
                self.len()
            )));
        }

        let out_of_order = self
            .in_order()
            .filter_map(|idx| self.node(idx).key.as_ref())
            .tuple_windows()
            .any(|(a, b)| a > b);
        if out_of_order {
            return Err(TreeError::violation("in-order keys are not ascending"));
        }

        Ok(black_height.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_empty_tree_when_validating_then_black_height_is_zero() {
        let tree: RbTree<i32> = RbTree::new();
        assert_eq!(tree.validate(), Ok(0));
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.black_height(), 0);
    }

    #[test]
    fn given_sequential_inserts_when_measuring_then_height_stays_logarithmic() {
        let mut tree = RbTree::new();
        for key in 0..1024 {
            tree.insert(key).unwrap();
        }
        let bh = tree.validate().unwrap();
        assert_eq!(bh, tree.black_height());
        // height <= 2 * log2(n + 1)
        assert!(tree.height() <= 20, "height {} too large", tree.height());
    }
}
