//! Depth-first traversal derived from the five navigation primitives.

use crate::error::TreeError;
use crate::tree::PositionedTree;

/// Applies `step` until it yields nothing and returns the last position reached.
pub fn walk_until_stuck<P, F>(start: P, mut step: F) -> P
where
    F: FnMut(&P) -> Option<P>,
{
    let mut current = start;
    while let Some(next) = step(&current) {
        current = next;
    }
    current
}

/// Document-order navigation available on every [`PositionedTree`].
pub trait Traverse: PositionedTree {
    /// The position following `pos` in depth-first order.
    fn next_position(&self, pos: &Self::Position) -> Option<Self::Position> {
        if let Some(child) = self.first_child(pos) {
            return Some(child);
        }
        if let Some(sibling) = self.next_sibling(pos) {
            return Some(sibling);
        }
        self.next_of_kin(pos)
    }

    /// Next sibling of the nearest ancestor that has one.
    fn next_of_kin(&self, pos: &Self::Position) -> Option<Self::Position> {
        let mut current = self.parent(pos);
        while let Some(ancestor) = current {
            if let Some(sibling) = self.next_sibling(&ancestor) {
                return Some(sibling);
            }
            current = self.parent(&ancestor);
        }
        None
    }

    /// The position preceding `pos` in depth-first order.
    fn prev_position(&self, pos: &Self::Position) -> Option<Self::Position> {
        match self.prev_sibling(pos) {
            Some(sibling) => Some(self.last_descendant(&sibling)),
            None => self.parent(pos),
        }
    }

    fn last_descendant(&self, pos: &Self::Position) -> Self::Position {
        walk_until_stuck(pos.clone(), |p| self.last_child(p))
    }

    fn first_sibling(&self, pos: &Self::Position) -> Self::Position {
        walk_until_stuck(pos.clone(), |p| self.prev_sibling(p))
    }

    fn last_sibling(&self, pos: &Self::Position) -> Self::Position {
        walk_until_stuck(pos.clone(), |p| self.next_sibling(p))
    }

    /// Top-level ancestor of `pos` (itself when already top-level).
    fn top_ancestor(&self, pos: &Self::Position) -> Self::Position {
        walk_until_stuck(pos.clone(), |p| self.parent(p))
    }

    fn first_position(&self) -> Option<Self::Position> {
        self.root().map(|root| self.first_sibling(&root))
    }

    fn last_position(&self) -> Option<Self::Position> {
        let root = self.root()?;
        Some(self.last_descendant(&self.last_sibling(&root)))
    }

    /// Lazily enumerates every position, forwards or backwards.
    ///
    /// Each call starts over, so the sequence can be re-enumerated at will.
    fn positions(&self, reverse: bool) -> Positions<'_, Self> {
        let start = if reverse {
            self.last_position()
        } else {
            self.first_position()
        };
        Positions {
            tree: self,
            next: start,
            reverse,
        }
    }

    /// Enumerates positions starting at (and including) `start`.
    fn positions_from(&self, start: Self::Position, reverse: bool) -> Positions<'_, Self> {
        Positions {
            tree: self,
            next: Some(start),
            reverse,
        }
    }
}

impl<T: PositionedTree + ?Sized> Traverse for T {}

/// Iterator returned by [`Traverse::positions`].
pub struct Positions<'a, T: PositionedTree + ?Sized> {
    tree: &'a T,
    next: Option<T::Position>,
    reverse: bool,
}

impl<T: PositionedTree + ?Sized> Iterator for Positions<'_, T> {
    type Item = T::Position;

    fn next(&mut self) -> Option<T::Position> {
        let current = self.next.take()?;
        self.next = if self.reverse {
            self.tree.prev_position(&current)
        } else {
            self.tree.next_position(&current)
        };
        Some(current)
    }
}

/// Verifies the navigation invariants over every reachable position.
///
/// Meant for tests and debug tooling around custom tree implementations.
pub fn check_structure<T: PositionedTree + ?Sized>(tree: &T) -> Result<(), TreeError> {
    if let Some(root) = tree.root() {
        if tree.parent(&root).is_some() {
            return Err(TreeError::inconsistent(format!(
                "root {:?} has a parent",
                root
            )));
        }
    }
    for pos in tree.positions(false) {
        tree.get(&pos)?;
        for child in [tree.first_child(&pos), tree.last_child(&pos)].into_iter().flatten() {
            let parent = tree.parent(&child);
            if parent.as_ref() != Some(&pos) {
                return Err(TreeError::inconsistent(format!(
                    "child {:?} of {:?} reports parent {:?}",
                    child, pos, parent
                )));
            }
        }
        if let Some(next) = tree.next_sibling(&pos) {
            if tree.prev_sibling(&next).as_ref() != Some(&pos) {
                return Err(TreeError::inconsistent(format!(
                    "next sibling {:?} of {:?} does not lead back",
                    next, pos
                )));
            }
            if tree.parent(&next) != tree.parent(&pos) {
                return Err(TreeError::inconsistent(format!(
                    "siblings {:?} and {:?} disagree on their parent",
                    pos, next
                )));
            }
        }
        let expected_depth = tree.parent(&pos).map_or(0, |p| tree.depth(&p) + 1);
        if tree.depth(&pos) != expected_depth {
            return Err(TreeError::inconsistent(format!(
                "depth of {:?} is {}, expected {}",
                pos,
                tree.depth(&pos),
                expected_depth
            )));
        }
        if let Some(prev) = tree.prev_position(&pos) {
            if tree.next_position(&prev).as_ref() != Some(&pos) {
                return Err(TreeError::inconsistent(format!(
                    "depth-first order is not reversible at {:?}",
                    pos
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Traverse, check_structure, walk_until_stuck};
    use crate::fixed::{FixedNode, FixedTree, TreePath};
    use crate::tree::PositionedTree;

    fn names(tree: &FixedTree<&'static str>, reverse: bool) -> Vec<&'static str> {
        tree.positions(reverse)
            .map(|pos| tree.get(&pos).unwrap())
            .collect()
    }

    fn three_level() -> FixedTree<&'static str> {
        FixedTree::single(FixedNode::new(
            "Root",
            vec![
                FixedNode::new("A", vec![FixedNode::leaf("A1"), FixedNode::leaf("A2")]),
                FixedNode::leaf("B"),
            ],
        ))
    }

    fn forest() -> FixedTree<&'static str> {
        FixedTree::new(vec![
            FixedNode::new("t1", vec![FixedNode::new("t1a", vec![FixedNode::leaf("t1a1")])]),
            FixedNode::leaf("t2"),
            FixedNode::new("t3", vec![FixedNode::leaf("t3a"), FixedNode::leaf("t3b")]),
        ])
    }

    #[test]
    fn forward_order_visits_children_before_siblings() {
        assert_eq!(names(&three_level(), false), vec!["Root", "A", "A1", "A2", "B"]);
    }

    #[test]
    fn reverse_order_mirrors_forward_order() {
        let tree = forest();
        let mut forward = names(&tree, false);
        forward.reverse();
        assert_eq!(names(&tree, true), forward);
    }

    #[test]
    fn forests_continue_across_top_level_nodes() {
        assert_eq!(
            names(&forest(), false),
            vec!["t1", "t1a", "t1a1", "t2", "t3", "t3a", "t3b"]
        );
    }

    #[test]
    fn prev_and_next_are_inverse() {
        let tree = forest();
        for pos in tree.positions(false) {
            if let Some(prev) = tree.prev_position(&pos) {
                assert_eq!(tree.next_position(&prev), Some(pos.clone()));
            }
            if let Some(next) = tree.next_position(&pos) {
                assert_eq!(tree.prev_position(&next), Some(pos.clone()));
            }
        }
    }

    #[test]
    fn single_node_has_no_neighbours() {
        let tree = FixedTree::single(FixedNode::leaf("only"));
        let root = TreePath::top(0);
        assert_eq!(tree.next_position(&root), None);
        assert_eq!(tree.prev_position(&root), None);
        assert_eq!(tree.positions(false).count(), 1);
    }

    #[test]
    fn empty_tree_yields_nothing() {
        let tree: FixedTree<&str> = FixedTree::default();
        assert_eq!(tree.positions(false).count(), 0);
        assert_eq!(tree.positions(true).count(), 0);
        assert_eq!(tree.last_position(), None);
    }

    #[test]
    fn sibling_and_descendant_helpers_walk_to_the_end() {
        let tree = forest();
        let t1 = TreePath::top(0);
        assert_eq!(tree.last_sibling(&t1), TreePath::top(2));
        assert_eq!(tree.first_sibling(&TreePath::top(2)), t1);
        assert_eq!(tree.last_descendant(&t1), TreePath::new(vec![0, 0, 0]));
        assert_eq!(tree.last_position(), Some(TreePath::new(vec![2, 1])));
        assert_eq!(tree.top_ancestor(&TreePath::new(vec![0, 0, 0])), t1);
    }

    #[test]
    fn positions_restart_from_scratch() {
        let tree = three_level();
        let first: Vec<TreePath> = tree.positions(false).collect();
        let second: Vec<TreePath> = tree.positions(false).collect();
        assert_eq!(first, second);
        let tail: Vec<TreePath> = tree.positions_from(TreePath::new(vec![0, 0, 1]), false).collect();
        assert_eq!(tail, vec![TreePath::new(vec![0, 0, 1]), TreePath::new(vec![0, 1])]);
    }

    #[test]
    fn walk_until_stuck_returns_start_when_no_step() {
        assert_eq!(walk_until_stuck(3, |_| None::<i32>), 3);
        assert_eq!(walk_until_stuck(0, |n| if *n < 5 { Some(n + 1) } else { None }), 5);
    }

    #[test]
    fn fixed_trees_pass_the_structure_check() {
        assert_eq!(check_structure(&forest()), Ok(()));
        assert_eq!(check_structure(&three_level()), Ok(()));
    }
}
