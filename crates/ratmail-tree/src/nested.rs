//! Composition overlay: flattens trees nested inside tree nodes.
//!
//! Nodes of an outer tree may carry a subtree (see [`Subtrees`]). The
//! overlay presents outer and nested nodes as one position space, tagging
//! every position with the outer node it belongs to so positions stay unique
//! across trees.
//!
//! Covered nodes, i.e. outer nodes carrying a non-empty subtree, are handled
//! according to `interpret_covered`:
//!
//! - `true`: the covered node stays focusable. Its children are the subtree's
//!   top-level nodes followed by its own outer children.
//! - `false`: the subtree's top-level nodes take the covered node's place in
//!   its sibling chain. The covered node and its outer children are not
//!   reachable.
//!
//! A node whose subtree is empty behaves like an ordinary outer node.

use crate::error::TreeError;
use crate::traverse::Traverse;
use crate::tree::{PositionedTree, Subtrees};

/// Position in a composed tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NestedPosition<O, I> {
    /// A node of the outer tree.
    Outer(O),
    /// A node of the subtree attached to the outer node.
    Inner(O, I),
}

impl<O, I> NestedPosition<O, I> {
    pub fn outer(&self) -> &O {
        match self {
            Self::Outer(outer) | Self::Inner(outer, _) => outer,
        }
    }

    pub fn inner(&self) -> Option<&I> {
        match self {
            Self::Outer(_) => None,
            Self::Inner(_, inner) => Some(inner),
        }
    }
}

/// Payload of a composed position.
#[derive(Debug, Clone, PartialEq)]
pub enum NestedContent<O, I> {
    Outer(O),
    Inner(I),
}

type OuterPos<T> = <T as PositionedTree>::Position;
type InnerPos<T> = <<T as Subtrees>::Subtree as PositionedTree>::Position;
type Pos<T> = NestedPosition<OuterPos<T>, InnerPos<T>>;

#[derive(Debug, Clone)]
pub struct NestedTree<T> {
    tree: T,
    interpret_covered: bool,
}

impl<T: Subtrees> NestedTree<T> {
    pub fn new(tree: T, interpret_covered: bool) -> Self {
        Self {
            tree,
            interpret_covered,
        }
    }

    pub fn inner(&self) -> &T {
        &self.tree
    }

    /// Subtree and its root when `pos` covers a non-empty subtree.
    fn covers(&self, pos: &OuterPos<T>) -> Option<(&T::Subtree, InnerPos<T>)> {
        let subtree = self.tree.subtree(pos)?;
        let root = subtree.root()?;
        Some((subtree, root))
    }

    /// Composed position standing in for the start of outer slot `pos`.
    fn enter(&self, pos: OuterPos<T>) -> Pos<T> {
        if !self.interpret_covered {
            if let Some((_, root)) = self.covers(&pos) {
                return NestedPosition::Inner(pos, root);
            }
        }
        NestedPosition::Outer(pos)
    }

    /// Composed position standing in for the end of outer slot `pos`.
    fn enter_last(&self, pos: OuterPos<T>) -> Pos<T> {
        if !self.interpret_covered {
            if let Some((subtree, root)) = self.covers(&pos) {
                let last = subtree.last_sibling(&root);
                return NestedPosition::Inner(pos, last);
            }
        }
        NestedPosition::Outer(pos)
    }

    fn is_hidden(&self, pos: &OuterPos<T>) -> bool {
        !self.interpret_covered && self.covers(pos).is_some()
    }
}

impl<T: Subtrees> PositionedTree for NestedTree<T> {
    type Position = Pos<T>;
    type Content = NestedContent<T::Content, <T::Subtree as PositionedTree>::Content>;

    fn root(&self) -> Option<Pos<T>> {
        self.tree.root().map(|root| self.enter(root))
    }

    fn get(&self, pos: &Pos<T>) -> Result<Self::Content, TreeError> {
        match pos {
            NestedPosition::Outer(outer) => self.tree.get(outer).map(NestedContent::Outer),
            NestedPosition::Inner(outer, inner) => {
                let subtree = self
                    .tree
                    .subtree(outer)
                    .ok_or_else(|| TreeError::not_found(pos))?;
                subtree.get(inner).map(NestedContent::Inner)
            }
        }
    }

    fn parent(&self, pos: &Pos<T>) -> Option<Pos<T>> {
        match pos {
            NestedPosition::Outer(outer) => self.tree.parent(outer).map(NestedPosition::Outer),
            NestedPosition::Inner(outer, inner) => {
                let subtree = self.tree.subtree(outer)?;
                match subtree.parent(inner) {
                    Some(parent) => Some(NestedPosition::Inner(outer.clone(), parent)),
                    None if self.interpret_covered => Some(NestedPosition::Outer(outer.clone())),
                    None => self.tree.parent(outer).map(NestedPosition::Outer),
                }
            }
        }
    }

    fn first_child(&self, pos: &Pos<T>) -> Option<Pos<T>> {
        match pos {
            NestedPosition::Outer(outer) => {
                if self.is_hidden(outer) {
                    return None;
                }
                if let Some((_, root)) = self.covers(outer) {
                    return Some(NestedPosition::Inner(outer.clone(), root));
                }
                self.tree.first_child(outer).map(|child| self.enter(child))
            }
            NestedPosition::Inner(outer, inner) => {
                let subtree = self.tree.subtree(outer)?;
                subtree
                    .first_child(inner)
                    .map(|child| NestedPosition::Inner(outer.clone(), child))
            }
        }
    }

    fn last_child(&self, pos: &Pos<T>) -> Option<Pos<T>> {
        match pos {
            NestedPosition::Outer(outer) => {
                if self.is_hidden(outer) {
                    return None;
                }
                if let Some(child) = self.tree.last_child(outer) {
                    return Some(self.enter_last(child));
                }
                let (subtree, root) = self.covers(outer)?;
                Some(NestedPosition::Inner(
                    outer.clone(),
                    subtree.last_sibling(&root),
                ))
            }
            NestedPosition::Inner(outer, inner) => {
                let subtree = self.tree.subtree(outer)?;
                subtree
                    .last_child(inner)
                    .map(|child| NestedPosition::Inner(outer.clone(), child))
            }
        }
    }

    fn next_sibling(&self, pos: &Pos<T>) -> Option<Pos<T>> {
        match pos {
            NestedPosition::Outer(outer) => {
                self.tree.next_sibling(outer).map(|next| self.enter(next))
            }
            NestedPosition::Inner(outer, inner) => {
                let subtree = self.tree.subtree(outer)?;
                if let Some(next) = subtree.next_sibling(inner) {
                    return Some(NestedPosition::Inner(outer.clone(), next));
                }
                if subtree.parent(inner).is_some() {
                    return None;
                }
                // Leaving the subtree's top level.
                if self.interpret_covered {
                    self.tree.first_child(outer).map(|child| self.enter(child))
                } else {
                    self.tree.next_sibling(outer).map(|next| self.enter(next))
                }
            }
        }
    }

    fn prev_sibling(&self, pos: &Pos<T>) -> Option<Pos<T>> {
        match pos {
            NestedPosition::Outer(outer) => {
                if let Some(prev) = self.tree.prev_sibling(outer) {
                    return Some(self.enter_last(prev));
                }
                if !self.interpret_covered {
                    return None;
                }
                // First outer child of a covered node follows the subtree.
                let parent = self.tree.parent(outer)?;
                let (subtree, root) = self.covers(&parent)?;
                Some(NestedPosition::Inner(parent, subtree.last_sibling(&root)))
            }
            NestedPosition::Inner(outer, inner) => {
                let subtree = self.tree.subtree(outer)?;
                if let Some(prev) = subtree.prev_sibling(inner) {
                    return Some(NestedPosition::Inner(outer.clone(), prev));
                }
                if subtree.parent(inner).is_some() || self.interpret_covered {
                    return None;
                }
                self.tree.prev_sibling(outer).map(|prev| self.enter_last(prev))
            }
        }
    }

    fn depth(&self, pos: &Pos<T>) -> usize {
        match pos {
            NestedPosition::Outer(outer) => self.tree.depth(outer),
            NestedPosition::Inner(outer, inner) => {
                let nested = self
                    .tree
                    .subtree(outer)
                    .map_or(0, |subtree| subtree.depth(inner));
                self.tree.depth(outer) + nested + usize::from(self.interpret_covered)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{NestedContent, NestedPosition, NestedTree};
    use crate::error::TreeError;
    use crate::fixed::{FixedNode, FixedTree, TreePath};
    use crate::traverse::{Traverse, check_structure};
    use crate::tree::{PositionedTree, Subtrees};

    /// Outer tree whose nodes may carry a nested tree.
    struct Thread {
        outer: FixedTree<&'static str>,
        parts: HashMap<TreePath, FixedTree<&'static str>>,
    }

    impl PositionedTree for Thread {
        type Position = TreePath;
        type Content = &'static str;

        fn root(&self) -> Option<TreePath> {
            self.outer.root()
        }

        fn get(&self, pos: &TreePath) -> Result<&'static str, TreeError> {
            self.outer.get(pos)
        }

        fn parent(&self, pos: &TreePath) -> Option<TreePath> {
            self.outer.parent(pos)
        }

        fn first_child(&self, pos: &TreePath) -> Option<TreePath> {
            self.outer.first_child(pos)
        }

        fn last_child(&self, pos: &TreePath) -> Option<TreePath> {
            self.outer.last_child(pos)
        }

        fn next_sibling(&self, pos: &TreePath) -> Option<TreePath> {
            self.outer.next_sibling(pos)
        }

        fn prev_sibling(&self, pos: &TreePath) -> Option<TreePath> {
            self.outer.prev_sibling(pos)
        }
    }

    impl Subtrees for Thread {
        type Subtree = FixedTree<&'static str>;

        fn subtree(&self, pos: &TreePath) -> Option<&FixedTree<&'static str>> {
            self.parts.get(pos)
        }
    }

    // m1 -> [m2 -> [m3]], m4; m1 and m3 carry nested parts.
    fn thread() -> Thread {
        let outer = FixedTree::new(vec![
            FixedNode::new(
                "m1",
                vec![FixedNode::new("m2", vec![FixedNode::leaf("m3")])],
            ),
            FixedNode::leaf("m4"),
        ]);
        let mut parts = HashMap::new();
        parts.insert(
            TreePath::top(0),
            FixedTree::new(vec![
                FixedNode::new("m1.head", vec![FixedNode::leaf("m1.from")]),
                FixedNode::leaf("m1.body"),
            ]),
        );
        parts.insert(
            TreePath::new(vec![0, 0, 0]),
            FixedTree::single(FixedNode::leaf("m3.body")),
        );
        parts.insert(TreePath::top(1), FixedTree::default());
        Thread { outer, parts }
    }

    fn labels<T>(tree: &T) -> Vec<&'static str>
    where
        T: PositionedTree<Content = NestedContent<&'static str, &'static str>>,
    {
        tree.positions(false)
            .filter_map(|pos| tree.get(&pos).ok())
            .map(|content| match content {
                NestedContent::Outer(label) | NestedContent::Inner(label) => label,
            })
            .collect()
    }

    #[test]
    fn covered_nodes_stay_reachable_when_interpreted() {
        let tree = NestedTree::new(thread(), true);
        assert_eq!(
            labels(&tree),
            vec!["m1", "m1.head", "m1.from", "m1.body", "m2", "m3", "m3.body", "m4"]
        );
        assert_eq!(check_structure(&tree), Ok(()));
    }

    #[test]
    fn covered_nodes_are_replaced_when_not_interpreted() {
        let tree = NestedTree::new(thread(), false);
        assert_eq!(labels(&tree), vec!["m1.head", "m1.from", "m1.body", "m4"]);
        assert_eq!(check_structure(&tree), Ok(()));
    }

    #[test]
    fn reverse_traversal_crosses_tree_boundaries() {
        for covered in [true, false] {
            let tree = NestedTree::new(thread(), covered);
            let mut forward: Vec<_> = tree.positions(false).collect();
            forward.reverse();
            let backward: Vec<_> = tree.positions(true).collect();
            assert_eq!(backward, forward);
        }
    }

    #[test]
    fn depth_counts_both_trees() {
        let tree = NestedTree::new(thread(), true);
        let from = NestedPosition::Inner(TreePath::top(0), TreePath::new(vec![0, 0]));
        assert_eq!(tree.depth(&from), 2);
        let body = NestedPosition::Inner(TreePath::new(vec![0, 0, 0]), TreePath::top(0));
        assert_eq!(tree.depth(&body), 3);

        let flat = NestedTree::new(thread(), false);
        let from = NestedPosition::Inner(TreePath::top(0), TreePath::new(vec![0, 0]));
        assert_eq!(flat.depth(&from), 1);
    }

    #[test]
    fn positions_are_tagged_with_their_outer_node() {
        let tree = NestedTree::new(thread(), true);
        let root = tree.root().unwrap();
        assert_eq!(root, NestedPosition::Outer(TreePath::top(0)));
        let first = tree.first_child(&root).unwrap();
        assert_eq!(first.outer(), &TreePath::top(0));
        assert_eq!(first.inner(), Some(&TreePath::top(0)));
    }

    #[test]
    fn empty_subtrees_do_not_cover() {
        let tree = NestedTree::new(thread(), false);
        let m4 = NestedPosition::Outer(TreePath::top(1));
        assert_eq!(tree.get(&m4), Ok(NestedContent::Outer("m4")));
        assert!(tree.is_leaf(&m4));
    }

    #[test]
    fn inner_positions_of_unknown_outer_nodes_are_not_found() {
        let tree = NestedTree::new(thread(), true);
        let stale = NestedPosition::Inner(TreePath::new(vec![0, 0]), TreePath::top(0));
        assert!(matches!(tree.get(&stale), Err(TreeError::NotFound { .. })));
        assert_eq!(tree.parent(&stale), None);
    }
}
