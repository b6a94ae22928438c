//! Collapse overlay: hides descendants without mutating the wrapped tree.

use std::collections::HashSet;
use std::fmt;

use crate::error::TreeError;
use crate::tree::{Collapse, PositionedTree};

/// Initial collapse status, consulted with read access to the wrapped tree.
pub type CollapsePredicate<T> = Box<dyn Fn(&T, &<T as PositionedTree>::Position) -> bool>;

enum Initial<T: PositionedTree> {
    Constant(bool),
    Predicate(CollapsePredicate<T>),
}

/// Wraps a tree and hides the children of collapsed positions.
///
/// A position is collapsed when the predicate says so, XOR when it appears in
/// the override set. Only `first_child` and `last_child` change behaviour;
/// every other query goes straight to the wrapped tree.
pub struct Collapsible<T: PositionedTree> {
    tree: T,
    initial: Initial<T>,
    toggled: HashSet<T::Position>,
}

impl<T: PositionedTree> Collapsible<T> {
    /// Wraps `tree` with everything expanded.
    pub fn new(tree: T) -> Self {
        Self {
            tree,
            initial: Initial::Constant(false),
            toggled: HashSet::new(),
        }
    }

    pub fn with_predicate<F>(tree: T, predicate: F) -> Self
    where
        F: Fn(&T, &T::Position) -> bool + 'static,
    {
        Self {
            tree,
            initial: Initial::Predicate(Box::new(predicate)),
            toggled: HashSet::new(),
        }
    }

    /// Positions deeper than `depth` start out collapsed.
    pub fn collapsed_below(tree: T, depth: usize) -> Self
    where
        T: 'static,
    {
        Self::with_predicate(tree, move |tree: &T, pos: &T::Position| tree.depth(pos) >= depth)
    }

    pub fn inner(&self) -> &T {
        &self.tree
    }

    fn flip(&mut self, pos: &T::Position) {
        if !self.toggled.remove(pos) {
            self.toggled.insert(pos.clone());
        }
    }
}

impl<T: PositionedTree> fmt::Debug for Collapsible<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collapsible")
            .field("tree", &self.tree)
            .field("toggled", &self.toggled)
            .finish_non_exhaustive()
    }
}

impl<T: PositionedTree> PositionedTree for Collapsible<T> {
    type Position = T::Position;
    type Content = T::Content;

    fn root(&self) -> Option<T::Position> {
        self.tree.root()
    }

    fn get(&self, pos: &T::Position) -> Result<T::Content, TreeError> {
        self.tree.get(pos)
    }

    fn parent(&self, pos: &T::Position) -> Option<T::Position> {
        self.tree.parent(pos)
    }

    fn first_child(&self, pos: &T::Position) -> Option<T::Position> {
        if self.is_collapsed(pos) {
            None
        } else {
            self.tree.first_child(pos)
        }
    }

    fn last_child(&self, pos: &T::Position) -> Option<T::Position> {
        if self.is_collapsed(pos) {
            None
        } else {
            self.tree.last_child(pos)
        }
    }

    fn next_sibling(&self, pos: &T::Position) -> Option<T::Position> {
        self.tree.next_sibling(pos)
    }

    fn prev_sibling(&self, pos: &T::Position) -> Option<T::Position> {
        self.tree.prev_sibling(pos)
    }

    // Leafness is structural: a collapsed node still has children.
    fn is_leaf(&self, pos: &T::Position) -> bool {
        self.tree.is_leaf(pos)
    }

    fn depth(&self, pos: &T::Position) -> usize {
        self.tree.depth(pos)
    }
}

impl<T: PositionedTree> Collapse for Collapsible<T> {
    fn is_collapsed(&self, pos: &T::Position) -> bool {
        let initial = match &self.initial {
            Initial::Constant(value) => *value,
            Initial::Predicate(predicate) => predicate(&self.tree, pos),
        };
        initial ^ self.toggled.contains(pos)
    }

    fn collapse(&mut self, pos: &T::Position) {
        if !self.tree.is_leaf(pos) && !self.is_collapsed(pos) {
            self.flip(pos);
        }
    }

    fn expand(&mut self, pos: &T::Position) {
        if !self.tree.is_leaf(pos) && self.is_collapsed(pos) {
            self.flip(pos);
        }
    }

    fn toggle(&mut self, pos: &T::Position) {
        if !self.tree.is_leaf(pos) {
            self.flip(pos);
        }
    }

    fn collapse_all(&mut self) {
        self.initial = Initial::Constant(true);
        self.toggled.clear();
    }

    fn expand_all(&mut self) {
        self.initial = Initial::Constant(false);
        self.toggled.clear();
    }
}
