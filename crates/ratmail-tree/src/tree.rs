//! The contract every navigable hierarchy implements.
//!
//! A tree is addressed through opaque positions. Implementations pick their
//! own position type (index paths, filesystem paths, tagged composites) and
//! answer five navigation questions about it. Everything else in this crate,
//! from depth-first traversal to decoration, is derived from those answers.

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::TreeError;

/// Handle identifying one node of one tree instance.
pub trait Position: Clone + Eq + Ord + Hash + Debug {}

impl<T: Clone + Eq + Ord + Hash + Debug> Position for T {}

/// A hierarchy navigated via positions.
///
/// All methods must be pure functions of the tree state and the position:
/// overlays and decorators call them repeatedly and cache nothing.
/// The navigation functions must agree with each other, e.g.
/// `parent(first_child(p)) == p` whenever `first_child(p)` exists.
///
/// A tree may be a forest: further top-level nodes are reachable from
/// `root()` through `next_sibling`.
pub trait PositionedTree {
    type Position: Position;
    type Content;

    /// First top-level position, `None` for an empty tree.
    fn root(&self) -> Option<Self::Position>;

    /// Payload stored at `pos`.
    fn get(&self, pos: &Self::Position) -> Result<Self::Content, TreeError>;

    fn parent(&self, pos: &Self::Position) -> Option<Self::Position>;

    fn first_child(&self, pos: &Self::Position) -> Option<Self::Position>;

    fn last_child(&self, pos: &Self::Position) -> Option<Self::Position>;

    fn next_sibling(&self, pos: &Self::Position) -> Option<Self::Position>;

    fn prev_sibling(&self, pos: &Self::Position) -> Option<Self::Position>;

    fn is_leaf(&self, pos: &Self::Position) -> bool {
        self.first_child(pos).is_none()
    }

    /// Number of `parent` steps up to a top-level position.
    ///
    /// Walks iteratively so pathological depths cannot exhaust the stack;
    /// trees whose positions encode depth should override this.
    fn depth(&self, pos: &Self::Position) -> usize {
        let mut depth = 0;
        let mut current = self.parent(pos);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(&parent);
        }
        depth
    }
}

/// Trees whose subtrees can be hidden without touching the data.
pub trait Collapse: PositionedTree {
    fn is_collapsed(&self, pos: &Self::Position) -> bool;

    fn collapse(&mut self, pos: &Self::Position);

    fn expand(&mut self, pos: &Self::Position);

    fn toggle(&mut self, pos: &Self::Position);

    fn collapse_all(&mut self);

    fn expand_all(&mut self);
}

/// Trees whose nodes may carry a nested tree of their own.
pub trait Subtrees: PositionedTree {
    type Subtree: PositionedTree;

    /// The nested tree attached to `pos`, if any.
    fn subtree(&self, pos: &Self::Position) -> Option<&Self::Subtree>;
}
