//! In-memory trees and forests built from nested node lists.

use crate::error::TreeError;
use crate::tree::PositionedTree;

/// Index path from the top level down to a node.
///
/// `[0]` is the first top-level node, `[0, 2]` its third child. Paths order
/// lexicographically, which coincides with depth-first order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreePath(Vec<usize>);

impl TreePath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn top(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    fn with_last(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        if let Some(last) = indices.last_mut() {
            *last = index;
        }
        Self(indices)
    }

    fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }
}

impl From<Vec<usize>> for TreePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixedNode<T> {
    pub content: T,
    pub children: Vec<FixedNode<T>>,
}

impl<T> FixedNode<T> {
    pub fn new(content: T, children: Vec<FixedNode<T>>) -> Self {
        Self { content, children }
    }

    pub fn leaf(content: T) -> Self {
        Self {
            content,
            children: Vec::new(),
        }
    }

    pub fn child(mut self, node: FixedNode<T>) -> Self {
        self.children.push(node);
        self
    }

    /// Number of nodes in this subtree, including itself.
    pub fn count(&self) -> usize {
        let mut stack = vec![self];
        let mut count = 0;
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

// Deep reply chains would overflow the stack under the default recursive drop.
impl<T> Drop for FixedNode<T> {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// A static tree or forest held entirely in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedTree<T> {
    roots: Vec<FixedNode<T>>,
}

impl<T> Default for FixedTree<T> {
    fn default() -> Self {
        Self { roots: Vec::new() }
    }
}

impl<T> FixedTree<T> {
    pub fn new(roots: Vec<FixedNode<T>>) -> Self {
        Self { roots }
    }

    pub fn single(root: FixedNode<T>) -> Self {
        Self { roots: vec![root] }
    }

    pub fn roots(&self) -> &[FixedNode<T>] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.roots.iter().map(FixedNode::count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn node(&self, pos: &TreePath) -> Option<&FixedNode<T>> {
        let (first, rest) = pos.indices().split_first()?;
        let mut node = self.roots.get(*first)?;
        for index in rest {
            node = node.children.get(*index)?;
        }
        Some(node)
    }

    /// The sibling list `pos` lives in.
    fn siblings(&self, pos: &TreePath) -> Option<&[FixedNode<T>]> {
        match pos.parent() {
            Some(parent) => self.node(&parent).map(|node| node.children.as_slice()),
            None if pos.indices().len() == 1 => Some(self.roots.as_slice()),
            None => None,
        }
    }

    /// All positions paired with their content, in depth-first order.
    pub fn iter(&self) -> impl Iterator<Item = (TreePath, &T)> + '_ {
        let mut stack: Vec<(TreePath, &FixedNode<T>)> = self
            .roots
            .iter()
            .enumerate()
            .rev()
            .map(|(idx, node)| (TreePath::top(idx), node))
            .collect();
        std::iter::from_fn(move || {
            let (path, node) = stack.pop()?;
            for (idx, child) in node.children.iter().enumerate().rev() {
                stack.push((path.child(idx), child));
            }
            Some((path, &node.content))
        })
    }
}

impl<T: Clone> PositionedTree for FixedTree<T> {
    type Position = TreePath;
    type Content = T;

    fn root(&self) -> Option<TreePath> {
        if self.roots.is_empty() {
            None
        } else {
            Some(TreePath::top(0))
        }
    }

    fn get(&self, pos: &TreePath) -> Result<T, TreeError> {
        self.node(pos)
            .map(|node| node.content.clone())
            .ok_or_else(|| TreeError::not_found(pos))
    }

    fn parent(&self, pos: &TreePath) -> Option<TreePath> {
        self.node(pos)?;
        pos.parent()
    }

    fn first_child(&self, pos: &TreePath) -> Option<TreePath> {
        let node = self.node(pos)?;
        if node.children.is_empty() {
            None
        } else {
            Some(pos.child(0))
        }
    }

    fn last_child(&self, pos: &TreePath) -> Option<TreePath> {
        let node = self.node(pos)?;
        node.children.len().checked_sub(1).map(|idx| pos.child(idx))
    }

    fn next_sibling(&self, pos: &TreePath) -> Option<TreePath> {
        let siblings = self.siblings(pos)?;
        let idx = pos.last()?;
        if idx + 1 < siblings.len() {
            Some(pos.with_last(idx + 1))
        } else {
            None
        }
    }

    fn prev_sibling(&self, pos: &TreePath) -> Option<TreePath> {
        let siblings = self.siblings(pos)?;
        let idx = pos.last()?;
        if idx == 0 || idx >= siblings.len() {
            None
        } else {
            Some(pos.with_last(idx - 1))
        }
    }

    fn is_leaf(&self, pos: &TreePath) -> bool {
        self.node(pos).is_none_or(|node| node.children.is_empty())
    }

    fn depth(&self, pos: &TreePath) -> usize {
        pos.indices().len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::{FixedNode, FixedTree, TreePath};
    use crate::error::TreeError;
    use crate::tree::PositionedTree;

    fn sample() -> FixedTree<&'static str> {
        FixedTree::new(vec![
            FixedNode::new(
                "a",
                vec![
                    FixedNode::leaf("a1"),
                    FixedNode::new("a2", vec![FixedNode::leaf("a2x")]),
                ],
            ),
            FixedNode::leaf("b"),
        ])
    }

    #[test]
    fn navigation_follows_nested_lists() {
        let tree = sample();
        let a = TreePath::top(0);
        assert_eq!(tree.root(), Some(a.clone()));
        assert_eq!(tree.first_child(&a), Some(TreePath::new(vec![0, 0])));
        assert_eq!(tree.last_child(&a), Some(TreePath::new(vec![0, 1])));
        assert_eq!(tree.next_sibling(&a), Some(TreePath::top(1)));
        assert_eq!(tree.prev_sibling(&TreePath::top(1)), Some(a.clone()));
        assert_eq!(tree.parent(&TreePath::new(vec![0, 1, 0])), Some(TreePath::new(vec![0, 1])));
        assert_eq!(tree.parent(&a), None);
        assert_eq!(tree.next_sibling(&TreePath::top(1)), None);
        assert_eq!(tree.depth(&TreePath::new(vec![0, 1, 0])), 2);
        assert!(tree.is_leaf(&TreePath::top(1)));
        assert!(!tree.is_leaf(&a));
    }

    #[test]
    fn stale_positions_resolve_to_nothing() {
        let tree = sample();
        let stale = TreePath::new(vec![0, 7]);
        assert!(matches!(tree.get(&stale), Err(TreeError::NotFound { .. })));
        assert_eq!(tree.parent(&stale), None);
        assert_eq!(tree.next_sibling(&stale), None);
        assert_eq!(tree.prev_sibling(&stale), None);
        assert_eq!(tree.first_child(&stale), None);
    }

    #[test]
    fn children_point_back_to_their_parent() {
        let tree = sample();
        for (pos, _) in tree.iter() {
            if let Some(child) = tree.first_child(&pos) {
                assert_eq!(tree.parent(&child), Some(pos.clone()));
            }
            if let Some(child) = tree.last_child(&pos) {
                assert_eq!(tree.parent(&child), Some(pos.clone()));
            }
            if let Some(prev) = tree.prev_sibling(&pos) {
                assert_eq!(tree.next_sibling(&prev), Some(pos.clone()));
            }
        }
    }

    #[test]
    fn empty_forest_has_no_root() {
        let tree: FixedTree<u8> = FixedTree::default();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn iter_yields_depth_first_content() {
        let tree = sample();
        let content: Vec<&str> = tree.iter().map(|(_, c)| *c).collect();
        assert_eq!(content, vec!["a", "a1", "a2", "a2x", "b"]);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn deep_chains_count_and_drop() {
        let mut node = FixedNode::leaf(0);
        for depth in 1..200_000 {
            node = FixedNode::new(depth, vec![node]);
        }
        let tree = FixedTree::single(node);
        assert_eq!(tree.len(), 200_000);
        let deepest = TreePath::from(vec![0; 200_000]);
        assert_eq!(tree.get(&deepest).ok(), Some(0));
        assert_eq!(tree.depth(&deepest), 199_999);
        drop(tree);
    }
}
