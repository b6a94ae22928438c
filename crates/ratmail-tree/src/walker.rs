//! Lazily realized, scrollable list view over a tree.

use std::collections::HashMap;

use log::{debug, warn};

use crate::decoration::{DecoratedLine, Decorator};
use crate::traverse::Traverse;
use crate::tree::PositionedTree;

/// Turns a content payload into a renderable box.
pub trait BoxFactory<C> {
    type Widget;

    fn make_box(&self, content: C) -> Self::Widget;
}

impl<C, W, F> BoxFactory<C> for F
where
    F: Fn(C) -> W,
{
    type Widget = W;

    fn make_box(&self, content: C) -> W {
        self(content)
    }
}

/// Decorated widget line produced by a walker.
pub type WalkerLine<T, D, F> = DecoratedLine<
    <F as BoxFactory<<T as PositionedTree>::Content>>::Widget,
    <D as Decorator<T>>::Style,
>;

struct Entry<P, L> {
    position: P,
    line: L,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkerState {
    /// Nothing realized yet.
    Empty,
    /// Some positions realized, more may follow.
    Populated,
    /// Forward traversal ended; the buffer holds every reachable position.
    Exhausted,
}

/// Adapts a tree into a linear list that grows one depth-first step at a time.
///
/// Realized entries always form a prefix of the depth-first order. Moving
/// backwards never touches the tree; moving past the last realized entry
/// realizes exactly one more. Once traversal ends the walker stays exhausted
/// until it is reset or rebuilt.
pub struct ViewportWalker<T, D, F>
where
    T: PositionedTree,
    D: Decorator<T>,
    F: BoxFactory<T::Content>,
{
    tree: T,
    decorator: D,
    factory: F,
    entries: Vec<Entry<T::Position, WalkerLine<T, D, F>>>,
    index: HashMap<T::Position, usize>,
    focus: usize,
    exhausted: bool,
    changed: bool,
}

impl<T, D, F> ViewportWalker<T, D, F>
where
    T: PositionedTree,
    D: Decorator<T>,
    F: BoxFactory<T::Content>,
{
    pub fn new(tree: T, decorator: D, factory: F) -> Self {
        Self {
            tree,
            decorator,
            factory,
            entries: Vec::new(),
            index: HashMap::new(),
            focus: 0,
            exhausted: false,
            changed: true,
        }
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn decorator(&self) -> &D {
        &self.decorator
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn state(&self) -> WalkerState {
        if self.exhausted {
            WalkerState::Exhausted
        } else if self.entries.is_empty() {
            WalkerState::Empty
        } else {
            WalkerState::Populated
        }
    }

    /// Realizes one more position. Returns `false` at the end of traversal.
    pub fn realize_next(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        let next = match self.entries.last() {
            None => self.tree.first_position(),
            Some(last) => self.tree.next_position(&last.position),
        };
        let Some(position) = next else {
            debug!("walker exhausted after {} entries", self.entries.len());
            self.exhausted = true;
            return false;
        };
        debug_assert!(
            self.tree
                .parent(&position)
                .is_none_or(|parent| self.index.contains_key(&parent)),
            "{:?} realized before its parent",
            position
        );
        let content = match self.tree.get(&position) {
            Ok(content) => content,
            Err(err) => {
                warn!("walker stopped at {:?}: {}", position, err);
                self.exhausted = true;
                return false;
            }
        };
        let widget = self.factory.make_box(content);
        let line = self.decorator.decorate(&self.tree, &position, widget);
        self.index.insert(position.clone(), self.entries.len());
        self.entries.push(Entry { position, line });
        true
    }

    /// Realizes entries until `pos` is in the buffer; `None` if it never appears.
    pub fn realize_until(&mut self, pos: &T::Position) -> Option<usize> {
        loop {
            if let Some(idx) = self.index.get(pos) {
                return Some(*idx);
            }
            if !self.realize_next() {
                return None;
            }
        }
    }

    /// Line and position under the focus, realizing the first entry if needed.
    pub fn get_focus(&mut self) -> Option<(&WalkerLine<T, D, F>, &T::Position)> {
        if self.entries.is_empty() {
            self.realize_next();
        }
        self.entry(self.focus)
    }

    /// The entry one step after `pos`, growing the buffer by at most one.
    pub fn get_next(&mut self, pos: &T::Position) -> Option<(&WalkerLine<T, D, F>, &T::Position)> {
        let idx = *self.index.get(pos)? + 1;
        if idx == self.entries.len() && !self.realize_next() {
            return None;
        }
        self.entry(idx)
    }

    /// The entry one step before `pos`; always already realized.
    pub fn get_prev(&self, pos: &T::Position) -> Option<(&WalkerLine<T, D, F>, &T::Position)> {
        let idx = self.index.get(pos)?.checked_sub(1)?;
        self.entry(idx)
    }

    /// Moves the focus to `pos`. Returns `false` if the position is not reachable.
    pub fn set_focus(&mut self, pos: &T::Position) -> bool {
        match self.realize_until(pos) {
            Some(idx) => {
                if idx != self.focus {
                    self.focus = idx;
                    self.changed = true;
                }
                true
            }
            None => false,
        }
    }

    pub fn focus(&self) -> Option<&T::Position> {
        self.entries.get(self.focus).map(|entry| &entry.position)
    }

    pub fn focus_index(&self) -> usize {
        self.focus
    }

    pub fn entry(&self, idx: usize) -> Option<(&WalkerLine<T, D, F>, &T::Position)> {
        self.entries
            .get(idx)
            .map(|entry| (&entry.line, &entry.position))
    }

    pub fn index_of(&self, pos: &T::Position) -> Option<usize> {
        self.index.get(pos).copied()
    }

    /// Realized entries in depth-first order.
    pub fn iter(&self) -> impl Iterator<Item = (&WalkerLine<T, D, F>, &T::Position)> + '_ {
        self.entries
            .iter()
            .map(|entry| (&entry.line, &entry.position))
    }

    /// Returns whether a re-render was requested since the last call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Drops every realized entry; the focus returns to the first position.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.focus = 0;
        self.exhausted = false;
        self.changed = true;
    }

    /// Mutates the tree in place (e.g. collapse state) and re-realizes the
    /// buffer, keeping the focus on the same position or its nearest visible
    /// ancestor.
    pub fn update<R>(&mut self, mutate: impl FnOnce(&mut T) -> R) -> R {
        let result = mutate(&mut self.tree);
        self.refresh();
        result
    }

    pub fn set_decorator(&mut self, decorator: D) {
        self.decorator = decorator;
        self.refresh();
    }

    fn refresh(&mut self) {
        let focus = self.focus().cloned();
        self.reset();
        if let Some(focus) = focus {
            self.restore_focus(&focus);
        }
    }

    /// Replaces the tree wholesale. The old focus is carried over when
    /// `remap` finds an equivalent position in the new tree (or its nearest
    /// visible ancestor), otherwise the focus falls back to the first entry.
    pub fn rebuild<M>(&mut self, tree: T, remap: M)
    where
        M: FnOnce(&T, &T::Position) -> Option<T::Position>,
    {
        let focus = self.focus().cloned();
        self.tree = tree;
        self.reset();
        let target = focus.and_then(|old| remap(&self.tree, &old));
        if let Some(target) = target {
            self.restore_focus(&target);
        }
    }

    /// Nearest position at or above `pos` that is still shown: stale
    /// positions are replaced by their closest surviving ancestor, then the
    /// topmost collapsed ancestor wins.
    ///
    /// Costs a few tree queries per level and realizes nothing.
    fn visible_anchor(&self, pos: &T::Position) -> Option<T::Position> {
        let mut anchor = pos.clone();
        while self.tree.get(&anchor).is_err() {
            anchor = self.tree.parent(&anchor)?;
        }
        let mut current = self.tree.parent(&anchor);
        while let Some(ancestor) = current {
            if self.tree.first_child(&ancestor).is_none() {
                anchor = ancestor.clone();
            }
            current = self.tree.parent(&ancestor);
        }
        Some(anchor)
    }

    fn restore_focus(&mut self, focus: &T::Position) {
        let anchor = self.visible_anchor(focus);
        if anchor.as_ref().is_some_and(|anchor| self.set_focus(anchor)) {
            return;
        }
        debug!("focus {:?} did not survive, falling back", focus);
        // Whatever was realized on the way is searched for an ancestor.
        let mut current = self.tree.parent(focus);
        while let Some(ancestor) = current {
            if let Some(idx) = self.index_of(&ancestor) {
                self.focus = idx;
                return;
            }
            current = self.tree.parent(&ancestor);
        }
        self.focus = 0;
    }
}
