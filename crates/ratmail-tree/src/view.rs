//! ratatui surface binding a walker to focus movement and collapse toggling.

use log::debug;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Text};
use ratatui::widgets::Widget;

use crate::decoration::Decorator;
use crate::traverse::Traverse;
use crate::tree::Collapse;
use crate::walker::{BoxFactory, ViewportWalker};

/// A content box that knows its height and how to highlight itself.
pub trait ItemWidget {
    /// Rows of the box; at least one.
    fn lines(&self, focused: bool) -> Vec<Line<'static>>;

    fn height(&self) -> usize {
        self.lines(false).len().max(1)
    }
}

/// Multi-line text box with a normal and a focused style.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemBox {
    text: Text<'static>,
    style: Style,
    focus_style: Style,
}

impl ItemBox {
    pub fn new(text: impl Into<Text<'static>>) -> Self {
        Self {
            text: text.into(),
            style: Style::default(),
            focus_style: Style::default(),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn focus_style(mut self, style: Style) -> Self {
        self.focus_style = style;
        self
    }
}

impl ItemWidget for ItemBox {
    fn lines(&self, focused: bool) -> Vec<Line<'static>> {
        let style = if focused { self.focus_style } else { self.style };
        if self.text.lines.is_empty() {
            return vec![Line::default().style(style)];
        }
        self.text
            .lines
            .iter()
            .cloned()
            .map(|line| line.patch_style(style))
            .collect()
    }

    fn height(&self) -> usize {
        self.text.lines.len().max(1)
    }
}

impl ItemWidget for String {
    fn lines(&self, _focused: bool) -> Vec<Line<'static>> {
        vec![Line::raw(self.clone())]
    }
}

/// Named navigation and collapse operations, bound to keys by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeAction {
    Next,
    Prev,
    Parent,
    FirstChild,
    LastChild,
    NextSibling,
    PrevSibling,
    FirstSibling,
    LastSibling,
    First,
    Last,
    NextUnfolded,
    PrevUnfolded,
    PageDown,
    PageUp,
    Toggle,
    Collapse,
    Expand,
    CollapseAll,
    ExpandAll,
}

/// Scrollable tree widget.
///
/// Render through `&mut TreeView`: drawing realizes entries on demand and
/// scrolls so that the focus stays visible.
pub struct TreeView<T, D, F>
where
    T: Collapse,
    D: Decorator<T>,
    F: BoxFactory<T::Content>,
{
    walker: ViewportWalker<T, D, F>,
    top: usize,
    height: usize,
}

impl<T, D, F> TreeView<T, D, F>
where
    T: Collapse,
    D: Decorator<T>,
    F: BoxFactory<T::Content>,
{
    pub fn new(tree: T, decorator: D, factory: F) -> Self {
        Self {
            walker: ViewportWalker::new(tree, decorator, factory),
            top: 0,
            height: 0,
        }
    }

    pub fn walker(&self) -> &ViewportWalker<T, D, F> {
        &self.walker
    }

    pub fn walker_mut(&mut self) -> &mut ViewportWalker<T, D, F> {
        &mut self.walker
    }

    pub fn tree(&self) -> &T {
        self.walker.tree()
    }

    pub fn focus(&self) -> Option<&T::Position> {
        self.walker.focus()
    }

    /// Index of the first entry drawn by the last render.
    pub fn top(&self) -> usize {
        self.top
    }

    pub fn set_decorator(&mut self, decorator: D) {
        self.walker.set_decorator(decorator);
    }

    /// Whether focus, collapse state or decoration changed since the last call.
    pub fn take_changed(&mut self) -> bool {
        self.walker.take_changed()
    }

    pub fn handle(&mut self, action: TreeAction) -> bool {
        match action {
            TreeAction::Next => self.focus_next(),
            TreeAction::Prev => self.focus_prev(),
            TreeAction::Parent => self.focus_parent(),
            TreeAction::FirstChild => self.focus_first_child(),
            TreeAction::LastChild => self.focus_last_child(),
            TreeAction::NextSibling => self.focus_next_sibling(),
            TreeAction::PrevSibling => self.focus_prev_sibling(),
            TreeAction::FirstSibling => self.focus_first_sibling(),
            TreeAction::LastSibling => self.focus_last_sibling(),
            TreeAction::First => self.focus_first(),
            TreeAction::Last => self.focus_last(),
            TreeAction::NextUnfolded => self.focus_next_unfolded(),
            TreeAction::PrevUnfolded => self.focus_prev_unfolded(),
            TreeAction::PageDown => self.page_down(),
            TreeAction::PageUp => self.page_up(),
            TreeAction::Toggle => self.toggle_focused(),
            TreeAction::Collapse => self.collapse_focused(),
            TreeAction::Expand => self.expand_focused(),
            TreeAction::CollapseAll => self.collapse_all(),
            TreeAction::ExpandAll => self.expand_all(),
        }
    }

    fn current(&mut self) -> Option<T::Position> {
        self.walker.get_focus().map(|(_, pos)| pos.clone())
    }

    fn focus_on(&mut self, target: Option<T::Position>) -> bool {
        match target {
            Some(pos) => self.walker.set_focus(&pos),
            None => false,
        }
    }

    /// Moves to a position derived from the current focus via the tree.
    fn focus_via<N>(&mut self, step: N) -> bool
    where
        N: FnOnce(&T, &T::Position) -> Option<T::Position>,
    {
        let Some(current) = self.current() else {
            return false;
        };
        let target = step(self.walker.tree(), &current);
        self.focus_on(target)
    }

    pub fn focus_next(&mut self) -> bool {
        let Some(current) = self.current() else {
            return false;
        };
        let target = self.walker.get_next(&current).map(|(_, pos)| pos.clone());
        self.focus_on(target)
    }

    pub fn focus_prev(&mut self) -> bool {
        let Some(current) = self.current() else {
            return false;
        };
        let target = self.walker.get_prev(&current).map(|(_, pos)| pos.clone());
        self.focus_on(target)
    }

    pub fn focus_parent(&mut self) -> bool {
        self.focus_via(|tree, pos| tree.parent(pos))
    }

    pub fn focus_first_child(&mut self) -> bool {
        self.focus_via(|tree, pos| tree.first_child(pos))
    }

    pub fn focus_last_child(&mut self) -> bool {
        self.focus_via(|tree, pos| tree.last_child(pos))
    }

    pub fn focus_next_sibling(&mut self) -> bool {
        self.focus_via(|tree, pos| tree.next_sibling(pos))
    }

    pub fn focus_prev_sibling(&mut self) -> bool {
        self.focus_via(|tree, pos| tree.prev_sibling(pos))
    }

    pub fn focus_first_sibling(&mut self) -> bool {
        self.focus_via(|tree, pos| Some(tree.first_sibling(pos)).filter(|first| first != pos))
    }

    pub fn focus_last_sibling(&mut self) -> bool {
        self.focus_via(|tree, pos| Some(tree.last_sibling(pos)).filter(|last| last != pos))
    }

    pub fn focus_first(&mut self) -> bool {
        self.focus_via(|tree, _| tree.first_position())
    }

    pub fn focus_last(&mut self) -> bool {
        self.focus_via(|tree, _| tree.last_position())
    }

    /// Next expanded position that has children.
    pub fn focus_next_unfolded(&mut self) -> bool {
        self.focus_via(|tree, pos| {
            tree.positions_from(pos.clone(), false)
                .skip(1)
                .find(|p| !tree.is_leaf(p) && !tree.is_collapsed(p))
        })
    }

    pub fn focus_prev_unfolded(&mut self) -> bool {
        self.focus_via(|tree, pos| {
            tree.positions_from(pos.clone(), true)
                .skip(1)
                .find(|p| !tree.is_leaf(p) && !tree.is_collapsed(p))
        })
    }

    fn page_step(&self) -> usize {
        self.height.saturating_sub(1).max(1)
    }

    pub fn page_down(&mut self) -> bool {
        let mut moved = false;
        for _ in 0..self.page_step() {
            if !self.focus_next() {
                break;
            }
            moved = true;
        }
        moved
    }

    pub fn page_up(&mut self) -> bool {
        let mut moved = false;
        for _ in 0..self.page_step() {
            if !self.focus_prev() {
                break;
            }
            moved = true;
        }
        moved
    }

    pub fn toggle_focused(&mut self) -> bool {
        let Some(current) = self.current() else {
            return false;
        };
        if self.walker.tree().is_leaf(&current) {
            return false;
        }
        self.walker.update(|tree| tree.toggle(&current));
        true
    }

    /// Collapses the focus, or its parent when the focus is a leaf or
    /// already collapsed; the focus follows the collapsed node.
    pub fn collapse_focused(&mut self) -> bool {
        let Some(current) = self.current() else {
            return false;
        };
        let tree = self.walker.tree();
        let target = if tree.is_leaf(&current) || tree.is_collapsed(&current) {
            tree.parent(&current)
        } else {
            Some(current)
        };
        let Some(target) = target else {
            return false;
        };
        self.walker.update(|tree| tree.collapse(&target));
        self.walker.set_focus(&target);
        true
    }

    pub fn expand_focused(&mut self) -> bool {
        let Some(current) = self.current() else {
            return false;
        };
        let tree = self.walker.tree();
        if tree.is_leaf(&current) || !tree.is_collapsed(&current) {
            return false;
        }
        self.walker.update(|tree| tree.expand(&current));
        true
    }

    /// Collapses everything; the focus moves to its top-level ancestor.
    pub fn collapse_all(&mut self) -> bool {
        let Some(current) = self.current() else {
            return false;
        };
        let top = self.walker.tree().top_ancestor(&current);
        self.walker.update(|tree| tree.collapse_all());
        self.walker.set_focus(&top);
        self.top = 0;
        true
    }

    pub fn expand_all(&mut self) -> bool {
        self.walker.update(|tree| tree.expand_all());
        true
    }

    /// Swaps in freshly loaded data; see [`ViewportWalker::rebuild`].
    pub fn rebuild<M>(&mut self, tree: T, remap: M)
    where
        M: FnOnce(&T, &T::Position) -> Option<T::Position>,
    {
        debug!("tree view rebuilt");
        self.walker.rebuild(tree, remap);
        self.top = 0;
    }
}

impl<T, D, F> TreeView<T, D, F>
where
    T: Collapse,
    D: Decorator<T>,
    F: BoxFactory<T::Content>,
    F::Widget: ItemWidget,
{
    fn entry_height(&self, idx: usize) -> usize {
        self.walker
            .entry(idx)
            .map_or(1, |(line, _)| line.content.height())
    }

    /// Moves `top` so the focused entry is fully visible in `rows` rows.
    fn scroll_to_focus(&mut self, rows: usize) {
        let focus = self.walker.focus_index();
        if focus < self.top {
            self.top = focus;
        }
        while self.top < focus {
            let used: usize = (self.top..=focus).map(|idx| self.entry_height(idx)).sum();
            if used <= rows {
                break;
            }
            self.top += 1;
        }
    }
}

impl<T, D, F> Widget for &mut TreeView<T, D, F>
where
    T: Collapse,
    D: Decorator<T, Style = Style>,
    F: BoxFactory<T::Content>,
    F::Widget: ItemWidget,
{
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        self.height = area.height as usize;
        if self.walker.get_focus().is_none() {
            return;
        }
        self.scroll_to_focus(self.height);
        let focus = self.walker.focus_index();
        let mut idx = self.top;
        let mut y = area.y;
        while y < area.bottom() {
            if idx >= self.walker.len() && !self.walker.realize_next() {
                break;
            }
            let Some((line, _)) = self.walker.entry(idx) else {
                break;
            };
            for (row, content) in line.content.lines(idx == focus).iter().enumerate() {
                if y >= area.bottom() {
                    break;
                }
                let mut x = area.x;
                for fragment in &line.fragments {
                    if x >= area.right() {
                        break;
                    }
                    let style = fragment.style().copied().unwrap_or_default();
                    let remaining = (area.right() - x) as usize;
                    buf.set_stringn(x, y, fragment.text_at_row(row), remaining, style);
                    let width = u16::try_from(fragment.width).unwrap_or(u16::MAX);
                    x = x.saturating_add(width).min(area.right());
                }
                if x < area.right() {
                    buf.set_line(x, y, content, area.right() - x);
                }
                y += 1;
            }
            idx += 1;
        }
    }
}
