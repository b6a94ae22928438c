//! Structural decoration: indentation, connectors, bars and collapse icons.
//!
//! Decorators turn the structural facts of a position (depth, whether it
//! has a later sibling, whether its ancestors do, leafness, collapse state)
//! into a row of fixed-width fragments placed in front of the content. They
//! never look at the content itself and cache nothing.

use log::warn;
use unicode_width::UnicodeWidthStr;

use crate::error::TreeError;
use crate::tree::{Collapse, PositionedTree};

/// Horizontal share of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// Exactly this many columns.
    Fixed(usize),
    /// Proportional share of the columns left over.
    Weight(u16),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment<S> {
    Blank,
    /// `text` on the first row; `below` repeated on every further row of a
    /// multi-row line (a continuing vertical bar), blank when `None`.
    Glyph {
        text: String,
        below: Option<String>,
        style: Option<S>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment<S> {
    pub width: usize,
    pub segment: Segment<S>,
}

impl<S> Fragment<S> {
    pub fn blank(width: usize) -> Self {
        Self {
            width,
            segment: Segment::Blank,
        }
    }

    pub fn glyph(text: impl Into<String>, style: Option<S>) -> Self {
        let text = text.into();
        Self {
            width: text.width(),
            segment: Segment::Glyph {
                text,
                below: None,
                style,
            },
        }
    }

    fn continued(mut self, continuation: Option<String>) -> Self {
        if let Segment::Glyph { below, .. } = &mut self.segment {
            *below = continuation;
        }
        self
    }

    pub fn style(&self) -> Option<&S> {
        match &self.segment {
            Segment::Blank => None,
            Segment::Glyph { style, .. } => style.as_ref(),
        }
    }

    /// Text shown on `row` (0 = first row), padded to the fragment width.
    pub fn text_at_row(&self, row: usize) -> String {
        let text = match &self.segment {
            Segment::Blank => "",
            Segment::Glyph { text, .. } if row == 0 => text.as_str(),
            Segment::Glyph { below, .. } => below.as_deref().unwrap_or(""),
        };
        pad_to_width(text, self.width)
    }
}

/// Decoration fragments followed by the content they decorate.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedLine<W, S> {
    pub fragments: Vec<Fragment<S>>,
    pub content: W,
}

impl<W, S> DecoratedLine<W, S> {
    pub fn decoration_width(&self) -> usize {
        self.fragments.iter().map(|f| f.width).sum()
    }

    /// Column layout of the whole line; the content takes what is left.
    pub fn widths(&self) -> Vec<Width> {
        self.fragments
            .iter()
            .map(|f| Width::Fixed(f.width))
            .chain(std::iter::once(Width::Weight(1)))
            .collect()
    }

    pub fn row_text(&self, row: usize) -> String {
        self.fragments.iter().map(|f| f.text_at_row(row)).collect()
    }

    /// First decoration row as plain text.
    pub fn prefix_text(&self) -> String {
        self.row_text(0)
    }
}

/// Glyph strings per visual role. `None` (or an empty string) disables a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyphs {
    pub hbar: Option<String>,
    pub vbar: Option<String>,
    pub tip: Option<String>,
    pub connector_tee: Option<String>,
    pub connector_corner: Option<String>,
    pub collapsed: Option<String>,
    pub expanded: Option<String>,
    pub frame_left: Option<String>,
    pub frame_right: Option<String>,
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            hbar: Some("\u{2500}".to_string()),
            vbar: Some("\u{2502}".to_string()),
            tip: Some("\u{27a4}".to_string()),
            connector_tee: Some("\u{251c}".to_string()),
            connector_corner: Some("\u{2514}".to_string()),
            collapsed: Some("+".to_string()),
            expanded: Some("-".to_string()),
            frame_left: Some("[".to_string()),
            frame_right: Some("]".to_string()),
        }
    }
}

impl Glyphs {
    /// Every role disabled: decoration degrades to plain indentation.
    pub fn none() -> Self {
        Self {
            hbar: None,
            vbar: None,
            tip: None,
            connector_tee: None,
            connector_corner: None,
            collapsed: None,
            expanded: None,
            frame_left: None,
            frame_right: None,
        }
    }

    /// Seven-bit glyphs for terminals without box drawing.
    pub fn ascii() -> Self {
        Self {
            hbar: Some("-".to_string()),
            vbar: Some("|".to_string()),
            tip: Some(">".to_string()),
            connector_tee: Some("+".to_string()),
            connector_corner: Some("`".to_string()),
            ..Self::default()
        }
    }
}

/// Opaque per-role attributes handed through to the renderer.
///
/// Roles without an attribute fall back to `arrow`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleStyles<S> {
    pub arrow: Option<S>,
    pub hbar: Option<S>,
    pub vbar: Option<S>,
    pub tip: Option<S>,
    pub connector: Option<S>,
    pub icon: Option<S>,
    pub frame: Option<S>,
}

impl<S> Default for RoleStyles<S> {
    fn default() -> Self {
        Self {
            arrow: None,
            hbar: None,
            vbar: None,
            tip: None,
            connector: None,
            icon: None,
            frame: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecorationConfig<S> {
    /// Columns per nesting level.
    pub indent: usize,
    /// Blank columns left of a vertical bar or connector within its level.
    pub child_bar_offset: usize,
    /// Blank columns between a collapse icon and the content.
    pub icon_offset: usize,
    pub glyphs: Glyphs,
    pub styles: RoleStyles<S>,
}

/// Five columns fit a connector plus a framed icon and its offset, so every
/// variant lays out at its defaults.
impl<S> Default for DecorationConfig<S> {
    fn default() -> Self {
        Self {
            indent: 5,
            child_bar_offset: 0,
            icon_offset: 1,
            glyphs: Glyphs::default(),
            styles: RoleStyles::default(),
        }
    }
}

fn enabled(glyph: &Option<String>) -> Option<&str> {
    glyph.as_deref().filter(|g| !g.is_empty())
}

fn pad_to_width(text: &str, width: usize) -> String {
    let mut out = text.to_string();
    let used = text.width();
    if used < width {
        out.push_str(&" ".repeat(width - used));
    }
    out
}

/// Repeats `glyph` as often as it fits into `width`, padding the remainder.
fn repeat_to_width(glyph: &str, width: usize) -> String {
    let glyph_width = glyph.width();
    let mut out = String::new();
    let mut used = 0;
    if glyph_width > 0 {
        while used + glyph_width <= width {
            out.push_str(glyph);
            used += glyph_width;
        }
    }
    pad_to_width(&out, width)
}

fn push_blank<S>(out: &mut Vec<Fragment<S>>, width: usize) {
    if width == 0 {
        return;
    }
    if let Some(Fragment {
        width: last,
        segment: Segment::Blank,
    }) = out.last_mut()
    {
        *last += width;
        return;
    }
    out.push(Fragment::blank(width));
}

fn extend_merged<S>(out: &mut Vec<Fragment<S>>, fragments: Vec<Fragment<S>>) {
    for fragment in fragments {
        match fragment.segment {
            Segment::Blank => push_blank(out, fragment.width),
            _ => out.push(fragment),
        }
    }
}

fn blank_line<S>(width: usize) -> Vec<Fragment<S>> {
    let mut out = Vec::new();
    push_blank(&mut out, width);
    out
}

fn total_width<S>(fragments: &[Fragment<S>]) -> usize {
    fragments.iter().map(|f| f.width).sum()
}

impl<S: Clone> DecorationConfig<S> {
    fn style_for(&self, role: &Option<S>) -> Option<S> {
        role.clone().or_else(|| self.styles.arrow.clone())
    }

    /// Framed collapse icon; disabled parts are left out.
    fn icon(&self, collapsed: bool) -> Vec<Fragment<S>> {
        let glyph = if collapsed {
            &self.glyphs.collapsed
        } else {
            &self.glyphs.expanded
        };
        let Some(glyph) = enabled(glyph) else {
            return Vec::new();
        };
        let frame_style = self.styles.frame.clone().or_else(|| self.styles.icon.clone());
        let mut out = Vec::new();
        if let Some(left) = enabled(&self.glyphs.frame_left) {
            out.push(Fragment::glyph(left, frame_style.clone()));
        }
        out.push(Fragment::glyph(glyph, self.styles.icon.clone()));
        if let Some(right) = enabled(&self.glyphs.frame_right) {
            out.push(Fragment::glyph(right, frame_style));
        }
        out
    }

    /// Widest collapse icon including its trailing offset.
    fn icon_column_width(&self) -> usize {
        let widest = total_width(&self.icon(true)).max(total_width(&self.icon(false)));
        if widest == 0 {
            0
        } else {
            widest + self.icon_offset
        }
    }

    fn tip(&self) -> Vec<Fragment<S>> {
        enabled(&self.glyphs.tip)
            .map(|tip| vec![Fragment::glyph(tip, self.style_for(&self.styles.tip))])
            .unwrap_or_default()
    }

    /// One indent unit for an ancestor level, with or without a bar.
    fn bar_unit(&self, draw_bar: bool) -> Result<Vec<Fragment<S>>, TreeError> {
        let vbar = match enabled(&self.glyphs.vbar) {
            Some(vbar) if draw_bar => vbar,
            _ => return Ok(blank_line(self.indent)),
        };
        let needed = self.child_bar_offset + vbar.width();
        if needed > self.indent {
            return Err(TreeError::layout("vbar", needed, self.indent));
        }
        let mut out = blank_line(self.child_bar_offset);
        out.push(
            Fragment::glyph(vbar, self.style_for(&self.styles.vbar))
                .continued(Some(vbar.to_string())),
        );
        push_blank(&mut out, self.indent - needed);
        Ok(out)
    }

    /// Units for every ancestor below the top level, outermost first.
    ///
    /// A bar is drawn for an ancestor iff it has a later sibling, so the bar
    /// continues down to that sibling's connector.
    fn ancestor_units<T: PositionedTree + ?Sized>(
        &self,
        tree: &T,
        pos: &T::Position,
    ) -> Result<Vec<Fragment<S>>, TreeError> {
        let mut units = Vec::new();
        let mut current = tree.parent(pos);
        while let Some(ancestor) = current {
            let grandparent = tree.parent(&ancestor);
            if grandparent.is_none() {
                break;
            }
            units.push(self.bar_unit(tree.next_sibling(&ancestor).is_some())?);
            current = grandparent;
        }
        let mut out = Vec::new();
        for unit in units.into_iter().rev() {
            extend_merged(&mut out, unit);
        }
        Ok(out)
    }

    /// The innermost unit: connector, horizontal bar, then `tail`.
    fn connector_unit<T: PositionedTree + ?Sized>(
        &self,
        tree: &T,
        pos: &T::Position,
        tail: Vec<Fragment<S>>,
    ) -> Result<Vec<Fragment<S>>, TreeError> {
        let mut available = self.indent;
        if self.child_bar_offset > available {
            return Err(TreeError::layout("offset", self.child_bar_offset, available));
        }
        let mut out = blank_line(self.child_bar_offset);
        available -= self.child_bar_offset;

        let has_next = tree.next_sibling(pos).is_some();
        let connector = if has_next {
            enabled(&self.glyphs.connector_tee)
        } else {
            enabled(&self.glyphs.connector_corner)
        };
        if let Some(connector) = connector {
            let width = connector.width();
            if width > available {
                return Err(TreeError::layout("connector", width, available));
            }
            let below = if has_next {
                enabled(&self.glyphs.vbar).map(str::to_string)
            } else {
                None
            };
            out.push(
                Fragment::glyph(connector, self.style_for(&self.styles.connector))
                    .continued(below),
            );
            available -= width;
        }

        let tail_width = total_width(&tail);
        if tail_width > available {
            return Err(TreeError::layout("tip", tail_width, available));
        }
        let fill = available - tail_width;
        if fill > 0 {
            match enabled(&self.glyphs.hbar) {
                Some(hbar) => out.push(Fragment {
                    width: fill,
                    segment: Segment::Glyph {
                        text: repeat_to_width(hbar, fill),
                        below: None,
                        style: self.style_for(&self.styles.hbar),
                    },
                }),
                None => push_blank(&mut out, fill),
            }
        }
        extend_merged(&mut out, tail);
        Ok(out)
    }

    /// Icon right-aligned in a unit of `width` columns, then the offset.
    fn icon_unit(&self, collapsed: bool, width: usize) -> Result<Vec<Fragment<S>>, TreeError> {
        let icon = self.icon(collapsed);
        let icon_width = total_width(&icon);
        if icon_width == 0 {
            return Ok(blank_line(width));
        }
        let needed = icon_width + self.icon_offset;
        if needed > width {
            return Err(TreeError::layout("icon", needed, width));
        }
        let mut out = blank_line(width - needed);
        extend_merged(&mut out, icon);
        push_blank(&mut out, self.icon_offset);
        Ok(out)
    }
}

/// Computes the decoration for one position of a tree.
pub trait Decorator<T: PositionedTree> {
    type Style;

    /// Strict layout: fails when a glyph does not fit its indent unit.
    fn layout(
        &self,
        tree: &T,
        pos: &T::Position,
    ) -> Result<Vec<Fragment<Self::Style>>, TreeError>;

    /// Total decoration width for `pos`, also used by the fallback.
    fn width(&self, tree: &T, pos: &T::Position) -> usize;

    /// Layout with fallback: a layout error is logged and replaced by a blank
    /// block of the same width.
    fn decorate<W>(&self, tree: &T, pos: &T::Position, content: W) -> DecoratedLine<W, Self::Style> {
        let fragments = match self.layout(tree, pos) {
            Ok(fragments) => fragments,
            Err(err) => {
                warn!("decoration of {:?} degraded: {}", pos, err);
                blank_line(self.width(tree, pos))
            }
        };
        DecoratedLine { fragments, content }
    }
}

/// Blank indentation of `depth * indent` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Indented<S> {
    pub config: DecorationConfig<S>,
}

/// Indentation plus a collapse icon in one extra indent unit.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapsibleIndented<S> {
    pub config: DecorationConfig<S>,
}

/// Connector-and-arrow art following the tree structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow<S> {
    pub config: DecorationConfig<S>,
}

/// Arrow art with collapse icons on non-leaf positions.
///
/// A leading icon column is reserved on every line so root-level nodes can
/// carry an icon without misaligning their siblings.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapsibleArrow<S> {
    pub config: DecorationConfig<S>,
}

impl<T: PositionedTree, S: Clone> Decorator<T> for Indented<S> {
    type Style = S;

    fn layout(&self, tree: &T, pos: &T::Position) -> Result<Vec<Fragment<S>>, TreeError> {
        Ok(blank_line(self.width(tree, pos)))
    }

    fn width(&self, tree: &T, pos: &T::Position) -> usize {
        tree.depth(pos) * self.config.indent
    }
}

impl<T: Collapse, S: Clone> Decorator<T> for CollapsibleIndented<S> {
    type Style = S;

    fn layout(&self, tree: &T, pos: &T::Position) -> Result<Vec<Fragment<S>>, TreeError> {
        let indent = self.config.indent;
        let mut out = blank_line(tree.depth(pos) * indent);
        if tree.is_leaf(pos) {
            push_blank(&mut out, indent);
        } else {
            let unit = self.config.icon_unit(tree.is_collapsed(pos), indent)?;
            extend_merged(&mut out, unit);
        }
        Ok(out)
    }

    fn width(&self, tree: &T, pos: &T::Position) -> usize {
        (tree.depth(pos) + 1) * self.config.indent
    }
}

impl<T: PositionedTree, S: Clone> Decorator<T> for Arrow<S> {
    type Style = S;

    fn layout(&self, tree: &T, pos: &T::Position) -> Result<Vec<Fragment<S>>, TreeError> {
        if tree.depth(pos) == 0 {
            return Ok(Vec::new());
        }
        let mut out = self.config.ancestor_units(tree, pos)?;
        let unit = self.config.connector_unit(tree, pos, self.config.tip())?;
        extend_merged(&mut out, unit);
        Ok(out)
    }

    fn width(&self, tree: &T, pos: &T::Position) -> usize {
        tree.depth(pos) * self.config.indent
    }
}

impl<T: Collapse, S: Clone> Decorator<T> for CollapsibleArrow<S> {
    type Style = S;

    fn layout(&self, tree: &T, pos: &T::Position) -> Result<Vec<Fragment<S>>, TreeError> {
        let column = self.config.icon_column_width();
        let leaf = tree.is_leaf(pos);
        if tree.depth(pos) == 0 {
            if leaf {
                return Ok(blank_line(column));
            }
            return self.config.icon_unit(tree.is_collapsed(pos), column);
        }
        let mut out = blank_line(column);
        extend_merged(&mut out, self.config.ancestor_units(tree, pos)?);
        let tail = if leaf {
            self.config.tip()
        } else {
            let mut icon = self.config.icon(tree.is_collapsed(pos));
            if !icon.is_empty() {
                push_blank(&mut icon, self.config.icon_offset);
            }
            icon
        };
        let unit = self.config.connector_unit(tree, pos, tail)?;
        extend_merged(&mut out, unit);
        Ok(out)
    }

    fn width(&self, tree: &T, pos: &T::Position) -> usize {
        self.config.icon_column_width() + tree.depth(pos) * self.config.indent
    }
}

/// Selectable decoration variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecorationStyle {
    Indent,
    CollapsibleIndent,
    Arrow,
    #[default]
    CollapsibleArrow,
}

impl DecorationStyle {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "indent" | "indented" => Some(Self::Indent),
            "collapsible-indent" | "collapsible-indented" => Some(Self::CollapsibleIndent),
            "arrow" => Some(Self::Arrow),
            "collapsible-arrow" => Some(Self::CollapsibleArrow),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Indent => "indent",
            Self::CollapsibleIndent => "collapsible-indent",
            Self::Arrow => "arrow",
            Self::CollapsibleArrow => "collapsible-arrow",
        }
    }

    /// Following variant, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Self::Indent => Self::CollapsibleIndent,
            Self::CollapsibleIndent => Self::Arrow,
            Self::Arrow => Self::CollapsibleArrow,
            Self::CollapsibleArrow => Self::Indent,
        }
    }
}

/// Runtime choice between the decoration variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoration<S> {
    Indent(Indented<S>),
    CollapsibleIndent(CollapsibleIndented<S>),
    Arrow(Arrow<S>),
    CollapsibleArrow(CollapsibleArrow<S>),
}

impl<S> Decoration<S> {
    pub fn new(style: DecorationStyle, config: DecorationConfig<S>) -> Self {
        match style {
            DecorationStyle::Indent => Self::Indent(Indented { config }),
            DecorationStyle::CollapsibleIndent => {
                Self::CollapsibleIndent(CollapsibleIndented { config })
            }
            DecorationStyle::Arrow => Self::Arrow(Arrow { config }),
            DecorationStyle::CollapsibleArrow => {
                Self::CollapsibleArrow(CollapsibleArrow { config })
            }
        }
    }

    pub fn style(&self) -> DecorationStyle {
        match self {
            Self::Indent(_) => DecorationStyle::Indent,
            Self::CollapsibleIndent(_) => DecorationStyle::CollapsibleIndent,
            Self::Arrow(_) => DecorationStyle::Arrow,
            Self::CollapsibleArrow(_) => DecorationStyle::CollapsibleArrow,
        }
    }

    pub fn config(&self) -> &DecorationConfig<S> {
        match self {
            Self::Indent(d) => &d.config,
            Self::CollapsibleIndent(d) => &d.config,
            Self::Arrow(d) => &d.config,
            Self::CollapsibleArrow(d) => &d.config,
        }
    }

    /// Same configuration, different variant.
    pub fn with_style(self, style: DecorationStyle) -> Self {
        let config = match self {
            Self::Indent(d) => d.config,
            Self::CollapsibleIndent(d) => d.config,
            Self::Arrow(d) => d.config,
            Self::CollapsibleArrow(d) => d.config,
        };
        Self::new(style, config)
    }
}

impl<T: Collapse, S: Clone> Decorator<T> for Decoration<S> {
    type Style = S;

    fn layout(&self, tree: &T, pos: &T::Position) -> Result<Vec<Fragment<S>>, TreeError> {
        match self {
            Self::Indent(d) => d.layout(tree, pos),
            Self::CollapsibleIndent(d) => d.layout(tree, pos),
            Self::Arrow(d) => d.layout(tree, pos),
            Self::CollapsibleArrow(d) => d.layout(tree, pos),
        }
    }

    fn width(&self, tree: &T, pos: &T::Position) -> usize {
        match self {
            Self::Indent(d) => d.width(tree, pos),
            Self::CollapsibleIndent(d) => d.width(tree, pos),
            Self::Arrow(d) => d.width(tree, pos),
            Self::CollapsibleArrow(d) => d.width(tree, pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Arrow, CollapsibleArrow, CollapsibleIndented, Decoration, DecorationConfig,
        DecorationStyle, Decorator, Fragment, Glyphs, Indented, Width,
    };
    use crate::collapse::Collapsible;
    use crate::error::TreeError;
    use crate::fixed::{FixedNode, FixedTree, TreePath};
    use crate::traverse::Traverse;
    use crate::tree::Collapse;

    // Root -> [A -> [A1, A2], B]
    fn tree() -> FixedTree<&'static str> {
        FixedTree::single(FixedNode::new(
            "Root",
            vec![
                FixedNode::new("A", vec![FixedNode::leaf("A1"), FixedNode::leaf("A2")]),
                FixedNode::leaf("B"),
            ],
        ))
    }

    fn config(indent: usize) -> DecorationConfig<()> {
        DecorationConfig {
            indent,
            ..DecorationConfig::default()
        }
    }

    fn path(indices: &[usize]) -> TreePath {
        TreePath::new(indices.to_vec())
    }

    #[test]
    fn indented_emits_single_spacer() {
        let decorator = Indented { config: config(2) };
        let line = decorator.decorate(&tree(), &path(&[0, 0, 1]), "A2");
        assert_eq!(line.fragments, vec![Fragment::blank(4)]);
        assert_eq!(line.content, "A2");
        assert_eq!(line.widths(), vec![Width::Fixed(4), Width::Weight(1)]);
        let root = decorator.decorate(&tree(), &path(&[0]), "Root");
        assert!(root.fragments.is_empty());
    }

    #[test]
    fn arrow_picks_tee_or_corner_by_sibling() {
        let decorator = Arrow { config: config(3) };
        let tree = tree();
        let first = decorator.decorate(&tree, &path(&[0, 0]), ());
        let last = decorator.decorate(&tree, &path(&[0, 1]), ());
        assert_eq!(first.prefix_text(), "\u{251c}\u{2500}\u{27a4}");
        assert_eq!(last.prefix_text(), "\u{2514}\u{2500}\u{27a4}");
        assert!(decorator.decorate(&tree, &path(&[0]), ()).fragments.is_empty());
    }

    #[test]
    fn arrow_bars_continue_to_later_siblings() {
        let decorator = Arrow { config: config(3) };
        let line = decorator.decorate(&tree(), &path(&[0, 0, 1]), ());
        assert_eq!(line.prefix_text(), "\u{2502}  \u{2514}\u{2500}\u{27a4}");
        assert_eq!(line.row_text(1), "\u{2502}     ");
        let first = decorator.decorate(&tree(), &path(&[0, 0, 0]), ());
        assert_eq!(first.row_text(1), "\u{2502}  \u{2502}  ");
        assert_eq!(line.decoration_width(), 6);
    }

    #[test]
    fn arrow_without_glyphs_is_plain_indentation() {
        let decorator = Arrow {
            config: DecorationConfig {
                glyphs: Glyphs::none(),
                ..config(3)
            },
        };
        let line = decorator.decorate(&tree(), &path(&[0, 0, 1]), ());
        assert_eq!(line.fragments, vec![Fragment::blank(6)]);
    }

    #[test]
    fn disabled_tip_is_replaced_by_bar() {
        let mut glyphs = Glyphs::default();
        glyphs.tip = Some(String::new());
        let decorator = Arrow {
            config: DecorationConfig {
                glyphs,
                ..config(3)
            },
        };
        let line = decorator.decorate(&tree(), &path(&[0, 1]), ());
        assert_eq!(line.prefix_text(), "\u{2514}\u{2500}\u{2500}");
    }

    #[test]
    fn narrow_indent_reports_layout_error_and_falls_back() {
        let decorator = Arrow { config: config(1) };
        let tree = tree();
        let pos = path(&[0, 1]);
        assert_eq!(
            decorator.layout(&tree, &pos),
            Err(TreeError::Layout {
                role: "tip",
                needed: 1,
                available: 0,
            })
        );
        let line = decorator.decorate(&tree, &pos, ());
        assert_eq!(line.fragments, vec![Fragment::blank(1)]);
    }

    #[test]
    fn child_bar_offset_shifts_bars_and_connectors() {
        let decorator = Arrow {
            config: DecorationConfig {
                child_bar_offset: 1,
                ..config(4)
            },
        };
        let line = decorator.decorate(&tree(), &path(&[0, 0, 0]), ());
        assert_eq!(
            line.prefix_text(),
            " \u{2502}   \u{251c}\u{2500}\u{27a4}"
        );
    }

    #[test]
    fn collapsible_indent_shows_icons_on_inner_nodes_only() {
        let mut tree = Collapsible::new(tree());
        tree.collapse(&path(&[0, 0]));
        let decorator = CollapsibleIndented { config: config(4) };
        assert_eq!(decorator.decorate(&tree, &path(&[0]), ()).prefix_text(), "[-] ");
        assert_eq!(
            decorator.decorate(&tree, &path(&[0, 0]), ()).prefix_text(),
            "    [+] "
        );
        let leaf = decorator.decorate(&tree, &path(&[0, 1]), ());
        assert_eq!(leaf.fragments, vec![Fragment::blank(8)]);
    }

    #[test]
    fn collapsible_indent_needs_room_for_the_icon() {
        let tree = Collapsible::new(tree());
        let decorator = CollapsibleIndented { config: config(3) };
        assert_eq!(
            decorator.layout(&tree, &path(&[0])),
            Err(TreeError::Layout {
                role: "icon",
                needed: 4,
                available: 3,
            })
        );
        let line = decorator.decorate(&tree, &path(&[0, 0]), ());
        assert_eq!(line.fragments, vec![Fragment::blank(6)]);
    }

    #[test]
    fn leaves_never_render_icons() {
        let tree = Collapsible::with_predicate(tree(), |_, _| true);
        let decorator = CollapsibleIndented { config: config(4) };
        let leaf = decorator.decorate(&tree, &path(&[0, 1]), ());
        assert!(!leaf.prefix_text().contains('+'));
    }

    #[test]
    fn collapsible_arrow_puts_icon_at_the_tip() {
        let mut tree = Collapsible::new(tree());
        tree.collapse(&path(&[0, 0]));
        let decorator = CollapsibleArrow { config: config(6) };
        assert_eq!(decorator.decorate(&tree, &path(&[0]), ()).prefix_text(), "[-] ");
        assert_eq!(
            decorator.decorate(&tree, &path(&[0, 0]), ()).prefix_text(),
            "    \u{251c}\u{2500}[+] "
        );
        assert_eq!(
            decorator.decorate(&tree, &path(&[0, 1]), ()).prefix_text(),
            "    \u{2514}\u{2500}\u{2500}\u{2500}\u{2500}\u{27a4}"
        );
        assert_eq!(decorator.width(&tree, &path(&[0, 1])), 10);
    }

    #[test]
    fn role_styles_fall_back_to_arrow_style() {
        let decorator = Arrow {
            config: DecorationConfig {
                indent: 3,
                styles: super::RoleStyles {
                    arrow: Some("arrow"),
                    vbar: Some("vbar"),
                    ..super::RoleStyles::default()
                },
                ..DecorationConfig::default()
            },
        };
        let line = decorator.decorate(&tree(), &path(&[0, 0, 0]), ());
        let styles: Vec<Option<&&str>> = line.fragments.iter().map(|f| f.style()).collect();
        assert_eq!(
            styles,
            vec![Some(&"vbar"), None, Some(&"arrow"), Some(&"arrow"), Some(&"arrow")]
        );
    }

    #[test]
    fn decoration_enum_dispatches_and_switches_style() {
        let tree = Collapsible::new(tree());
        let decoration: Decoration<()> = Decoration::new(DecorationStyle::Indent, config(2));
        assert_eq!(decoration.width(&tree, &path(&[0, 0])), 2);
        let arrow = decoration.with_style(DecorationStyle::Arrow);
        assert_eq!(arrow.style(), DecorationStyle::Arrow);
        assert_eq!(arrow.config().indent, 2);
        assert_eq!(DecorationStyle::parse("Collapsible_Arrow"), Some(DecorationStyle::CollapsibleArrow));
        assert_eq!(DecorationStyle::parse("zigzag"), None);
    }

    #[test]
    fn style_cycle_visits_every_variant() {
        let mut style = DecorationStyle::default();
        let mut names = Vec::new();
        for _ in 0..4 {
            style = style.next();
            names.push(style.name());
        }
        assert_eq!(names, vec!["indent", "collapsible-indent", "arrow", "collapsible-arrow"]);
        assert_eq!(DecorationStyle::parse(style.name()), Some(style));
    }

    #[test]
    fn defaults_lay_out_every_position() {
        let mut tree = Collapsible::new(tree());
        let decoration: Decoration<()> =
            Decoration::new(DecorationStyle::default(), DecorationConfig::default());
        for pos in tree.positions(false) {
            assert!(decoration.layout(&tree, &pos).is_ok(), "{:?}", pos);
        }
        tree.collapse(&path(&[0, 0]));
        assert_eq!(
            decoration.decorate(&tree, &path(&[0, 0]), ()).prefix_text(),
            "    \u{251c}[+] "
        );
        assert_eq!(
            decoration.decorate(&tree, &path(&[0, 1]), ()).prefix_text(),
            "    \u{2514}\u{2500}\u{2500}\u{2500}\u{27a4}"
        );
    }

    fn assert_plain<D: Decorator<Collapsible<FixedTree<&'static str>>, Style = ()>>(
        decorator: &D,
        tree: &Collapsible<FixedTree<&'static str>>,
    ) {
        for pos in tree.positions(false) {
            let layout = decorator.layout(tree, &pos);
            assert!(layout.is_ok(), "{:?}", pos);
            let line = decorator.decorate(tree, &pos, ());
            assert!(line.prefix_text().chars().all(|c| c == ' '), "{:?}", pos);
            assert!(line.row_text(1).chars().all(|c| c == ' '), "{:?}", pos);
            assert_eq!(line.decoration_width(), decorator.width(tree, &pos));
        }
    }

    #[test]
    fn collapsible_variants_without_glyphs_are_plain_indentation() {
        let mut tree = Collapsible::new(tree());
        let config = DecorationConfig {
            glyphs: Glyphs::none(),
            ..config(3)
        };
        let arrow = CollapsibleArrow {
            config: config.clone(),
        };
        let indented = CollapsibleIndented { config };
        assert_plain(&arrow, &tree);
        assert_plain(&indented, &tree);
        assert_eq!(arrow.width(&tree, &path(&[0, 0, 1])), 6);

        tree.collapse(&path(&[0, 0]));
        assert_plain(&arrow, &tree);
        assert_plain(&indented, &tree);
        assert!(arrow.decorate(&tree, &path(&[0]), ()).fragments.is_empty());
        let line = indented.decorate(&tree, &path(&[0, 0]), ());
        assert_eq!(line.fragments, vec![Fragment::blank(6)]);
    }
}
