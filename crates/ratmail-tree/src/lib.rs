//! Generic tree navigation and decoration for terminal list views.
//!
//! Data owners implement [`PositionedTree`]. Overlays ([`Collapsible`],
//! [`NestedTree`]) change what is reachable without touching the data,
//! decorators ([`Decoration`]) draw the structure in front of each row and
//! [`ViewportWalker`] / [`TreeView`] turn the result into a scrollable list.

pub mod collapse;
pub mod decoration;
pub mod directory;
pub mod error;
pub mod fixed;
pub mod nested;
pub mod traverse;
pub mod tree;
pub mod view;
pub mod walker;

pub use collapse::{CollapsePredicate, Collapsible};
pub use decoration::{
    Arrow, CollapsibleArrow, CollapsibleIndented, DecoratedLine, Decoration, DecorationConfig,
    DecorationStyle, Decorator, Fragment, Glyphs, Indented, RoleStyles, Segment, Width,
};
pub use directory::{DirEntryInfo, DirectoryTree};
pub use error::TreeError;
pub use fixed::{FixedNode, FixedTree, TreePath};
pub use nested::{NestedContent, NestedPosition, NestedTree};
pub use traverse::{Positions, Traverse, check_structure, walk_until_stuck};
pub use tree::{Collapse, Position, PositionedTree, Subtrees};
pub use view::{ItemBox, ItemWidget, TreeAction, TreeView};
pub use walker::{BoxFactory, ViewportWalker, WalkerLine, WalkerState};
