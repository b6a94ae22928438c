//! A lazily scanned filesystem hierarchy.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::warn;

use crate::error::TreeError;
use crate::tree::PositionedTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

/// One memoised directory listing.
#[derive(Debug)]
struct Listing {
    entries: Vec<DirEntryInfo>,
    /// Slot of every entry in `entries`, keyed by path.
    slots: HashMap<PathBuf, usize>,
}

impl Listing {
    fn new(entries: Vec<DirEntryInfo>) -> Self {
        let slots = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.path.clone(), idx))
            .collect();
        Self { entries, slots }
    }

    fn slot(&self, path: &Path) -> Option<usize> {
        self.slots.get(path).copied()
    }

    fn path_at(&self, idx: usize) -> Option<PathBuf> {
        self.entries.get(idx).map(|e| e.path.clone())
    }
}

/// Directory tree rooted at `root`; positions are paths.
///
/// Listings are read on first access and memoised, so navigation stays
/// cheap after the first visit. Children sort directories first, then by
/// name. Symlinked directories are listed as leaves.
#[derive(Debug)]
pub struct DirectoryTree {
    root: PathBuf,
    show_hidden: bool,
    listings: RefCell<HashMap<PathBuf, Rc<Listing>>>,
}

impl DirectoryTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            show_hidden: false,
            listings: RefCell::new(HashMap::new()),
        }
    }

    pub fn show_hidden(mut self, show: bool) -> Self {
        self.show_hidden = show;
        self.rescan();
        self
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Forgets every memoised listing; the next access reads the disk again.
    pub fn rescan(&self) {
        self.listings.borrow_mut().clear();
    }

    fn inside(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    fn listing(&self, dir: &Path) -> Rc<Listing> {
        if let Some(listing) = self.listings.borrow().get(dir) {
            return Rc::clone(listing);
        }
        let listing = Rc::new(Listing::new(self.scan(dir)));
        self.listings
            .borrow_mut()
            .insert(dir.to_path_buf(), Rc::clone(&listing));
        listing
    }

    fn scan(&self, dir: &Path) -> Vec<DirEntryInfo> {
        let read = match fs::read_dir(dir) {
            Ok(read) => read,
            Err(err) => {
                warn!("cannot list {}: {}", dir.display(), err);
                return Vec::new();
            }
        };
        let mut entries: Vec<DirEntryInfo> = read
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                if !self.show_hidden && name.starts_with('.') {
                    return None;
                }
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                Some(DirEntryInfo {
                    path: entry.path(),
                    name,
                    is_dir,
                })
            })
            .collect();
        entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
        entries
    }

    fn is_dir(&self, path: &Path) -> bool {
        if path == self.root {
            return self.root.is_dir();
        }
        self.sibling_index(path)
            .and_then(|(listing, idx)| listing.entries.get(idx).map(|e| e.is_dir))
            .unwrap_or(false)
    }

    /// Index of `path` within its parent's listing.
    fn sibling_index(&self, path: &Path) -> Option<(Rc<Listing>, usize)> {
        if path == self.root || !self.inside(path) {
            return None;
        }
        let listing = self.listing(path.parent()?);
        let idx = listing.slot(path)?;
        Some((listing, idx))
    }
}

impl PositionedTree for DirectoryTree {
    type Position = PathBuf;
    type Content = DirEntryInfo;

    fn root(&self) -> Option<PathBuf> {
        self.root.exists().then(|| self.root.clone())
    }

    fn get(&self, pos: &PathBuf) -> Result<DirEntryInfo, TreeError> {
        if *pos == self.root {
            if !self.root.exists() {
                return Err(TreeError::not_found(pos));
            }
            let name = self
                .root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.root.display().to_string());
            return Ok(DirEntryInfo {
                path: self.root.clone(),
                name,
                is_dir: self.root.is_dir(),
            });
        }
        self.sibling_index(pos)
            .and_then(|(listing, idx)| listing.entries.get(idx).cloned())
            .ok_or_else(|| TreeError::not_found(pos))
    }

    fn parent(&self, pos: &PathBuf) -> Option<PathBuf> {
        if *pos == self.root || !self.inside(pos) {
            return None;
        }
        pos.parent().map(Path::to_path_buf)
    }

    fn first_child(&self, pos: &PathBuf) -> Option<PathBuf> {
        if !self.inside(pos) || !self.is_dir(pos) {
            return None;
        }
        self.listing(pos).path_at(0)
    }

    fn last_child(&self, pos: &PathBuf) -> Option<PathBuf> {
        if !self.inside(pos) || !self.is_dir(pos) {
            return None;
        }
        let listing = self.listing(pos);
        listing.path_at(listing.entries.len().checked_sub(1)?)
    }

    fn next_sibling(&self, pos: &PathBuf) -> Option<PathBuf> {
        let (listing, idx) = self.sibling_index(pos)?;
        listing.path_at(idx + 1)
    }

    fn prev_sibling(&self, pos: &PathBuf) -> Option<PathBuf> {
        let (listing, idx) = self.sibling_index(pos)?;
        listing.path_at(idx.checked_sub(1)?)
    }

    fn depth(&self, pos: &PathBuf) -> usize {
        pos.strip_prefix(&self.root)
            .map(|rel| rel.components().count())
            .unwrap_or(0)
    }
}
