use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Result;
use log::info;
use ratmail_core::{DetailLine, Message, demo_messages, load_messages};
use ratmail_tree::{Collapsible, DirEntryInfo, NestedContent, PositionedTree};

pub(crate) type ThreadContent = NestedContent<Rc<Message>, DetailLine>;

pub(crate) fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}

pub(crate) fn truncate_label(input: &str, max: usize) -> String {
    let count = input.chars().count();
    if count <= max {
        return input.to_string();
    }
    let keep = max.saturating_sub(3);
    let tail: String = input.chars().skip(count - keep).collect();
    format!("...{}", tail)
}

pub(crate) fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{} MB", (bytes as f64 / (1024.0 * 1024.0)).round() as usize)
    } else if bytes >= 1024 {
        format!("{} KB", (bytes as f64 / 1024.0).round() as usize)
    } else {
        format!("{} B", bytes)
    }
}

/// Messages of `source`, or the demo mailbox; returns them with a label.
pub(crate) fn load_source(source: Option<&Path>) -> Result<(Vec<Message>, String)> {
    match source {
        Some(path) => {
            let messages = load_messages(path)?;
            info!("{} messages from {}", messages.len(), path.display());
            Ok((messages, path.display().to_string()))
        }
        None => Ok((demo_messages(), "demo".to_string())),
    }
}

/// Collapse overlay whose positions at `depth` or deeper start collapsed.
pub(crate) fn collapsible<T>(tree: T, depth: Option<usize>) -> Collapsible<T>
where
    T: PositionedTree + 'static,
{
    match depth {
        Some(depth) => Collapsible::collapsed_below(tree, depth),
        None => Collapsible::new(tree),
    }
}

pub(crate) fn describe_thread(content: &ThreadContent) -> String {
    match content {
        NestedContent::Outer(message) => message.summary(),
        NestedContent::Inner(DetailLine::Attachment(meta)) => format!(
            "{} ({}, {})",
            meta.filename,
            meta.mime,
            format_size(meta.size)
        ),
        NestedContent::Inner(line) => line.text(),
    }
}

pub(crate) fn describe_entry(entry: &DirEntryInfo) -> String {
    if entry.is_dir {
        format!("{}/", entry.name)
    } else {
        entry.name.clone()
    }
}
