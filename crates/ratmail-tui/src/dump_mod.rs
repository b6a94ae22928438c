use anyhow::Result;
use log::warn;
use ratmail_core::ThreadTree;
use ratmail_tree::{Collapse, Decoration, Decorator, DirectoryTree, NestedTree, Traverse};
use serde::Serialize;

use super::TreeConfig;
use crate::cli::DumpCmd;
use crate::util_mod::{collapsible, describe_entry, describe_thread, load_source};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct DumpLine {
    pub(crate) depth: usize,
    pub(crate) leaf: bool,
    pub(crate) collapsed: bool,
    pub(crate) text: String,
    /// Decorated rows as drawn on screen.
    #[serde(skip)]
    pub(crate) rows: Vec<String>,
}

/// Every visible position of `tree` in depth-first order, up to the first
/// position whose content can no longer be read.
pub(crate) fn collect_lines<T, D, C>(tree: &T, decorator: &D, describe: C) -> Vec<DumpLine>
where
    T: Collapse,
    D: Decorator<T>,
    C: Fn(&T::Content) -> String,
{
    let mut lines = Vec::new();
    for pos in tree.positions(false) {
        let content = match tree.get(&pos) {
            Ok(content) => content,
            Err(err) => {
                warn!("dump stopped at {:?}: {}", pos, err);
                break;
            }
        };
        let text = describe(&content);
        let decorated = decorator.decorate(tree, &pos, ());
        let mut rows: Vec<String> = text
            .lines()
            .enumerate()
            .map(|(row, part)| format!("{}{}", decorated.row_text(row), part))
            .collect();
        if rows.is_empty() {
            rows.push(decorated.prefix_text());
        }
        let leaf = tree.is_leaf(&pos);
        lines.push(DumpLine {
            depth: tree.depth(&pos),
            leaf,
            collapsed: !leaf && tree.is_collapsed(&pos),
            text,
            rows,
        });
    }
    lines
}

pub(crate) fn render_lines(lines: &[DumpLine], json: bool) -> Result<String> {
    if json {
        let mut out = serde_json::to_string_pretty(lines)?;
        out.push('\n');
        return Ok(out);
    }
    let mut out = String::new();
    for line in lines {
        for row in &line.rows {
            out.push_str(row.trim_end());
            out.push('\n');
        }
    }
    Ok(out)
}

/// Non-interactive `ratmail dump`.
pub(crate) fn run_dump(args: &DumpCmd, config: &TreeConfig) -> Result<String> {
    let decoration = Decoration::new(config.style, config.decoration.clone());
    let depth = args.collapse_depth.or(config.collapse_depth);
    let lines = match &args.dir {
        Some(dir) => {
            let tree = collapsible(DirectoryTree::new(dir.clone()), depth);
            collect_lines(&tree, &decoration, describe_entry)
        }
        None => {
            let source = args.maildir.clone().or_else(|| config.maildir.clone());
            let (messages, _) = load_source(source.as_deref())?;
            let tree = collapsible(
                NestedTree::new(ThreadTree::new(messages), config.show_covered),
                depth,
            );
            collect_lines(&tree, &decoration, describe_thread)
        }
    };
    render_lines(&lines, args.json)
}
