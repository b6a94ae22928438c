use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use ratmail_tree::DecorationStyle;

use super::TreeConfig;
use crate::cli_config::clamp_indent;

#[derive(Parser, Debug)]
#[command(name = "ratmail", version, about = "Threaded terminal mail viewer")]
pub(crate) struct Cli {
    /// Maildir or directory of .eml files; the demo mailbox when unset.
    #[arg(long)]
    pub(crate) maildir: Option<PathBuf>,
    /// indent, collapsible-indent, arrow or collapsible-arrow.
    #[arg(long, global = true)]
    pub(crate) style: Option<String>,
    /// Columns per nesting level (1-16).
    #[arg(long, global = true)]
    pub(crate) indent: Option<usize>,
    #[command(subcommand)]
    pub(crate) command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum CliCommand {
    /// Browse a directory hierarchy.
    Dir(DirCmd),
    /// Print the decorated tree and exit.
    Dump(DumpCmd),
}

#[derive(Args, Debug)]
pub(crate) struct DirCmd {
    #[arg(default_value = ".")]
    pub(crate) path: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DumpCmd {
    #[arg(long)]
    pub(crate) maildir: Option<PathBuf>,
    /// Dump a directory tree instead of mail threads.
    #[arg(long, conflicts_with = "maildir")]
    pub(crate) dir: Option<PathBuf>,
    #[arg(long)]
    pub(crate) json: bool,
    /// Positions at this depth or deeper start collapsed.
    #[arg(long = "collapse-depth")]
    pub(crate) collapse_depth: Option<usize>,
}

impl Cli {
    /// Command line flags win over `ratmail.toml`.
    pub(crate) fn apply_overrides(&self, config: &mut TreeConfig) -> Result<()> {
        if let Some(raw) = &self.style {
            config.style = DecorationStyle::parse(raw).ok_or_else(|| {
                anyhow!(
                    "unknown style '{}' (expected indent, collapsible-indent, arrow or collapsible-arrow)",
                    raw
                )
            })?;
        }
        if let Some(indent) = self.indent {
            config.decoration.indent = clamp_indent(indent as i64);
        }
        Ok(())
    }
}
