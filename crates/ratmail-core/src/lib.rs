use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use simplelog::{Config, LevelFilter, WriteLogger};

mod demo;
mod parse;
mod thread;

pub use demo::demo_messages;
pub use parse::{load_messages, parse_message};
pub use thread::{DetailLine, ThreadTree, build_threads, detail_tree};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub filename: String,
    pub mime: String,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Without angle brackets; never empty once loaded.
    pub message_id: String,
    pub in_reply_to: Option<String>,
    /// Oldest ancestor first.
    pub references: Vec<String>,
    pub timestamp: i64,
    pub date: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<AttachmentMeta>,
    pub unread: bool,
}

impl Message {
    /// Display name of the sender, falling back to the address.
    pub fn sender_name(&self) -> &str {
        let from = self.from.trim();
        match from.find('<') {
            Some(0) | None => from.trim_matches(|c| c == '<' || c == '>'),
            Some(idx) => from[..idx].trim().trim_matches('"'),
        }
    }

    /// One-line thread entry: sender, subject and date.
    pub fn summary(&self) -> String {
        let marker = if self.unread { "*" } else { " " };
        let att = if self.attachments.is_empty() { " " } else { "@" };
        format!(
            "{}{} {}  {}  {}",
            marker,
            att,
            self.sender_name(),
            self.subject,
            self.date
        )
    }
}

pub fn log_path() -> PathBuf {
    let base = std::env::var_os("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("state"))
        })
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    base.join("ratmail").join("ratmail.log")
}

fn level_from_env(raw: &str) -> LevelFilter {
    match raw.trim().to_ascii_lowercase().as_str() {
        "off" | "0" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Debug,
    }
}

/// Installs the file logger when `RATMAIL_LOG` is set; returns the log path.
///
/// The terminal is in raw mode while the UI runs, so nothing is ever logged
/// to stdout or stderr.
pub fn init_logging() -> Result<Option<PathBuf>> {
    let Ok(raw) = std::env::var("RATMAIL_LOG") else {
        return Ok(None);
    };
    let path = log_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    WriteLogger::init(level_from_env(&raw), Config::default(), file)?;
    log::info!("logging to {}", path.display());
    Ok(Some(path))
}
