use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local};
use log::{debug, warn};
use mailparse::{MailHeaderMap, ParsedMail, dateparse};

use crate::{AttachmentMeta, Message};

fn strip_id(raw: &str) -> String {
    raw.trim().trim_start_matches('<').trim_end_matches('>').trim().to_string()
}

fn message_ids(raw: &str) -> Vec<String> {
    raw.split_whitespace()
        .map(strip_id)
        .filter(|id| !id.is_empty())
        .collect()
}

fn format_date(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn walk_parts<F>(parsed: &ParsedMail, cb: &mut F)
where
    F: FnMut(&ParsedMail),
{
    cb(parsed);
    for part in &parsed.subparts {
        walk_parts(part, cb);
    }
}

/// First text/plain part, else the first text/html part verbatim.
fn select_body(parsed: &ParsedMail) -> Result<String> {
    if parsed.subparts.is_empty() {
        return Ok(parsed.get_body()?);
    }
    let mut text_plain: Option<String> = None;
    let mut text_html: Option<String> = None;
    walk_parts(parsed, &mut |part| {
        let ctype = part.ctype.mimetype.to_lowercase();
        if ctype == "text/plain" && text_plain.is_none() {
            if let Ok(body) = part.get_body() {
                text_plain = Some(body);
            }
        }
        if ctype == "text/html" && text_html.is_none() {
            if let Ok(body) = part.get_body() {
                text_html = Some(body);
            }
        }
    });
    text_plain
        .or(text_html)
        .ok_or_else(|| anyhow!("no displayable body found"))
}

fn collect_attachments(parsed: &ParsedMail, out: &mut Vec<AttachmentMeta>) -> Result<()> {
    if parsed.subparts.is_empty() {
        let disposition = parsed.get_content_disposition();
        let filename = disposition
            .params
            .get("filename")
            .cloned()
            .or_else(|| parsed.ctype.params.get("name").cloned());
        let is_attachment = matches!(
            disposition.disposition,
            mailparse::DispositionType::Attachment
        ) || filename.is_some();
        if is_attachment {
            out.push(AttachmentMeta {
                filename: filename.unwrap_or_else(|| "attachment".to_string()),
                mime: parsed.ctype.mimetype.to_lowercase(),
                size: parsed.get_body_raw()?.len(),
            });
        }
        return Ok(());
    }
    for part in &parsed.subparts {
        collect_attachments(part, out)?;
    }
    Ok(())
}

/// Parses one RFC 5322 message. `message_id` is empty when the header is.
pub fn parse_message(raw: &[u8]) -> Result<Message> {
    let parsed = mailparse::parse_mail(raw)?;
    let header = |name: &str| parsed.headers.get_first_value(name).unwrap_or_default();
    let timestamp = dateparse(&header("Date")).unwrap_or(0);
    let in_reply_to = message_ids(&header("In-Reply-To")).into_iter().next();
    let body = select_body(&parsed).unwrap_or_else(|err| {
        debug!("message without body: {}", err);
        String::new()
    });
    let mut attachments = Vec::new();
    collect_attachments(&parsed, &mut attachments)?;
    Ok(Message {
        message_id: strip_id(&header("Message-ID")),
        in_reply_to,
        references: message_ids(&header("References")),
        timestamp,
        date: format_date(timestamp),
        from: header("From").trim().to_string(),
        to: header("To").trim().to_string(),
        subject: header("Subject").trim().to_string(),
        body: body.replace("\r\n", "\n").trim_end().to_string(),
        attachments,
        unread: true,
    })
}

/// Maildir `cur` entries carry their flags after `:2,`; `S` means seen.
fn maildir_seen(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once(":2,"))
        .is_some_and(|(_, flags)| flags.contains('S'))
}

fn regular_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .map(|entry| entry.path())
        .filter(|path| {
            !path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Loads every message of a maildir (`cur/` + `new/`) or a flat directory of
/// `.eml` files. Unparseable files are skipped with a warning.
pub fn load_messages(dir: &Path) -> Result<Vec<Message>> {
    let cur = dir.join("cur");
    let new = dir.join("new");
    let mut files = Vec::new();
    if cur.is_dir() || new.is_dir() {
        for sub in [cur, new] {
            if sub.is_dir() {
                files.extend(regular_files(&sub)?);
            }
        }
    } else {
        files = regular_files(dir)?;
    }
    let mut messages = Vec::new();
    for path in files {
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("skipping {}: {}", path.display(), err);
                continue;
            }
        };
        let mut message = match parse_message(&raw) {
            Ok(message) => message,
            Err(err) => {
                warn!("skipping {}: {}", path.display(), err);
                continue;
            }
        };
        if message.message_id.is_empty() {
            message.message_id = format!("local:{}", path.display());
        }
        message.unread = !maildir_seen(&path);
        messages.push(message);
    }
    debug!("loaded {} messages from {}", messages.len(), dir.display());
    Ok(messages)
}
