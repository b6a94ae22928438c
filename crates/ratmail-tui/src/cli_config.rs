use log::warn;
use ratatui::style::Style;
use ratmail_tree::{DecorationStyle, Glyphs, RoleStyles};

use super::{TreeConfig, UiConfig, load_config_text, normalize_ui_theme, parse_hex_color};
use crate::util_mod::expand_home;

pub(crate) fn clamp_indent(raw: i64) -> usize {
    raw.clamp(1, 16) as usize
}

pub(crate) fn load_ui_config() -> UiConfig {
    let Some(content) = load_config_text() else {
        return UiConfig {
            theme: "default".to_string(),
        };
    };
    let value: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(err) => {
            warn!("config parse failed: {}", err);
            return UiConfig {
                theme: "default".to_string(),
            };
        }
    };
    let theme = value
        .get("ui")
        .and_then(|ui| ui.get("theme"))
        .and_then(|v| v.as_str())
        .map(normalize_ui_theme)
        .unwrap_or_else(|| "default".to_string());
    UiConfig { theme }
}

pub(crate) fn load_tree_config() -> TreeConfig {
    let Some(content) = load_config_text() else {
        return TreeConfig::default();
    };
    match toml::from_str::<toml::Value>(&content) {
        Ok(value) => parse_tree_config(&value),
        Err(err) => {
            warn!("config parse failed: {}", err);
            TreeConfig::default()
        }
    }
}

fn non_negative(tree: &toml::Value, key: &str, default: usize) -> usize {
    match tree.get(key) {
        Some(v) => match v.as_integer() {
            Some(n) if n >= 0 => (n as usize).min(16),
            _ => {
                warn!("config warn tree.{} must be a non-negative integer", key);
                default
            }
        },
        None => default,
    }
}

/// A glyph entry is a string, or `false`/`""` to switch the role off.
fn glyph(table: Option<&toml::Value>, key: &str, default: Option<String>) -> Option<String> {
    match table.and_then(|t| t.get(key)) {
        None => default,
        Some(toml::Value::Boolean(true)) => default,
        Some(toml::Value::Boolean(false)) => None,
        Some(toml::Value::String(s)) if s.is_empty() => None,
        Some(toml::Value::String(s)) => Some(s.clone()),
        Some(_) => {
            warn!("config warn tree.glyphs.{} must be a string or false", key);
            default
        }
    }
}

/// Base glyph set named by `tree.glyphs.preset`; single roles override it.
fn glyph_preset(table: Option<&toml::Value>) -> Glyphs {
    let Some(raw) = table.and_then(|t| t.get("preset")) else {
        return Glyphs::default();
    };
    match raw.as_str().map(str::to_ascii_lowercase).as_deref() {
        Some("unicode") => Glyphs::default(),
        Some("ascii") => Glyphs::ascii(),
        Some("none") => Glyphs::none(),
        _ => {
            warn!("config warn unknown tree.glyphs.preset={}, using unicode", raw);
            Glyphs::default()
        }
    }
}

fn color(table: Option<&toml::Value>, key: &str) -> Option<ratatui::style::Color> {
    let raw = table.and_then(|t| t.get(key))?;
    let parsed = raw.as_str().and_then(parse_hex_color);
    if parsed.is_none() {
        warn!("config warn tree.colors.{}={} is not a #rrggbb color", key, raw);
    }
    parsed
}

pub(crate) fn parse_tree_config(value: &toml::Value) -> TreeConfig {
    let mut config = TreeConfig::default();
    let Some(tree) = value.get("tree") else {
        return config;
    };

    if let Some(raw) = tree.get("style").and_then(|v| v.as_str()) {
        match DecorationStyle::parse(raw) {
            Some(style) => config.style = style,
            None => warn!("config warn unknown tree.style='{}', using {}", raw, config.style.name()),
        }
    }
    match tree.get("indent").map(|v| v.as_integer()) {
        Some(Some(indent)) => config.decoration.indent = clamp_indent(indent),
        Some(None) => warn!("config warn tree.indent must be an integer"),
        None => {}
    }
    config.decoration.child_bar_offset =
        non_negative(tree, "child_bar_offset", config.decoration.child_bar_offset);
    config.decoration.icon_offset = non_negative(tree, "icon_offset", config.decoration.icon_offset);
    config.maildir = tree
        .get("maildir")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(|s| expand_home(s.trim()));
    config.collapse_depth = tree
        .get("collapse_depth")
        .and_then(|v| v.as_integer())
        .filter(|n| *n >= 0)
        .map(|n| n as usize);
    config.show_covered = tree
        .get("show_covered")
        .and_then(|v| {
            v.as_bool().or_else(|| {
                v.as_str()
                    .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
            })
        })
        .unwrap_or(true);

    let glyphs = tree.get("glyphs");
    let defaults = glyph_preset(glyphs);
    config.decoration.glyphs = Glyphs {
        hbar: glyph(glyphs, "hbar", defaults.hbar),
        vbar: glyph(glyphs, "vbar", defaults.vbar),
        tip: glyph(glyphs, "tip", defaults.tip),
        connector_tee: glyph(glyphs, "connector_tee", defaults.connector_tee),
        connector_corner: glyph(glyphs, "connector_corner", defaults.connector_corner),
        collapsed: glyph(glyphs, "collapsed", defaults.collapsed),
        expanded: glyph(glyphs, "expanded", defaults.expanded),
        frame_left: glyph(glyphs, "frame_left", defaults.frame_left),
        frame_right: glyph(glyphs, "frame_right", defaults.frame_right),
    };

    let colors = tree.get("colors");
    let role = |key: &str| color(colors, key).map(|c| Style::default().fg(c));
    config.decoration.styles = RoleStyles {
        arrow: role("arrow"),
        hbar: role("hbar"),
        vbar: role("vbar"),
        tip: role("tip"),
        connector: role("connector"),
        icon: role("icon"),
        frame: role("icon"),
    };
    config.focus_bg = color(colors, "focus_bg");
    config.focus_fg = color(colors, "focus_fg");
    config
}
