use ratatui::style::{Color, Modifier, Style};
use ratmail_tree::Decoration;

use super::{TreeConfig, UiTheme, style_with_colors};

impl UiTheme {
    pub(crate) fn from_name(name: &str) -> Self {
        match name {
            "ratmail" => Self::ratmail(),
            "nord" => Self::nord(),
            "gruvbox" => Self::gruvbox(),
            _ => Self::default_theme(),
        }
    }

    pub(crate) fn default_theme() -> Self {
        Self {
            base: Style::default(),
            border: Style::default(),
            bar: Style::default(),
            show_bars: true,
            status_tab_active: Style::default().fg(Color::Black).bg(Color::Cyan),
            status_view: Style::default().fg(Color::Yellow),
            focus_bg: Style::default().bg(Color::DarkGray),
            focus_fg: Style::default().fg(Color::Yellow),
            label: Style::default().fg(Color::Gray),
            suffix: Style::default().fg(Color::DarkGray),
            separator: Style::default().fg(Color::DarkGray),
            unread: Style::default().add_modifier(Modifier::BOLD),
        }
    }

    pub(crate) fn ratmail() -> Self {
        let neon_pink = Color::Rgb(255, 45, 149); // #ff2d95
        let neon_purple = Color::Rgb(176, 38, 255); // #b026ff
        let neon_cyan = Color::Rgb(0, 255, 247); // #00fff7
        let dark_purple = Color::Rgb(26, 10, 46); // #1a0a2e
        let focus_purple = Color::Rgb(44, 18, 74); // #2c124a
        let darker_purple = Color::Rgb(13, 5, 21); // #0d0515
        let chrome_light = Color::Rgb(232, 232, 255); // #e8e8ff
        let chrome_mid = Color::Rgb(168, 168, 216); // #a8a8d8
        let chrome_dark = Color::Rgb(88, 88, 168); // #5858a8
        Self {
            base: Style::default().fg(chrome_light).bg(darker_purple),
            border: Style::default().fg(neon_purple),
            bar: Style::default().fg(chrome_light).bg(dark_purple),
            show_bars: false,
            status_tab_active: Style::default().fg(darker_purple).bg(neon_pink),
            status_view: Style::default().fg(neon_cyan),
            focus_bg: Style::default().bg(focus_purple),
            focus_fg: Style::default().fg(neon_cyan),
            label: Style::default().fg(chrome_mid),
            suffix: Style::default().fg(chrome_dark),
            separator: Style::default().fg(neon_purple),
            unread: Style::default().fg(neon_pink).add_modifier(Modifier::BOLD),
        }
    }

    pub(crate) fn nord() -> Self {
        let nord0 = Color::Rgb(46, 52, 64);
        let nord2 = Color::Rgb(67, 76, 94);
        let nord3 = Color::Rgb(76, 86, 106);
        let nord4 = Color::Rgb(216, 222, 233);
        let nord6 = Color::Rgb(236, 239, 244);
        let nord8 = Color::Rgb(136, 192, 208);
        let nord13 = Color::Rgb(235, 203, 139);
        Self {
            base: Style::default().fg(nord6).bg(nord0),
            border: Style::default().fg(nord4),
            bar: Style::default().fg(nord6).bg(nord2),
            show_bars: false,
            status_tab_active: Style::default().fg(nord0).bg(nord8),
            status_view: Style::default().fg(nord13),
            focus_bg: Style::default().bg(nord2),
            focus_fg: Style::default().fg(nord8),
            label: Style::default().fg(nord4),
            suffix: Style::default().fg(nord3),
            separator: Style::default().fg(nord3),
            unread: Style::default().fg(nord13).add_modifier(Modifier::BOLD),
        }
    }

    pub(crate) fn gruvbox() -> Self {
        let bg = Color::Rgb(40, 40, 40);
        let bg_alt = Color::Rgb(60, 56, 54);
        let fg = Color::Rgb(235, 219, 178);
        let border = Color::Rgb(146, 131, 116);
        let accent = Color::Rgb(131, 165, 152);
        let warn = Color::Rgb(250, 189, 47);
        Self {
            base: Style::default().fg(fg).bg(bg),
            border: Style::default().fg(border),
            bar: Style::default().fg(fg).bg(bg_alt),
            show_bars: true,
            status_tab_active: Style::default().fg(bg).bg(accent),
            status_view: Style::default().fg(warn),
            focus_bg: Style::default().bg(bg_alt),
            focus_fg: Style::default().fg(accent),
            label: Style::default().fg(border),
            suffix: Style::default().fg(border),
            separator: Style::default().fg(border),
            unread: Style::default().fg(warn).add_modifier(Modifier::BOLD),
        }
    }

    /// Highlight for the focused row; `[tree.colors]` focus entries win.
    pub(crate) fn focus_style(&self, config: &TreeConfig) -> Style {
        self.focus_bg
            .patch(self.focus_fg)
            .patch(style_with_colors(config.focus_fg, config.focus_bg))
    }

    /// Decoration for `config`, with tree glyphs in the theme's separator
    /// color unless the config colors them itself.
    pub(crate) fn tree_decoration(&self, config: &TreeConfig) -> Decoration<Style> {
        let mut decoration = config.decoration.clone();
        if decoration.styles.arrow.is_none() {
            decoration.styles.arrow = Some(self.separator);
        }
        if decoration.styles.icon.is_none() {
            decoration.styles.icon = Some(self.label);
        }
        Decoration::new(config.style, decoration)
    }
}
