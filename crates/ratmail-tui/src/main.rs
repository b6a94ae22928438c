use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{info, warn};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use ratmail_tree::{DecorationConfig, DecorationStyle};

mod cli;
mod cli_config;
mod dump_mod;
mod input_main_mod;
mod pane_mod;
mod ui_theme_mod;
mod util_mod;

use crate::cli::{Cli, CliCommand};
use crate::cli_config::{load_tree_config, load_ui_config};
use crate::pane_mod::{DirPane, ThreadPane, TreePane};
use crate::util_mod::truncate_label;

const TICK_RATE: Duration = Duration::from_millis(200);

fn main() -> Result<()> {
    let cli = Cli::parse();
    match ratmail_core::init_logging() {
        Ok(Some(path)) => info!("ratmail {} starting, log {}", env!("CARGO_PKG_VERSION"), path.display()),
        Ok(None) => {}
        Err(err) => eprintln!("ratmail: logging disabled: {}", err),
    }
    let ui_config = load_ui_config();
    let ui_theme = UiTheme::from_name(&ui_config.theme);
    let mut tree_config = load_tree_config();
    cli.apply_overrides(&mut tree_config)?;

    let pane: Box<dyn TreePane> = match &cli.command {
        Some(CliCommand::Dump(args)) => {
            print!("{}", dump_mod::run_dump(args, &tree_config)?);
            return Ok(());
        }
        Some(CliCommand::Dir(args)) => {
            let root = std::fs::canonicalize(&args.path)
                .with_context(|| format!("cannot open {}", args.path.display()))?;
            Box::new(DirPane::open(root, &tree_config, &ui_theme))
        }
        None => {
            let source = cli.maildir.clone().or_else(|| tree_config.maildir.clone());
            Box::new(ThreadPane::open(source, &tree_config, &ui_theme)?)
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, App::new(pane, ui_theme));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    if let Err(err) = &res {
        warn!("ui loop ended with error: {}", err);
    }
    res
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, mut app: App) -> Result<()> {
    loop {
        if app.take_redraw() {
            terminal.draw(|frame| ui(frame, &mut app))?;
        }

        if event::poll(TICK_RATE)? {
            match event::read()? {
                Event::Key(key) => {
                    if app.on_key(key) {
                        return Ok(());
                    }
                }
                Event::Resize(_, _) => app.dirty = true,
                _ => {}
            }
        }
    }
}

fn ui(frame: &mut ratatui::Frame, app: &mut App) {
    let area = frame.area();
    frame.render_widget(Block::default().style(app.ui_theme.base), area);
    let help_height = if app.show_help { 3 } else { 2 };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(help_height),
        ])
        .split(area);

    render_status_bar(frame, layout[0], app);
    app.pane.render(frame, layout[1]);
    render_help_bar(frame, layout[2], app);
}

fn render_status_bar(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            format!(" {} ", truncate_label(&app.pane.title(), 48)),
            app.ui_theme.status_tab_active,
        ),
        Span::styled(
            format!(" style: {} (s) ", app.pane.style().name()),
            app.ui_theme.status_view,
        ),
    ];
    if let Some(msg) = &app.status_message {
        spans.push(Span::raw(format!(" | {}", msg)));
    }
    let block = Block::default()
        .borders(if app.ui_theme.show_bars {
            Borders::BOTTOM
        } else {
            Borders::NONE
        })
        .style(app.ui_theme.bar)
        .border_style(app.ui_theme.border);
    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(app.ui_theme.bar)
            .block(block),
        area,
    );
}

fn render_help_bar(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let help = if app.show_help {
        "j/k move  h/l fold/unfold  Space toggle  J/K sibling  p parent  c/C first/last child  [ ] first/last sibling\n\
g/G top/bottom  n/N next/prev open branch  PgUp/PgDn page  -/+ fold/unfold all  s style  r reload  ? help  q quit"
    } else {
        "j/k move  h/l fold/unfold  Space toggle  J/K sibling  g/G top/bottom  -/+ all  s style  r reload  ? help  q quit"
    };
    let block = Block::default()
        .borders(if app.ui_theme.show_bars {
            Borders::TOP
        } else {
            Borders::NONE
        })
        .style(app.ui_theme.bar)
        .border_style(app.ui_theme.border);
    frame.render_widget(
        Paragraph::new(help).style(app.ui_theme.bar).block(block),
        area,
    );
}

struct App {
    pane: Box<dyn TreePane>,
    ui_theme: UiTheme,
    show_help: bool,
    status_message: Option<String>,
    /// Bars or screen size changed; the pane tracks its own changes.
    dirty: bool,
}

impl App {
    fn new(pane: Box<dyn TreePane>, ui_theme: UiTheme) -> Self {
        Self {
            pane,
            ui_theme,
            show_help: false,
            status_message: None,
            dirty: true,
        }
    }

    /// Consumes both change flags; true when the screen must be redrawn.
    fn take_redraw(&mut self) -> bool {
        let pane = self.pane.take_changed();
        std::mem::take(&mut self.dirty) | pane
    }
}

#[derive(Debug, Clone)]
struct UiConfig {
    theme: String,
}

/// `[tree]` settings after defaults and command line overrides.
#[derive(Debug, Clone)]
struct TreeConfig {
    style: DecorationStyle,
    decoration: DecorationConfig<Style>,
    maildir: Option<PathBuf>,
    collapse_depth: Option<usize>,
    show_covered: bool,
    focus_bg: Option<Color>,
    focus_fg: Option<Color>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            style: DecorationStyle::default(),
            decoration: DecorationConfig::default(),
            maildir: None,
            collapse_depth: None,
            show_covered: true,
            focus_bg: None,
            focus_fg: None,
        }
    }
}

#[derive(Debug, Clone)]
struct UiTheme {
    base: Style,
    border: Style,
    bar: Style,
    show_bars: bool,
    status_tab_active: Style,
    status_view: Style,
    focus_bg: Style,
    focus_fg: Style,
    label: Style,
    suffix: Style,
    separator: Style,
    unread: Style,
}

fn xdg_config_dir() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

fn config_path_candidates() -> Vec<PathBuf> {
    vec![
        PathBuf::from("ratmail.toml"),
        xdg_config_dir().join("ratmail").join("ratmail.toml"),
    ]
}

fn load_config_text() -> Option<String> {
    for path in config_path_candidates() {
        if let Ok(content) = std::fs::read_to_string(&path) {
            info!("config loaded from {}", path.display());
            return Some(content);
        }
    }
    None
}

fn style_with_colors(fg: Option<Color>, bg: Option<Color>) -> Style {
    let mut style = Style::default();
    if let Some(fg) = fg {
        style = style.fg(fg);
    }
    if let Some(bg) = bg {
        style = style.bg(bg);
    }
    style
}

fn normalize_ui_theme(raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    let normalized = if lowered.is_empty() {
        "default"
    } else {
        lowered.as_str()
    };
    match normalized {
        "default" | "ratmail" | "nord" | "gruvbox" => normalized.to_string(),
        _ => {
            warn!("config warn unknown ui theme='{}', using default", raw);
            "default".to_string()
        }
    }
}

fn parse_hex_color(raw: &str) -> Option<Color> {
    let trimmed = raw.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::style::Color;

    use super::{App, TreeConfig, UiTheme, normalize_ui_theme, parse_hex_color, ui};
    use crate::pane_mod::ThreadPane;

    fn rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn hex_colors_parse_with_or_without_hash() {
        assert_eq!(parse_hex_color("#ff2d95"), Some(Color::Rgb(255, 45, 149)));
        assert_eq!(parse_hex_color(" 00d4ff "), Some(Color::Rgb(0, 212, 255)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("zzzzzz"), None);
    }

    #[test]
    fn unknown_theme_names_fall_back_to_default() {
        assert_eq!(normalize_ui_theme(" Nord "), "nord");
        assert_eq!(normalize_ui_theme(""), "default");
        assert_eq!(normalize_ui_theme("neon"), "default");
    }

    #[test]
    fn screen_shows_status_tree_and_help() -> anyhow::Result<()> {
        let theme = UiTheme::default_theme();
        let pane = ThreadPane::open(None, &TreeConfig::default(), &theme)?;
        let mut app = App::new(Box::new(pane), theme);
        let mut terminal = Terminal::new(TestBackend::new(100, 12))?;
        terminal.draw(|frame| ui(frame, &mut app))?;
        let screen = rows(&terminal);
        assert!(screen[0].contains("threads: demo"));
        assert!(screen[0].contains("style: collapsible-arrow (s)"));
        assert!(screen[2].contains("[-]"));
        assert!(screen[2].contains("Northstar Outfitters"));
        assert!(screen[11].contains("q quit"));
        Ok(())
    }
}
