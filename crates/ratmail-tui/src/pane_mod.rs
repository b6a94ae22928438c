use std::path::PathBuf;

use anyhow::Result;
use log::{debug, info};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratmail_core::{DetailLine, ThreadTree};
use ratmail_tree::{
    BoxFactory, Collapsible, Decoration, DecorationStyle, DirEntryInfo, DirectoryTree, ItemBox,
    NestedContent, NestedPosition, NestedTree, PositionedTree, TreeAction, TreeView,
};

use super::{TreeConfig, UiTheme};
use crate::util_mod::{ThreadContent, collapsible, describe_entry, describe_thread, load_source};

/// One browsable tree hosted by the main screen.
pub(crate) trait TreePane {
    fn title(&self) -> String;

    fn style(&self) -> DecorationStyle;

    /// Switches to the next decoration variant and returns it.
    fn cycle_style(&mut self) -> DecorationStyle;

    /// Returns false when the action had nothing to do.
    fn handle(&mut self, action: TreeAction) -> bool;

    /// Re-reads the underlying data; the message goes to the status bar.
    fn reload(&mut self) -> Result<String>;

    /// True once after anything visible in the pane changed.
    fn take_changed(&mut self) -> bool;

    fn render(&mut self, frame: &mut ratatui::Frame, area: Rect);
}

/// Turns thread and detail payloads into styled boxes.
#[derive(Debug, Clone)]
pub(crate) struct MessageBoxes {
    base: Style,
    unread: Style,
    label: Style,
    suffix: Style,
    focus: Style,
}

impl MessageBoxes {
    fn new(theme: &UiTheme, config: &TreeConfig) -> Self {
        Self {
            base: theme.base,
            unread: theme.base.patch(theme.unread),
            label: theme.label,
            suffix: theme.suffix,
            focus: theme.focus_style(config),
        }
    }
}

impl BoxFactory<ThreadContent> for MessageBoxes {
    type Widget = ItemBox;

    fn make_box(&self, content: ThreadContent) -> ItemBox {
        let text = describe_thread(&content);
        let style = match &content {
            NestedContent::Outer(message) if message.unread => self.unread,
            NestedContent::Outer(_) => self.base,
            NestedContent::Inner(DetailLine::Body(_)) => self.base,
            NestedContent::Inner(DetailLine::Attachment(_)) => self.suffix,
            NestedContent::Inner(_) => self.label,
        };
        ItemBox::new(text)
            .style(style)
            .focus_style(style.patch(self.focus))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EntryBoxes {
    dir: Style,
    file: Style,
    focus: Style,
}

impl BoxFactory<DirEntryInfo> for EntryBoxes {
    type Widget = ItemBox;

    fn make_box(&self, entry: DirEntryInfo) -> ItemBox {
        let style = if entry.is_dir { self.dir } else { self.file };
        ItemBox::new(describe_entry(&entry))
            .style(style)
            .focus_style(style.patch(self.focus))
    }
}

type ThreadView = TreeView<Collapsible<NestedTree<ThreadTree>>, Decoration<Style>, MessageBoxes>;

type DirView = TreeView<Collapsible<DirectoryTree>, Decoration<Style>, EntryBoxes>;

/// Mail threads with every message's detail tree nested below it.
pub(crate) struct ThreadPane {
    view: ThreadView,
    source: Option<PathBuf>,
    label: String,
    collapse_depth: Option<usize>,
    show_covered: bool,
}

impl ThreadPane {
    pub(crate) fn open(
        source: Option<PathBuf>,
        config: &TreeConfig,
        theme: &UiTheme,
    ) -> Result<Self> {
        let (messages, label) = load_source(source.as_deref())?;
        let tree = collapsible(
            NestedTree::new(ThreadTree::new(messages), config.show_covered),
            config.collapse_depth,
        );
        info!(
            "thread pane over {} ({} threads)",
            label,
            tree.inner().inner().thread_count()
        );
        Ok(Self {
            view: TreeView::new(
                tree,
                theme.tree_decoration(config),
                MessageBoxes::new(theme, config),
            ),
            source,
            label,
            collapse_depth: config.collapse_depth,
            show_covered: config.show_covered,
        })
    }

    #[cfg(test)]
    fn focused_text(&self) -> Option<String> {
        let pos = self.view.focus()?;
        let content = self.view.tree().get(pos).ok()?;
        Some(describe_thread(&content))
    }
}

impl TreePane for ThreadPane {
    fn title(&self) -> String {
        format!("threads: {}", self.label)
    }

    fn style(&self) -> DecorationStyle {
        self.view.walker().decorator().style()
    }

    fn cycle_style(&mut self) -> DecorationStyle {
        let next = self.style().next();
        let decoration = self.view.walker().decorator().clone().with_style(next);
        self.view.set_decorator(decoration);
        next
    }

    fn handle(&mut self, action: TreeAction) -> bool {
        self.view.handle(action)
    }

    /// Focus follows the message (and detail row) it was on.
    fn reload(&mut self) -> Result<String> {
        let (messages, label) = load_source(self.source.as_deref())?;
        let count = messages.len();
        let keep = self.view.focus().and_then(|pos| {
            let message = self.view.tree().inner().inner().message_at(pos.outer())?;
            Some((message.message_id.clone(), pos.inner().cloned()))
        });
        let tree = collapsible(
            NestedTree::new(ThreadTree::new(messages), self.show_covered),
            self.collapse_depth,
        );
        self.view.rebuild(tree, move |tree, _| {
            let (id, inner) = keep?;
            let outer = tree.inner().inner().position_of(&id)?;
            let detail = inner
                .map(|inner| NestedPosition::Inner(outer.clone(), inner))
                .filter(|candidate| tree.get(candidate).is_ok());
            Some(detail.unwrap_or(NestedPosition::Outer(outer)))
        });
        debug!("reloaded {} from {}", count, label);
        self.label = label;
        Ok(format!("reloaded {} messages", count))
    }

    fn take_changed(&mut self) -> bool {
        self.view.take_changed()
    }

    fn render(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        frame.render_widget(&mut self.view, area);
    }
}

/// Lazily scanned directory hierarchy.
pub(crate) struct DirPane {
    view: DirView,
}

impl DirPane {
    /// Only the root starts expanded unless `collapse_depth` says otherwise.
    pub(crate) fn open(root: PathBuf, config: &TreeConfig, theme: &UiTheme) -> Self {
        let tree = collapsible(DirectoryTree::new(root), config.collapse_depth.or(Some(1)));
        let focus = theme.focus_style(config);
        let boxes = EntryBoxes {
            dir: theme.base.patch(theme.label),
            file: theme.base,
            focus,
        };
        Self {
            view: TreeView::new(tree, theme.tree_decoration(config), boxes),
        }
    }
}

impl TreePane for DirPane {
    fn title(&self) -> String {
        format!("dir: {}", self.view.tree().inner().root_path().display())
    }

    fn style(&self) -> DecorationStyle {
        self.view.walker().decorator().style()
    }

    fn cycle_style(&mut self) -> DecorationStyle {
        let next = self.style().next();
        let decoration = self.view.walker().decorator().clone().with_style(next);
        self.view.set_decorator(decoration);
        next
    }

    fn handle(&mut self, action: TreeAction) -> bool {
        self.view.handle(action)
    }

    fn reload(&mut self) -> Result<String> {
        self.view.walker_mut().update(|tree| tree.inner().rescan());
        Ok(format!(
            "rescanned {}",
            self.view.tree().inner().root_path().display()
        ))
    }

    fn take_changed(&mut self) -> bool {
        self.view.take_changed()
    }

    fn render(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        frame.render_widget(&mut self.view, area);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratmail_tree::{DecorationStyle, TreeAction};

    use super::{DirPane, ThreadPane, TreePane};
    use crate::{TreeConfig, UiTheme};

    fn temp_dir(tag: &str) -> PathBuf {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!(
            "ratmail-tui-{}-{}-{}",
            tag,
            std::process::id(),
            ts
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn draw(pane: &mut dyn TreePane, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| pane.render(frame, frame.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    const EML: &str = "Message-ID: <a@x>\r\nFrom: Ada <ada@example.com>\r\nSubject: First\r\nDate: Fri, 13 Feb 2026 10:00:00 +0000\r\n\r\nhello\r\n";

    const REPLY: &str = "Message-ID: <b@x>\r\nIn-Reply-To: <a@x>\r\nFrom: Bob <bob@example.com>\r\nSubject: Re: First\r\nDate: Fri, 13 Feb 2026 11:00:00 +0000\r\n\r\nhi\r\n";

    #[test]
    fn thread_pane_nests_details_below_messages() -> anyhow::Result<()> {
        let mut config = TreeConfig::default();
        config.style = DecorationStyle::Indent;
        config.decoration.indent = 2;
        let mut pane = ThreadPane::open(None, &config, &UiTheme::default_theme())?;
        assert_eq!(pane.title(), "threads: demo");
        let rows = draw(&mut pane, 90, 3);
        assert!(rows[0].starts_with("*  Northstar Outfitters  Your order NS-20419 has shipped"));
        assert!(rows[1].starts_with("  From: Northstar Outfitters"));
        assert!(rows[2].starts_with("  To: Ratmail Demo"));
        Ok(())
    }

    #[test]
    fn style_cycles_through_every_variant() -> anyhow::Result<()> {
        let mut pane = ThreadPane::open(None, &TreeConfig::default(), &UiTheme::default_theme())?;
        assert_eq!(pane.style(), DecorationStyle::CollapsibleArrow);
        assert!(pane.take_changed());
        assert!(!pane.take_changed());
        assert_eq!(pane.cycle_style(), DecorationStyle::Indent);
        assert!(pane.take_changed());
        assert_eq!(pane.style(), DecorationStyle::Indent);
        let rows = draw(&mut pane, 90, 1);
        assert!(rows[0].starts_with("*  Northstar"));
        Ok(())
    }

    #[test]
    fn reload_keeps_focus_on_the_same_message() -> anyhow::Result<()> {
        let dir = temp_dir("reload");
        fs::write(dir.join("1.eml"), EML)?;
        fs::write(dir.join("2.eml"), REPLY)?;
        let mut config = TreeConfig::default();
        config.collapse_depth = Some(1);
        let mut pane = ThreadPane::open(Some(dir.clone()), &config, &UiTheme::default_theme())?;
        // root, its four detail rows, then the collapsed reply
        for _ in 0..5 {
            assert!(pane.handle(TreeAction::Next));
        }
        assert!(pane.focused_text().is_some_and(|t| t.contains("Re: First")));

        fs::write(dir.join("0.eml"), EML.replace("a@x", "c@x").replace("10:00", "12:00"))?;
        assert_eq!(pane.reload()?, "reloaded 3 messages");
        assert!(pane.focused_text().is_some_and(|t| t.contains("Re: First")));
        let _ = fs::remove_dir_all(&dir);
        Ok(())
    }

    #[test]
    fn dir_pane_starts_with_top_level_listing() -> anyhow::Result<()> {
        let dir = temp_dir("dirpane");
        fs::create_dir_all(dir.join("sub"))?;
        fs::write(dir.join("sub/inner.txt"), "x")?;
        fs::write(dir.join("file.txt"), "y")?;
        let mut config = TreeConfig::default();
        config.style = DecorationStyle::Arrow;
        config.decoration.indent = 3;
        let mut pane = DirPane::open(dir.clone(), &config, &UiTheme::default_theme());
        let rows = draw(&mut pane, 60, 4);
        assert!(rows[0].ends_with('/'));
        assert_eq!(rows[1], "\u{251c}\u{2500}\u{27a4}sub/");
        assert_eq!(rows[2], "\u{2514}\u{2500}\u{27a4}file.txt");
        assert_eq!(rows[3], "");

        fs::write(dir.join("added.txt"), "z")?;
        assert!(pane.reload()?.starts_with("rescanned"));
        let rows = draw(&mut pane, 60, 4);
        assert_eq!(rows[2], "\u{251c}\u{2500}\u{27a4}added.txt");
        assert_eq!(rows[3], "\u{2514}\u{2500}\u{27a4}file.txt");
        let _ = fs::remove_dir_all(&dir);
        Ok(())
    }
}
