use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, warn};
use ratmail_tree::TreeAction;

use super::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Quit,
    Tree(TreeAction),
    CycleStyle,
    Reload,
    ToggleHelp,
}

pub(crate) fn command_for(key: KeyEvent) -> Option<Command> {
    let command = match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Command::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Command::Quit,
        (KeyCode::Char('f'), KeyModifiers::CONTROL) | (KeyCode::PageDown, _) => {
            Command::Tree(TreeAction::PageDown)
        }
        (KeyCode::Char('b'), KeyModifiers::CONTROL) | (KeyCode::PageUp, _) => {
            Command::Tree(TreeAction::PageUp)
        }
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Command::Tree(TreeAction::Next),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Command::Tree(TreeAction::Prev),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Command::Tree(TreeAction::Collapse),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Command::Tree(TreeAction::Expand),
        (KeyCode::Char(' '), _) | (KeyCode::Enter, _) => Command::Tree(TreeAction::Toggle),
        (KeyCode::Char('J'), _) => Command::Tree(TreeAction::NextSibling),
        (KeyCode::Char('K'), _) => Command::Tree(TreeAction::PrevSibling),
        (KeyCode::Char('['), _) => Command::Tree(TreeAction::FirstSibling),
        (KeyCode::Char(']'), _) => Command::Tree(TreeAction::LastSibling),
        (KeyCode::Char('p'), _) => Command::Tree(TreeAction::Parent),
        (KeyCode::Char('c'), _) => Command::Tree(TreeAction::FirstChild),
        (KeyCode::Char('C'), _) => Command::Tree(TreeAction::LastChild),
        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => Command::Tree(TreeAction::First),
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Command::Tree(TreeAction::Last),
        (KeyCode::Char('n'), _) => Command::Tree(TreeAction::NextUnfolded),
        (KeyCode::Char('N'), _) => Command::Tree(TreeAction::PrevUnfolded),
        (KeyCode::Char('-'), _) => Command::Tree(TreeAction::CollapseAll),
        (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => Command::Tree(TreeAction::ExpandAll),
        (KeyCode::Char('s'), _) => Command::CycleStyle,
        (KeyCode::Char('r'), _) => Command::Reload,
        (KeyCode::Char('?'), _) => Command::ToggleHelp,
        _ => return None,
    };
    Some(command)
}

impl App {
    /// Returns true when the application should exit.
    pub(crate) fn on_key(&mut self, key: KeyEvent) -> bool {
        let Some(command) = command_for(key) else {
            return false;
        };
        // Clearing a shown message needs a redraw even if the tree stays put.
        self.dirty |= self.status_message.take().is_some();
        match command {
            Command::Quit => return true,
            Command::Tree(action) => {
                if !self.pane.handle(action) {
                    debug!("{:?} had no effect", action);
                }
                return false;
            }
            Command::CycleStyle => {
                let style = self.pane.cycle_style();
                self.status_message = Some(format!("style {}", style.name()));
            }
            Command::Reload => match self.pane.reload() {
                Ok(msg) => self.status_message = Some(msg),
                Err(err) => {
                    warn!("reload failed: {}", err);
                    self.status_message = Some(format!("reload failed: {}", err));
                }
            },
            Command::ToggleHelp => self.show_help = !self.show_help,
        }
        self.dirty = true;
        false
    }
}
