//! The screen contract the app shell drives.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;

/// A screen mounted in the app shell.
///
/// The shell calls `init` once, then routes keys it does not claim itself to
/// `handle_key_event`, feeds every action through `update` before acting on
/// it, and calls `render` on each render tick.
pub trait Component: Send {
    /// Keeps a sender for actions produced outside a key press.
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// React to an action. A returned action is queued behind it.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);

    /// True while a popup or text entry owns the keyboard, which suspends
    /// the shell's `q` and `?` bindings.
    fn captures_input(&self) -> bool {
        false
    }

    /// Focus tints the screen border.
    fn set_focused(&mut self, _focused: bool) {}
}
