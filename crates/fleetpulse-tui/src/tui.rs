//! The dashboard's terminal session: raw mode and the alternate screen for
//! exactly as long as a `Tui` value lives.

use std::io::{Stdout, stdout};

use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand, cursor,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Size};

/// Fallback when the terminal cannot report its size.
const DEFAULT_SIZE: Size = Size {
    width: 80,
    height: 24,
};

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    /// Take over the terminal. If setup fails halfway, whatever was switched
    /// on is switched back off before the error is returned.
    pub fn enter() -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        let mut session = Self { terminal };

        terminal::enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        stdout().execute(cursor::Hide)?;
        session.terminal.clear()?;
        Ok(session)
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Current `(width, height)`.
    pub fn size(&self) -> (u16, u16) {
        let size = self.terminal.size().unwrap_or(DEFAULT_SIZE);
        (size.width, size.height)
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        restore();
    }
}

/// Hand the terminal back to the shell. Every step runs even if an earlier
/// one fails.
fn restore() {
    let _ = stdout().execute(cursor::Show);
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

/// color-eyre reporting plus a panic hook that restores the terminal and
/// records the panic in the log file before the report is printed.
///
/// Install before `Tui::enter`.
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    let report = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        tracing::error!(panic = %info, "fleetpulse-tui panicked");
        report(info);
    }));
    Ok(())
}
