use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Hands the real terminal to a child process for the guard's lifetime.
///
/// Creating the guard leaves the alternate screen and raw mode; dropping it
/// restores both and clears the buffer so the next draw repaints everything.
pub struct TerminalSuspendGuard<'a> {
    terminal: &'a mut Tui,
}

impl<'a> TerminalSuspendGuard<'a> {
    pub fn new(terminal: &'a mut Tui) -> io::Result<Self> {
        terminal.show_cursor()?;
        disable_raw_mode()?;

        if let Err(err) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
            let _ = enable_raw_mode();
            let _ = execute!(terminal.backend_mut(), EnterAlternateScreen);
            let _ = terminal.hide_cursor();
            return Err(err);
        }

        ratatui::backend::Backend::flush(terminal.backend_mut())?;
        tracing::debug!("Terminal suspended");
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSuspendGuard<'_> {
    fn drop(&mut self) {
        let _ = enable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), EnterAlternateScreen);
        let _ = self.terminal.clear();
        let _ = self.terminal.hide_cursor();
        let _ = ratatui::backend::Backend::flush(self.terminal.backend_mut());
        tracing::debug!("Terminal resumed");
    }
}
