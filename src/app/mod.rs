// App module - the host loop around the session reducer
// - mod.rs: App struct, terminal setup and teardown
// - event_loop.rs: run() loop and command execution
// - dispatcher.rs: background API calls, timers and the SSH tunnel
// - rendering.rs: all UI drawing (draw method)
// - setup.rs: first-run API key prompt, run before the App exists

mod dispatcher;
mod event_loop;
mod rendering;
mod setup;

pub use setup::run_setup;

use std::io;
use std::path::PathBuf;

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::config::{Config, ProjectDefaults, Theme};
use crate::error::{PhorgeError, Result};
use crate::external::Tui;
use crate::forge::ForgeClient;
use crate::session::Session;

pub struct App {
    terminal: Tui,
    session: Session,
    theme: Theme,
    client: ForgeClient,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    needs_redraw: bool,
    /// Where `.phorge` defaults are read from and written to.
    project_dir: PathBuf,
}

impl App {
    pub fn new(config: Config, client: ForgeClient, defaults: ProjectDefaults, project_dir: PathBuf) -> Result<Self> {
        let terminal = enter_terminal()?;
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            session: Session::new(config).with_defaults(defaults),
            theme: Theme::default(),
            client,
            action_tx,
            action_rx,
            needs_redraw: true,
            project_dir,
        })
    }

    pub(super) fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.session.shutdown();
        restore_terminal();
    }
}

/// Raw mode, alternate screen and bracketed paste. If any step fails the
/// earlier ones are undone before the error is returned.
fn enter_terminal() -> Result<Tui> {
    enable_raw_mode().map_err(|e| PhorgeError::Terminal(e.to_string()))?;
    let mut stdout = io::stdout();
    let entered = execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .and_then(|()| Terminal::new(CrosstermBackend::new(stdout)));
    or_undo(entered, restore_terminal)
}

fn or_undo<T>(result: io::Result<T>, undo: impl FnOnce()) -> Result<T> {
    result.map_err(|e| {
        undo();
        PhorgeError::Terminal(e.to_string())
    })
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
}
