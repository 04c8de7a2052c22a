// Event loop - main run() method and command execution

use std::time::Duration;

use crossterm::event::{self, Event};

use super::dispatcher;
use super::App;
use crate::action::Action;
use crate::command::Command;
use crate::error::{PhorgeError, Result};
use crate::external::{self, Launch};

impl App {
    pub fn run(&mut self) -> Result<()> {
        let commands = self.session.init();
        self.execute_all(commands)?;

        loop {
            // ---- 1. Drain results from background work ----

            let mut pending = Vec::new();
            while let Ok(action) = self.action_rx.try_recv() {
                pending.push(action);
            }
            if !pending.is_empty() {
                self.mark_dirty();
                for action in pending {
                    self.apply(action)?;
                }
            }

            if self.session.should_quit() {
                break;
            }

            // ---- 2. Poll user input (keys/paste/resize) ----

            if event::poll(Duration::from_millis(16)).map_err(|e| PhorgeError::Terminal(e.to_string()))? {
                let event = event::read().map_err(|e| PhorgeError::Terminal(e.to_string()))?;
                let action = match event {
                    Event::Key(key) => Some(Action::Key(key)),
                    Event::Paste(text) => Some(Action::Paste(text)),
                    Event::Resize(w, h) => Some(Action::Resize(w, h)),
                    _ => None,
                };
                if let Some(action) = action {
                    self.mark_dirty();
                    self.apply(action)?;
                }
            }

            if self.session.should_quit() {
                break;
            }

            // ---- 3. Draw once if anything changed ----

            if self.needs_redraw {
                self.draw()?;
                self.needs_redraw = false;
            }
        }

        tracing::info!("Session ended");
        Ok(())
    }

    fn apply(&mut self, action: Action) -> Result<()> {
        let commands = self.session.update(action);
        self.execute_all(commands)
    }

    fn execute_all(&mut self, commands: Vec<Command>) -> Result<()> {
        for command in commands {
            self.execute(command)?;
        }
        Ok(())
    }

    fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Api(call) => dispatcher::spawn_call(&self.client, call, &self.action_tx),
            Command::After { delay, action } => dispatcher::spawn_timer(delay, action, &self.action_tx),
            Command::OpenTunnel { request, credentials } => {
                dispatcher::spawn_tunnel(request, credentials, &self.action_tx)
            }
            Command::Launch(launch) => self.run_external(launch)?,
            Command::SaveDefaults(defaults) => {
                let result = defaults.save(&self.project_dir).map_err(|e| e.to_string());
                self.apply(Action::DefaultsSaved { defaults, result })?;
            }
        }
        Ok(())
    }

    /// Hand the terminal to a child and block until it exits. Input is not
    /// read meanwhile; background results queue up in the channel.
    fn run_external(&mut self, launch: Launch) -> Result<()> {
        self.apply(Action::ExternalStarted(launch.kind()))?;
        let outcome = external::run_foreground(&mut self.terminal, &launch);
        self.apply(outcome)?;

        self.draw()?;
        self.needs_redraw = false;
        self.apply(Action::ExternalResumed)
    }
}
