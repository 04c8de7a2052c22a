// Setup - first-run API key prompt
//
// Runs on its own small loop before the dashboard exists: the key is checked
// against the API on a background task and written to the config file once
// Forge accepts it.

use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;

use crate::components::{SetupEvent, SetupScreen};
use crate::config::{Config, Theme};
use crate::error::{PhorgeError, Result};
use crate::external::Tui;
use crate::forge::{ForgeClient, ForgeResult, User};

struct Validated {
    api_key: String,
    outcome: ForgeResult<User>,
}

/// Ask for an API key and save it into `config` at `path`. `None` means the
/// user left without one.
pub fn run_setup(config: Config, path: &Path) -> Result<Option<Config>> {
    let mut terminal = super::enter_terminal()?;
    let result = setup_loop(&mut terminal, config, path);
    super::restore_terminal();
    result
}

fn setup_loop(terminal: &mut Tui, mut config: Config, path: &Path) -> Result<Option<Config>> {
    let theme = Theme::default();
    let mut screen = SetupScreen::new(path.to_path_buf());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut dirty = true;

    loop {
        if dirty {
            terminal
                .draw(|frame| screen.render(frame, &theme))
                .map_err(|e| PhorgeError::Terminal(e.to_string()))?;
            dirty = false;
        }

        while let Ok(validated) = rx.try_recv() {
            on_validated(&mut screen, &mut config, path, validated);
            dirty = true;
        }

        if !event::poll(Duration::from_millis(16)).map_err(|e| PhorgeError::Terminal(e.to_string()))? {
            continue;
        }
        match event::read().map_err(|e| PhorgeError::Terminal(e.to_string()))? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                dirty = true;
                match screen.handle_key(&key) {
                    SetupEvent::None => {}
                    SetupEvent::Submit(api_key) => validate(&config.forge.base_url, api_key, tx.clone()),
                    SetupEvent::Quit => {
                        tracing::info!("Setup cancelled");
                        return Ok(None);
                    }
                    SetupEvent::Finish => return Ok(Some(config)),
                }
            }
            Event::Paste(text) => {
                screen.paste(&text);
                dirty = true;
            }
            Event::Resize(..) => dirty = true,
            _ => {}
        }
    }
}

fn validate(base_url: &str, api_key: String, tx: mpsc::UnboundedSender<Validated>) {
    let client = ForgeClient::new(base_url, api_key.clone());
    tokio::spawn(async move {
        let outcome = match client {
            Ok(client) => client.get_user().await,
            Err(e) => Err(e),
        };
        let _ = tx.send(Validated { api_key, outcome });
    });
}

fn on_validated(screen: &mut SetupScreen, config: &mut Config, path: &Path, validated: Validated) {
    let user = match validated.outcome {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("API key rejected: {}", e);
            screen.failed(e.to_string());
            return;
        }
    };
    let previous = std::mem::replace(&mut config.forge.api_key, validated.api_key);
    match config.save_to(path) {
        Ok(()) => {
            tracing::info!("API key accepted for {}", user.name);
            screen.succeeded(user.name);
        }
        Err(e) => {
            config.forge.api_key = previous;
            screen.failed(format!("Failed to save config: {e}"));
        }
    }
}
