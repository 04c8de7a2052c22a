use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered;
use crate::config::Theme;

const KEY_URL: &str = "forge.laravel.com/user/profile";
const BOX_WIDTH: u16 = 56;
const BOX_HEIGHT: u16 = 14;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    Editing,
    Validating,
    Done { user: String },
}

/// What the setup loop should do after a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupEvent {
    None,
    /// Check this key against the API.
    Submit(String),
    /// Leave without a key.
    Quit,
    /// Key saved and acknowledged; go on to the dashboard.
    Finish,
}

/// First-run prompt for the Forge API key. The key is never drawn, only
/// one dot per character.
#[derive(Debug, Clone)]
pub struct SetupScreen {
    key: String,
    stage: Stage,
    error: Option<String>,
    config_path: PathBuf,
}

impl SetupScreen {
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            key: String::new(),
            stage: Stage::Editing,
            error: None,
            config_path,
        }
    }

    pub fn is_validating(&self) -> bool {
        self.stage == Stage::Validating
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> SetupEvent {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Char('c') && ctrl {
            return SetupEvent::Quit;
        }
        match self.stage {
            Stage::Done { .. } => {
                return if key.code == KeyCode::Enter {
                    SetupEvent::Finish
                } else {
                    SetupEvent::None
                };
            }
            Stage::Validating => return SetupEvent::None,
            Stage::Editing => {}
        }
        match key.code {
            KeyCode::Esc => return SetupEvent::Quit,
            KeyCode::Enter => {
                let api_key = self.key.trim().to_string();
                self.error = None;
                if api_key.is_empty() {
                    return SetupEvent::None;
                }
                self.stage = Stage::Validating;
                return SetupEvent::Submit(api_key);
            }
            KeyCode::Backspace => {
                self.key.pop();
            }
            KeyCode::Char('u') if ctrl => self.key.clear(),
            KeyCode::Char(c) if !ctrl => self.key.push(c),
            _ => {}
        }
        SetupEvent::None
    }

    pub fn paste(&mut self, text: &str) {
        if self.stage == Stage::Editing {
            self.key.extend(text.chars().filter(|c| !c.is_whitespace()));
        }
    }

    /// The key was rejected or could not be saved. Back to editing.
    pub fn failed(&mut self, message: impl Into<String>) {
        self.stage = Stage::Editing;
        self.error = Some(message.into());
    }

    pub fn succeeded(&mut self, user: impl Into<String>) {
        self.stage = Stage::Done { user: user.into() };
        self.error = None;
    }

    pub fn render(&self, frame: &mut Frame, theme: &Theme) {
        let area = centered(frame.area(), BOX_WIDTH, BOX_HEIGHT);
        frame.render_widget(Clear, area);

        let done = matches!(self.stage, Stage::Done { .. });
        let accent = if done {
            theme.colors.success.to_color()
        } else {
            theme.colors.primary.to_color()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(accent));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let title = Style::default().fg(accent).add_modifier(Modifier::BOLD);
        let text = Style::default().fg(theme.colors.foreground.to_color());
        let mut lines = vec![Line::default()];

        match &self.stage {
            Stage::Done { user } => {
                lines.push(Line::from(Span::styled(format!("Welcome, {user}!"), title)));
                lines.push(Line::default());
                lines.push(Line::from(Span::styled("Config saved to:", text)));
                lines.push(Line::from(Span::styled(
                    self.config_path.display().to_string(),
                    theme.muted(),
                )));
                lines.push(Line::default());
                lines.push(Line::from(Span::styled("Press Enter to continue…", theme.muted())));
            }
            Stage::Editing | Stage::Validating => {
                lines.push(Line::from(Span::styled("Welcome to Phorge", title)));
                lines.push(Line::from(Span::styled("Laravel Forge TUI", text)));
                lines.push(Line::default());
                if self.is_validating() {
                    lines.push(Line::from(Span::styled("Validating API key…", theme.muted())));
                    lines.push(Line::default());
                } else {
                    lines.push(Line::from(Span::styled("Enter your Forge API key:", text)));
                    lines.push(self.masked_line(inner.width, theme));
                }
                if let Some(error) = &self.error {
                    lines.push(Line::from(Span::styled(
                        error.clone(),
                        Style::default()
                            .fg(theme.colors.error.to_color())
                            .add_modifier(Modifier::BOLD),
                    )));
                }
                lines.push(Line::default());
                lines.push(Line::from(Span::styled("Get your key from:", theme.muted())));
                lines.push(Line::from(Span::styled(KEY_URL, theme.muted())));
            }
        }

        let body = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(body, inner);
    }

    fn masked_line(&self, width: u16, theme: &Theme) -> Line<'static> {
        if self.key.is_empty() {
            return Line::from(vec![
                Span::styled("> ", theme.header_style()),
                Span::styled("paste your API key here", theme.muted()),
            ]);
        }
        // Long keys are capped at the box width.
        let room = usize::from(width.saturating_sub(4)).max(1);
        let count = self.key.chars().count();
        let dots = "•".repeat(count.min(room));
        Line::from(vec![Span::styled("> ", theme.header_style()), Span::raw(dots)])
    }
}
