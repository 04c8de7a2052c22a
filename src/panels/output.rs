use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{HelpBinding, Panel, PanelEvent};
use crate::action::Loaded;
use crate::command::ApiCall;
use crate::config::Theme;
use crate::forge::SiteCommand;
use crate::util::{short_timestamp, strip_ansi};

/// Where an output view's text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    Deployment { server_id: u64, site_id: u64, deployment_id: u64 },
    Command { server_id: u64, site_id: u64, command_id: u64 },
    SiteLog { server_id: u64, site_id: u64 },
}

/// Scrollable read-only text.
pub struct OutputPanel {
    source: OutputSource,
    lines: Vec<String>,
    scroll: usize,
    loading: bool,
    /// Deployment output keeps being polled until this flips.
    finished: bool,
    /// Stick to the bottom while new output arrives.
    follow: bool,
}

impl OutputPanel {
    pub fn new(source: OutputSource) -> Self {
        Self {
            source,
            lines: Vec::new(),
            scroll: 0,
            loading: false,
            finished: !matches!(source, OutputSource::Deployment { .. }),
            follow: matches!(source, OutputSource::Deployment { .. }),
        }
    }

    pub fn source(&self) -> OutputSource {
        self.source
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn set_text(&mut self, text: &str) {
        self.lines = strip_ansi(text).lines().map(String::from).collect();
        if self.follow {
            self.scroll = self.max_scroll();
        } else {
            self.scroll = self.scroll.min(self.max_scroll());
        }
    }

    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    fn command_lines(cmd: &SiteCommand) -> Vec<String> {
        let field = |label: &str, value: &str| format!("{label:<10}{value}");
        vec![
            field("Command", &cmd.command),
            field("Status", cmd.status.as_deref().unwrap_or("-")),
            field("User", cmd.user_name.as_deref().unwrap_or("-")),
            field(
                "Created",
                &cmd.created_at.as_deref().map(short_timestamp).unwrap_or_else(|| "-".to_string()),
            ),
        ]
    }
}

impl Panel for OutputPanel {
    fn title(&self) -> String {
        match self.source {
            OutputSource::Deployment { deployment_id, .. } => format!("Deployment #{deployment_id}"),
            OutputSource::Command { command_id, .. } => format!("Command #{command_id}"),
            OutputSource::SiteLog { .. } => "Site Log".to_string(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.scroll = (self.scroll + 1).min(self.max_scroll()),
            KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::PageDown => self.scroll = (self.scroll + 20).min(self.max_scroll()),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(20),
            KeyCode::Char('g') | KeyCode::Home => self.scroll = 0,
            KeyCode::Char('G') | KeyCode::End => self.scroll = self.max_scroll(),
            _ => return PanelEvent::Ignored,
        }
        self.follow = self.scroll == self.max_scroll();
        PanelEvent::Handled
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let mut title = format!(" {} ", self.title());
        if self.loading && self.lines.is_empty() {
            title.push_str("(loading…) ");
        } else if !self.is_finished() {
            title.push_str("(deploying…) ");
        }
        let block = Block::default()
            .title(Span::styled(title, theme.title_style(focused)))
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused));

        if self.lines.is_empty() {
            let msg = if self.loading { "Loading…" } else { "No output" };
            frame.render_widget(Paragraph::new(msg).style(theme.muted()).block(block), area);
            return;
        }

        // The scroll line sits at the bottom edge once past the first page.
        let height = area.height.saturating_sub(2) as usize;
        let start = if self.scroll + 1 > height {
            self.scroll + 1 - height
        } else {
            0
        };
        let lines: Vec<Line> = self
            .lines
            .iter()
            .skip(start)
            .take(height.max(1))
            .map(|l| Line::from(l.as_str()))
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        vec![
            HelpBinding::new("j/k", "scroll"),
            HelpBinding::new("PgUp/PgDn", "page"),
            HelpBinding::new("g/G", "top/bottom"),
            HelpBinding::new("esc", "back"),
        ]
    }

    fn load(&mut self) -> Option<ApiCall> {
        self.loading = true;
        Some(match self.source {
            OutputSource::Deployment {
                server_id,
                site_id,
                deployment_id,
            } => ApiCall::DeploymentOutput {
                server_id,
                site_id,
                deployment_id,
            },
            OutputSource::Command {
                server_id,
                site_id,
                command_id,
            } => ApiCall::GetCommand {
                server_id,
                site_id,
                command_id,
            },
            OutputSource::SiteLog { server_id, site_id } => ApiCall::SiteLog { server_id, site_id },
        })
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match (self.source, loaded) {
            (
                OutputSource::Deployment { deployment_id, .. },
                Loaded::DeploymentOutput {
                    deployment_id: id,
                    output,
                    finished,
                },
            ) if deployment_id == *id => {
                self.finished = *finished;
                self.set_text(output);
            }
            (OutputSource::Command { command_id, site_id, .. }, Loaded::CommandDetail { site_id: sid, command })
                if site_id == *sid && command.id == command_id =>
            {
                self.lines = Self::command_lines(command);
                self.scroll = 0;
            }
            (OutputSource::SiteLog { site_id, .. }, Loaded::SiteLog { site_id: sid, content }) if site_id == *sid => {
                self.set_text(content);
            }
            _ => return false,
        }
        self.loading = false;
        true
    }

    fn stop_loading(&mut self) {
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn deployment_panel() -> OutputPanel {
        OutputPanel::new(OutputSource::Deployment {
            server_id: 1,
            site_id: 2,
            deployment_id: 3,
        })
    }

    #[test]
    fn test_deployment_output_tracks_completion() {
        let mut panel = deployment_panel();
        assert!(!panel.is_finished());
        assert!(panel.apply(&Loaded::DeploymentOutput {
            deployment_id: 3,
            output: "\x1b[32mcomposer install\x1b[0m\nrunning".to_string(),
            finished: false,
        }));
        assert_eq!(panel.lines, vec!["composer install", "running"]);
        assert!(!panel.is_finished());

        panel.apply(&Loaded::DeploymentOutput {
            deployment_id: 3,
            output: "done".to_string(),
            finished: true,
        });
        assert!(panel.is_finished());
    }

    #[test]
    fn test_output_for_other_deployment_is_ignored() {
        let mut panel = deployment_panel();
        assert!(!panel.apply(&Loaded::DeploymentOutput {
            deployment_id: 4,
            output: "x".to_string(),
            finished: true,
        }));
    }

    #[test]
    fn test_follow_until_user_scrolls_up() {
        let mut panel = deployment_panel();
        panel.apply(&Loaded::DeploymentOutput {
            deployment_id: 3,
            output: "a\nb\nc".to_string(),
            finished: false,
        });
        assert_eq!(panel.scroll, 2);

        panel.handle_key(KeyEvent::from(KeyCode::Char('k')));
        panel.apply(&Loaded::DeploymentOutput {
            deployment_id: 3,
            output: "a\nb\nc\nd".to_string(),
            finished: false,
        });
        assert_eq!(panel.scroll, 1);
    }

    #[test]
    fn test_command_detail_lines() {
        let mut panel = OutputPanel::new(OutputSource::Command {
            server_id: 1,
            site_id: 2,
            command_id: 5,
        });
        assert!(panel.is_finished());
        assert!(panel.apply(&Loaded::CommandDetail {
            site_id: 2,
            command: SiteCommand {
                id: 5,
                command: "php artisan about".to_string(),
                status: Some("finished".to_string()),
                ..Default::default()
            },
        }));
        assert_eq!(panel.lines[0], "Command   php artisan about");
        assert_eq!(panel.lines[1], "Status    finished");
    }
}
