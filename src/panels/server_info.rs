use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row},
    Frame,
};

use super::{HelpBinding, ListView, Panel, PanelEvent, LIST_BINDINGS};
use crate::action::Loaded;
use crate::command::ApiCall;
use crate::config::Theme;
use crate::forge::{BackupConfig, Server};
use crate::intent::PendingAction;

/// Server facts plus its backup configurations.
pub struct ServerInfoPanel {
    server: Server,
    backups: ListView<BackupConfig>,
}

impl ServerInfoPanel {
    pub fn new(server: Server) -> Self {
        Self {
            server,
            backups: ListView::new(),
        }
    }

    fn fact<'a>(label: &'a str, value: Option<&'a str>, theme: &Theme) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("{label:<12}"), theme.muted()),
            Span::raw(value.unwrap_or("-")),
        ])
    }
}

impl Panel for ServerInfoPanel {
    fn title(&self) -> String {
        format!("Server: {}", self.server.name)
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        if self.backups.handle_nav(&key) {
            return PanelEvent::Handled;
        }
        match key.code {
            KeyCode::Char('r') => PanelEvent::Confirm(PendingAction::RebootServer {
                server_id: self.server.id,
                server: self.server.name.clone(),
            }),
            _ => PanelEvent::Ignored,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(3)])
            .split(area);

        let ssh_port = self.server.ssh_port().to_string();
        let ready = if self.server.is_ready { "yes" } else { "no" };
        let lines = vec![
            Line::from(Span::styled(
                self.server.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Self::fact("IP", self.server.ip_address.as_deref(), theme),
            Self::fact("Private IP", self.server.private_ip_address.as_deref(), theme),
            Self::fact("Provider", self.server.provider.as_deref(), theme),
            Self::fact("Region", self.server.region.as_deref(), theme),
            Self::fact("PHP", self.server.php_version.as_deref(), theme),
            Self::fact("Database", self.server.database_type.as_deref(), theme),
            Self::fact("SSH port", Some(ssh_port.as_str()), theme),
            Self::fact("Ready", Some(ready), theme),
        ];
        let block = Block::default()
            .title(Span::styled(" Server ", theme.title_style(focused)))
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused));
        frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);

        let rows: Vec<Row> = self
            .backups
            .items()
            .iter()
            .map(|backup| {
                Row::new(vec![
                    backup.provider.clone().unwrap_or_else(|| "-".to_string()),
                    backup.frequency.clone().unwrap_or_else(|| "-".to_string()),
                    backup
                        .time
                        .clone()
                        .or_else(|| backup.backup_time.clone())
                        .unwrap_or_else(|| "-".to_string()),
                    backup.databases.len().to_string(),
                ])
            })
            .collect();
        self.backups.render(
            frame,
            chunks[1],
            focused,
            theme,
            "Backups",
            Row::new(vec!["Provider", "Frequency", "Time", "DBs"]),
            rows,
            &[
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Fill(1),
                Constraint::Length(4),
            ],
            "No backup configurations",
        );
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        let mut bindings = LIST_BINDINGS.to_vec();
        bindings.push(HelpBinding::new("r", "reboot server"));
        bindings
    }

    fn load(&mut self) -> Option<ApiCall> {
        self.backups.set_loading(true);
        Some(ApiCall::ListBackupConfigs {
            server_id: self.server.id,
        })
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::BackupConfigs { server_id, configs } if *server_id == self.server.id => {
                self.backups.set_items(configs.clone());
                true
            }
            _ => false,
        }
    }

    fn stop_loading(&mut self) {
        self.backups.set_loading(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reboot_requires_confirmation() {
        let mut panel = ServerInfoPanel::new(Server {
            id: 3,
            name: "web-1".to_string(),
            ..Default::default()
        });
        let event = panel.handle_key(KeyEvent::from(KeyCode::Char('r')));
        assert_eq!(
            event,
            PanelEvent::Confirm(PendingAction::RebootServer {
                server_id: 3,
                server: "web-1".to_string()
            })
        );
        assert_eq!(panel.load(), Some(ApiCall::ListBackupConfigs { server_id: 3 }));
    }
}
