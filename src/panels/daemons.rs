use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Rect},
    widgets::Row,
    Frame,
};

use super::{status_cell, HelpBinding, ListView, Panel, PanelEvent, LIST_BINDINGS};
use crate::action::Loaded;
use crate::command::ApiCall;
use crate::config::Theme;
use crate::forge::Daemon;
use crate::intent::{InputPurpose, PendingAction};

/// Supervisor-managed background processes on a server.
pub struct DaemonsPanel {
    server_id: u64,
    list: ListView<Daemon>,
}

impl DaemonsPanel {
    pub fn new(server_id: u64) -> Self {
        Self {
            server_id,
            list: ListView::new(),
        }
    }
}

impl Panel for DaemonsPanel {
    fn title(&self) -> String {
        "Daemons".to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        if self.list.handle_nav(&key) {
            return PanelEvent::Handled;
        }
        let server_id = self.server_id;
        let selected = self.list.selected().map(|d| (d.id, d.command.clone()));
        match (key.code, selected) {
            (KeyCode::Char('c'), _) => PanelEvent::Prompt(InputPurpose::CreateDaemon { server_id }),
            (KeyCode::Char('r'), Some((daemon_id, command))) => PanelEvent::Confirm(PendingAction::RestartDaemon {
                server_id,
                daemon_id,
                command,
            }),
            (KeyCode::Char('x'), Some((daemon_id, command))) => PanelEvent::Confirm(PendingAction::DeleteDaemon {
                server_id,
                daemon_id,
                command,
            }),
            (KeyCode::Char('r') | KeyCode::Char('x'), None) => PanelEvent::Handled,
            _ => PanelEvent::Ignored,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let rows: Vec<Row> = self
            .list
            .items()
            .iter()
            .map(|d| {
                Row::new(vec![
                    d.command.as_str().into(),
                    d.user.as_deref().unwrap_or("-").into(),
                    d.processes.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()).into(),
                    status_cell(theme, d.status.as_deref()),
                ])
            })
            .collect();

        self.list.render(
            frame,
            area,
            focused,
            theme,
            "Daemons",
            Row::new(vec!["Command", "User", "Procs", "Status"]),
            rows,
            &[
                Constraint::Fill(1),
                Constraint::Length(10),
                Constraint::Length(6),
                Constraint::Length(10),
            ],
            "No daemons",
        );
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        let mut bindings = LIST_BINDINGS.to_vec();
        bindings.extend([
            HelpBinding::new("c", "create daemon"),
            HelpBinding::new("r", "restart daemon"),
            HelpBinding::new("x", "delete daemon"),
        ]);
        bindings
    }

    fn load(&mut self) -> Option<ApiCall> {
        self.list.set_loading(true);
        Some(ApiCall::ListDaemons {
            server_id: self.server_id,
        })
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::Daemons { server_id, daemons } if *server_id == self.server_id => {
                self.list.set_items(daemons.clone());
                true
            }
            _ => false,
        }
    }

    fn stop_loading(&mut self) {
        self.list.set_loading(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_daemon_intents() {
        let mut panel = DaemonsPanel::new(1);
        assert_eq!(
            panel.handle_key(KeyEvent::from(KeyCode::Char('c'))),
            PanelEvent::Prompt(InputPurpose::CreateDaemon { server_id: 1 })
        );
        panel.apply(&Loaded::Daemons {
            server_id: 1,
            daemons: vec![Daemon {
                id: 8,
                command: "php artisan horizon".to_string(),
                ..Default::default()
            }],
        });
        assert_eq!(
            panel.handle_key(KeyEvent::from(KeyCode::Char('r'))),
            PanelEvent::Confirm(PendingAction::RestartDaemon {
                server_id: 1,
                daemon_id: 8,
                command: "php artisan horizon".to_string()
            })
        );
    }
}
