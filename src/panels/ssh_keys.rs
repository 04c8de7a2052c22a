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
use crate::forge::SshKey;
use crate::intent::{InputPurpose, PendingAction};

/// Authorized SSH keys on a server.
pub struct SshKeysPanel {
    server_id: u64,
    username: String,
    list: ListView<SshKey>,
}

impl SshKeysPanel {
    /// `username` is the account new keys are installed for.
    pub fn new(server_id: u64, username: impl Into<String>) -> Self {
        Self {
            server_id,
            username: username.into(),
            list: ListView::new(),
        }
    }
}

impl Panel for SshKeysPanel {
    fn title(&self) -> String {
        "SSH Keys".to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        if self.list.handle_nav(&key) {
            return PanelEvent::Handled;
        }
        match key.code {
            KeyCode::Char('c') => PanelEvent::Prompt(InputPurpose::SshKeyPath {
                server_id: self.server_id,
                username: self.username.clone(),
            }),
            KeyCode::Char('x') => match self.list.selected() {
                Some(k) => PanelEvent::Confirm(PendingAction::DeleteSshKey {
                    server_id: self.server_id,
                    key_id: k.id,
                    name: k.name.clone(),
                }),
                None => PanelEvent::Handled,
            },
            _ => PanelEvent::Ignored,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let rows: Vec<Row> = self
            .list
            .items()
            .iter()
            .map(|k| Row::new(vec![k.name.as_str().into(), status_cell(theme, k.status.as_deref())]))
            .collect();

        self.list.render(
            frame,
            area,
            focused,
            theme,
            "SSH Keys",
            Row::new(vec!["Name", "Status"]),
            rows,
            &[Constraint::Fill(1), Constraint::Length(12)],
            "No SSH keys",
        );
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        let mut bindings = LIST_BINDINGS.to_vec();
        bindings.extend([
            HelpBinding::new("c", "add key (file or paste)"),
            HelpBinding::new("x", "delete key"),
        ]);
        bindings
    }

    fn load(&mut self) -> Option<ApiCall> {
        self.list.set_loading(true);
        Some(ApiCall::ListSshKeys {
            server_id: self.server_id,
        })
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::SshKeys { server_id, keys } if *server_id == self.server_id => {
                self.list.set_items(keys.clone());
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
    fn test_create_starts_two_step_prompt() {
        let mut panel = SshKeysPanel::new(2, "deployer");
        assert_eq!(
            panel.handle_key(KeyEvent::from(KeyCode::Char('c'))),
            PanelEvent::Prompt(InputPurpose::SshKeyPath {
                server_id: 2,
                username: "deployer".to_string()
            })
        );
    }
}
