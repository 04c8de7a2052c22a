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
use crate::forge::DatabaseUser;
use crate::intent::{InputPurpose, PendingAction};

/// Drill-down from the databases section.
pub struct DatabaseUsersPanel {
    server_id: u64,
    list: ListView<DatabaseUser>,
}

impl DatabaseUsersPanel {
    pub fn new(server_id: u64) -> Self {
        Self {
            server_id,
            list: ListView::new(),
        }
    }
}

impl Panel for DatabaseUsersPanel {
    fn title(&self) -> String {
        "Database Users".to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        if self.list.handle_nav(&key) {
            return PanelEvent::Handled;
        }
        match key.code {
            KeyCode::Char('c') => PanelEvent::Prompt(InputPurpose::CreateDatabaseUser {
                server_id: self.server_id,
            }),
            KeyCode::Char('x') => match self.list.selected() {
                Some(user) => PanelEvent::Confirm(PendingAction::DeleteDatabaseUser {
                    server_id: self.server_id,
                    user_id: user.id,
                    name: user.name.clone(),
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
            .map(|user| {
                Row::new(vec![
                    user.name.as_str().into(),
                    status_cell(theme, user.status.as_deref()),
                    user.databases.len().to_string().into(),
                ])
            })
            .collect();

        self.list.render(
            frame,
            area,
            focused,
            theme,
            "Database Users",
            Row::new(vec!["Name", "Status", "DBs"]),
            rows,
            &[Constraint::Fill(1), Constraint::Length(12), Constraint::Length(4)],
            "No database users",
        );
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        let mut bindings = LIST_BINDINGS.to_vec();
        bindings.extend([
            HelpBinding::new("c", "create user"),
            HelpBinding::new("x", "delete user"),
            HelpBinding::new("esc", "back to databases"),
        ]);
        bindings
    }

    fn load(&mut self) -> Option<ApiCall> {
        self.list.set_loading(true);
        Some(ApiCall::ListDatabaseUsers {
            server_id: self.server_id,
        })
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::DatabaseUsers { server_id, users } if *server_id == self.server_id => {
                self.list.set_items(users.clone());
                true
            }
            _ => false,
        }
    }

    fn stop_loading(&mut self) {
        self.list.set_loading(false);
    }
}
