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
use crate::forge::Database;
use crate::intent::{InputPurpose, PendingAction, SubView};

pub struct DatabasesPanel {
    server_id: u64,
    list: ListView<Database>,
}

impl DatabasesPanel {
    pub fn new(server_id: u64) -> Self {
        Self {
            server_id,
            list: ListView::new(),
        }
    }
}

impl Panel for DatabasesPanel {
    fn title(&self) -> String {
        "Databases".to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        if self.list.handle_nav(&key) {
            return PanelEvent::Handled;
        }
        match key.code {
            KeyCode::Char('c') => PanelEvent::Prompt(InputPurpose::CreateDatabase {
                server_id: self.server_id,
            }),
            KeyCode::Char('x') => match self.list.selected() {
                Some(db) => PanelEvent::Confirm(PendingAction::DeleteDatabase {
                    server_id: self.server_id,
                    database_id: db.id,
                    name: db.name.clone(),
                }),
                None => PanelEvent::Handled,
            },
            KeyCode::Char('u') => PanelEvent::Open(SubView::DatabaseUsers),
            _ => PanelEvent::Ignored,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let rows: Vec<Row> = self
            .list
            .items()
            .iter()
            .map(|db| {
                let synced = if db.is_synced { "yes" } else { "no" };
                Row::new(vec![
                    db.name.as_str().into(),
                    status_cell(theme, db.status.as_deref()),
                    synced.into(),
                ])
            })
            .collect();

        self.list.render(
            frame,
            area,
            focused,
            theme,
            "Databases",
            Row::new(vec!["Name", "Status", "Synced"]),
            rows,
            &[Constraint::Fill(1), Constraint::Length(12), Constraint::Length(7)],
            "No databases",
        );
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        let mut bindings = LIST_BINDINGS.to_vec();
        bindings.extend([
            HelpBinding::new("c", "create database"),
            HelpBinding::new("x", "delete database"),
            HelpBinding::new("u", "database users"),
        ]);
        bindings
    }

    fn load(&mut self) -> Option<ApiCall> {
        self.list.set_loading(true);
        Some(ApiCall::ListDatabases {
            server_id: self.server_id,
        })
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::Databases { server_id, databases } if *server_id == self.server_id => {
                self.list.set_items(databases.clone());
                true
            }
            _ => false,
        }
    }

    fn stop_loading(&mut self) {
        self.list.set_loading(false);
    }
}
