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
use crate::forge::Worker;
use crate::intent::PendingAction;

/// Queue workers of a site.
pub struct WorkersPanel {
    server_id: u64,
    site_id: u64,
    list: ListView<Worker>,
}

impl WorkersPanel {
    pub fn new(server_id: u64, site_id: u64) -> Self {
        Self {
            server_id,
            site_id,
            list: ListView::new(),
        }
    }
}

impl Panel for WorkersPanel {
    fn title(&self) -> String {
        "Workers".to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        if self.list.handle_nav(&key) {
            return PanelEvent::Handled;
        }
        let (server_id, site_id) = (self.server_id, self.site_id);
        let selected = self.list.selected().map(|w| w.id);
        match (key.code, selected) {
            (KeyCode::Char('c'), _) => PanelEvent::Confirm(PendingAction::CreateWorker { server_id, site_id }),
            (KeyCode::Char('r'), Some(worker_id)) => PanelEvent::Confirm(PendingAction::RestartWorker {
                server_id,
                site_id,
                worker_id,
            }),
            (KeyCode::Char('x'), Some(worker_id)) => PanelEvent::Confirm(PendingAction::DeleteWorker {
                server_id,
                site_id,
                worker_id,
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
            .map(|w| {
                let opt = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
                Row::new(vec![
                    w.id.to_string().into(),
                    w.connection.as_deref().unwrap_or("-").into(),
                    w.queue.as_deref().unwrap_or("-").into(),
                    opt(w.processes).into(),
                    opt(w.timeout).into(),
                    status_cell(theme, w.status.as_deref()),
                ])
            })
            .collect();

        self.list.render(
            frame,
            area,
            focused,
            theme,
            "Workers",
            Row::new(vec!["ID", "Connection", "Queue", "Procs", "Timeout", "Status"]),
            rows,
            &[
                Constraint::Length(8),
                Constraint::Length(12),
                Constraint::Fill(1),
                Constraint::Length(6),
                Constraint::Length(8),
                Constraint::Length(10),
            ],
            "No workers",
        );
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        let mut bindings = LIST_BINDINGS.to_vec();
        bindings.extend([
            HelpBinding::new("c", "create worker"),
            HelpBinding::new("r", "restart worker"),
            HelpBinding::new("x", "delete worker"),
        ]);
        bindings
    }

    fn load(&mut self) -> Option<ApiCall> {
        self.list.set_loading(true);
        Some(ApiCall::ListWorkers {
            server_id: self.server_id,
            site_id: self.site_id,
        })
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::Workers { site_id, workers } if *site_id == self.site_id => {
                self.list.set_items(workers.clone());
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
    fn test_create_needs_no_selection() {
        let mut panel = WorkersPanel::new(1, 2);
        assert_eq!(
            panel.handle_key(KeyEvent::from(KeyCode::Char('c'))),
            PanelEvent::Confirm(PendingAction::CreateWorker { server_id: 1, site_id: 2 })
        );
        assert_eq!(panel.handle_key(KeyEvent::from(KeyCode::Char('r'))), PanelEvent::Handled);
    }

    #[test]
    fn test_restart_selected_worker() {
        let mut panel = WorkersPanel::new(1, 2);
        panel.apply(&Loaded::Workers {
            site_id: 2,
            workers: vec![Worker {
                id: 77,
                ..Default::default()
            }],
        });
        assert_eq!(
            panel.handle_key(KeyEvent::from(KeyCode::Char('r'))),
            PanelEvent::Confirm(PendingAction::RestartWorker {
                server_id: 1,
                site_id: 2,
                worker_id: 77
            })
        );
    }
}
