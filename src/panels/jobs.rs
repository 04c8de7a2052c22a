use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Rect},
    widgets::Row,
    Frame,
};

use super::{status_cell, HelpBinding, ListView, Panel, PanelEvent, LIST_BINDINGS};
use crate::action::Loaded;
use crate::command::ApiCall;
use crate::config::Theme;
use crate::forge::ScheduledJob;

/// Scheduled jobs (cron) on a server. Read-only.
pub struct JobsPanel {
    server_id: u64,
    list: ListView<ScheduledJob>,
}

impl JobsPanel {
    pub fn new(server_id: u64) -> Self {
        Self {
            server_id,
            list: ListView::new(),
        }
    }
}

impl Panel for JobsPanel {
    fn title(&self) -> String {
        "Jobs".to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        if self.list.handle_nav(&key) {
            PanelEvent::Handled
        } else {
            PanelEvent::Ignored
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let rows: Vec<Row> = self
            .list
            .items()
            .iter()
            .map(|job| {
                Row::new(vec![
                    job.command.as_str().into(),
                    job.user.as_deref().unwrap_or("-").into(),
                    job.cron.as_deref().or(job.frequency.as_deref()).unwrap_or("-").into(),
                    status_cell(theme, job.status.as_deref()),
                ])
            })
            .collect();

        self.list.render(
            frame,
            area,
            focused,
            theme,
            "Scheduled Jobs",
            Row::new(vec!["Command", "User", "Schedule", "Status"]),
            rows,
            &[
                Constraint::Fill(1),
                Constraint::Length(10),
                Constraint::Length(14),
                Constraint::Length(10),
            ],
            "No scheduled jobs",
        );
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        LIST_BINDINGS.to_vec()
    }

    fn load(&mut self) -> Option<ApiCall> {
        self.list.set_loading(true);
        Some(ApiCall::ListJobs {
            server_id: self.server_id,
        })
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::Jobs { server_id, jobs } if *server_id == self.server_id => {
                self.list.set_items(jobs.clone());
                true
            }
            _ => false,
        }
    }

    fn stop_loading(&mut self) {
        self.list.set_loading(false);
    }
}
