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
use crate::forge::Deployment;
use crate::intent::{PendingAction, SubView};
use crate::util::{short_timestamp, truncate};

/// Deployment history of a site.
pub struct DeploymentsPanel {
    server_id: u64,
    site_id: u64,
    site_name: String,
    list: ListView<Deployment>,
}

impl DeploymentsPanel {
    pub fn new(server_id: u64, site_id: u64, site_name: impl Into<String>) -> Self {
        Self {
            server_id,
            site_id,
            site_name: site_name.into(),
            list: ListView::new(),
        }
    }
}

impl Panel for DeploymentsPanel {
    fn title(&self) -> String {
        "Deployments".to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        if self.list.handle_nav(&key) {
            return PanelEvent::Handled;
        }
        match key.code {
            KeyCode::Char('d') => PanelEvent::Confirm(PendingAction::Deploy {
                server_id: self.server_id,
                site_id: self.site_id,
                site: self.site_name.clone(),
            }),
            KeyCode::Char('r') => PanelEvent::Confirm(PendingAction::ResetDeploy {
                server_id: self.server_id,
                site_id: self.site_id,
            }),
            KeyCode::Char('S') => PanelEvent::Open(SubView::DeployScript),
            KeyCode::Enter => match self.list.selected() {
                Some(deployment) => PanelEvent::Open(SubView::DeploymentOutput {
                    deployment_id: deployment.id,
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
            .map(|d| {
                Row::new(vec![
                    status_cell(theme, d.status.as_deref()),
                    d.short_hash().into(),
                    truncate(d.commit_message.as_deref().unwrap_or("").lines().next().unwrap_or(""), 60).into(),
                    d.commit_author.clone().unwrap_or_default().into(),
                    d.started_at.as_deref().map(short_timestamp).unwrap_or_default().into(),
                ])
            })
            .collect();

        self.list.render(
            frame,
            area,
            focused,
            theme,
            "Deployments",
            Row::new(vec!["Status", "Commit", "Message", "Author", "Started"]),
            rows,
            &[
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Fill(1),
                Constraint::Length(16),
                Constraint::Length(16),
            ],
            "No deployments yet",
        );
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        let mut bindings = LIST_BINDINGS.to_vec();
        bindings.extend([
            HelpBinding::new("d", "deploy"),
            HelpBinding::new("r", "reset deploy status"),
            HelpBinding::new("S", "deploy script"),
            HelpBinding::new("enter", "deployment output"),
        ]);
        bindings
    }

    fn load(&mut self) -> Option<ApiCall> {
        self.list.set_loading(true);
        Some(ApiCall::ListDeployments {
            server_id: self.server_id,
            site_id: self.site_id,
        })
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::Deployments { site_id, deployments } if *site_id == self.site_id => {
                self.list.set_items(deployments.clone());
                true
            }
            _ => false,
        }
    }

    fn stop_loading(&mut self) {
        self.list.set_loading(false);
    }
}
