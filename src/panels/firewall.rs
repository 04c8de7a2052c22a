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
use crate::forge::FirewallRule;
use crate::intent::{InputPurpose, PendingAction};

pub struct FirewallPanel {
    server_id: u64,
    list: ListView<FirewallRule>,
}

impl FirewallPanel {
    pub fn new(server_id: u64) -> Self {
        Self {
            server_id,
            list: ListView::new(),
        }
    }
}

impl Panel for FirewallPanel {
    fn title(&self) -> String {
        "Firewall".to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        if self.list.handle_nav(&key) {
            return PanelEvent::Handled;
        }
        match key.code {
            KeyCode::Char('c') => PanelEvent::Prompt(InputPurpose::CreateFirewallRule {
                server_id: self.server_id,
            }),
            KeyCode::Char('x') => match self.list.selected() {
                Some(rule) => PanelEvent::Confirm(PendingAction::DeleteFirewallRule {
                    server_id: self.server_id,
                    rule_id: rule.id,
                    name: rule.name.clone(),
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
            .map(|rule| {
                Row::new(vec![
                    rule.name.as_str().into(),
                    rule.port_label().into(),
                    rule.ip_address.as_deref().unwrap_or("any").into(),
                    rule.rule_type.as_deref().unwrap_or("allow").into(),
                    status_cell(theme, rule.status.as_deref()),
                ])
            })
            .collect();

        self.list.render(
            frame,
            area,
            focused,
            theme,
            "Firewall Rules",
            Row::new(vec!["Name", "Port", "From", "Type", "Status"]),
            rows,
            &[
                Constraint::Fill(1),
                Constraint::Length(12),
                Constraint::Length(16),
                Constraint::Length(6),
                Constraint::Length(10),
            ],
            "No firewall rules",
        );
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        let mut bindings = LIST_BINDINGS.to_vec();
        bindings.extend([
            HelpBinding::new("c", "create rule (name:port)"),
            HelpBinding::new("x", "delete rule"),
        ]);
        bindings
    }

    fn load(&mut self) -> Option<ApiCall> {
        self.list.set_loading(true);
        Some(ApiCall::ListFirewallRules {
            server_id: self.server_id,
        })
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::FirewallRules { server_id, rules } if *server_id == self.server_id => {
                self.list.set_items(rules.clone());
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
    fn test_delete_selected_rule() {
        let mut panel = FirewallPanel::new(3);
        panel.apply(&Loaded::FirewallRules {
            server_id: 3,
            rules: vec![FirewallRule {
                id: 12,
                name: "redis".to_string(),
                port: serde_json::json!(6379),
                ..Default::default()
            }],
        });
        assert_eq!(
            panel.handle_key(KeyEvent::from(KeyCode::Char('x'))),
            PanelEvent::Confirm(PendingAction::DeleteFirewallRule {
                server_id: 3,
                rule_id: 12,
                name: "redis".to_string()
            })
        );
    }
}
