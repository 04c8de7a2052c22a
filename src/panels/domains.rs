use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Rect},
    widgets::Row,
    Frame,
};

use super::{HelpBinding, ListView, Panel, PanelEvent, LIST_BINDINGS};
use crate::action::Loaded;
use crate::config::Theme;
use crate::forge::Site;
use crate::intent::{InputPurpose, PendingAction};

/// Domain aliases of a site. The primary domain is shown first and cannot
/// be removed.
pub struct DomainsPanel {
    server_id: u64,
    site_id: u64,
    primary: String,
    list: ListView<String>,
}

impl DomainsPanel {
    pub fn new(site: &Site) -> Self {
        let mut panel = Self {
            server_id: site.server_id,
            site_id: site.id,
            primary: site.name.clone(),
            list: ListView::new(),
        };
        panel.list.set_items(site.aliases.clone());
        panel
    }

    fn aliases(&self) -> Vec<String> {
        self.list.items().to_vec()
    }
}

impl Panel for DomainsPanel {
    fn title(&self) -> String {
        "Domains".to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        if self.list.handle_nav(&key) {
            return PanelEvent::Handled;
        }
        match key.code {
            KeyCode::Char('a') => PanelEvent::Prompt(InputPurpose::AddDomain {
                server_id: self.server_id,
                site_id: self.site_id,
                aliases: self.aliases(),
            }),
            KeyCode::Char('x') => match self.list.selected() {
                Some(domain) => PanelEvent::Confirm(PendingAction::RemoveDomain {
                    server_id: self.server_id,
                    site_id: self.site_id,
                    domain: domain.clone(),
                    aliases: self.aliases(),
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
            .map(|alias| Row::new(vec![alias.as_str(), "alias"]))
            .collect();

        let title = format!("Domains of {}", self.primary);
        self.list.render(
            frame,
            area,
            focused,
            theme,
            &title,
            Row::new(vec!["Domain", "Kind"]),
            rows,
            &[Constraint::Fill(1), Constraint::Length(8)],
            "No aliases; press a to add one",
        );
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        let mut bindings = LIST_BINDINGS.to_vec();
        bindings.extend([
            HelpBinding::new("a", "add alias"),
            HelpBinding::new("x", "remove alias"),
        ]);
        bindings
    }

    /// Aliases live on the site record, so a sites reload refreshes them.
    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::Sites { server_id, sites } if *server_id == self.server_id => {
                match sites.iter().find(|s| s.id == self.site_id) {
                    Some(site) => {
                        self.list.set_items(site.aliases.clone());
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn site(aliases: &[&str]) -> Site {
        Site {
            id: 2,
            server_id: 1,
            name: "example.com".to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_carries_current_aliases() {
        let mut panel = DomainsPanel::new(&site(&["www.example.com"]));
        assert_eq!(
            panel.handle_key(KeyEvent::from(KeyCode::Char('a'))),
            PanelEvent::Prompt(InputPurpose::AddDomain {
                server_id: 1,
                site_id: 2,
                aliases: vec!["www.example.com".to_string()],
            })
        );
    }

    #[test]
    fn test_sites_reload_refreshes_aliases() {
        let mut panel = DomainsPanel::new(&site(&[]));
        assert_eq!(panel.handle_key(KeyEvent::from(KeyCode::Char('x'))), PanelEvent::Handled);
        assert!(panel.apply(&Loaded::Sites {
            server_id: 1,
            sites: vec![site(&["a.example.com"])],
        }));
        assert!(matches!(
            panel.handle_key(KeyEvent::from(KeyCode::Char('x'))),
            PanelEvent::Confirm(PendingAction::RemoveDomain { ref domain, .. }) if domain == "a.example.com"
        ));
    }
}
