use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{HelpBinding, Panel, PanelEvent};
use crate::action::Loaded;
use crate::config::Theme;
use crate::forge::Site;

/// Repository facts straight from the site record.
pub struct GitPanel {
    site: Site,
}

impl GitPanel {
    pub fn new(site: Site) -> Self {
        Self { site }
    }
}

impl Panel for GitPanel {
    fn title(&self) -> String {
        "Git".to_string()
    }

    fn handle_key(&mut self, _key: KeyEvent) -> PanelEvent {
        PanelEvent::Ignored
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let site = &self.site;
        let row = |label: &'static str, value: Option<&str>| {
            Line::from(vec![
                Span::styled(format!("{label:<14}"), theme.muted()),
                Span::raw(value.unwrap_or("-").to_string()),
            ])
        };
        let status = site.repository_status.as_deref().unwrap_or("-");
        let quick_deploy = if site.quick_deploy { "enabled" } else { "disabled" };

        let lines = match site.repository.as_deref() {
            Some(repo) if !repo.is_empty() => vec![
                row("Repository", Some(repo)),
                row("Provider", site.repository_provider.as_deref()),
                row("Branch", site.repository_branch.as_deref()),
                Line::from(vec![
                    Span::styled(format!("{:<14}", "Status"), theme.muted()),
                    Span::styled(status.to_string(), Style::default().fg(theme.status_color(status))),
                ]),
                row("Quick deploy", Some(quick_deploy)),
                row("Deploy URL", site.deployment_url.as_deref()),
            ],
            _ => vec![Line::from(Span::styled("No repository installed", theme.muted()))],
        };

        let block = Block::default()
            .title(Span::styled(" Git ", theme.title_style(focused)))
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        Vec::new()
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::Sites { server_id, sites } if *server_id == self.site.server_id => {
                match sites.iter().find(|s| s.id == self.site.id) {
                    Some(site) => {
                        self.site = site.clone();
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

    #[test]
    fn test_git_panel_needs_no_remote_load() {
        let mut panel = GitPanel::new(Site::default());
        assert_eq!(panel.load(), None);
        assert!(panel.help_bindings().is_empty());
    }
}
