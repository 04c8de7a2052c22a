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
use crate::forge::Certificate;
use crate::intent::{InputPurpose, PendingAction};

/// SSL certificates of a site.
pub struct CertificatesPanel {
    server_id: u64,
    site_id: u64,
    list: ListView<Certificate>,
}

impl CertificatesPanel {
    pub fn new(server_id: u64, site_id: u64) -> Self {
        Self {
            server_id,
            site_id,
            list: ListView::new(),
        }
    }
}

impl Panel for CertificatesPanel {
    fn title(&self) -> String {
        "SSL".to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        if self.list.handle_nav(&key) {
            return PanelEvent::Handled;
        }
        let (server_id, site_id) = (self.server_id, self.site_id);
        match key.code {
            KeyCode::Char('c') => PanelEvent::Prompt(InputPurpose::CreateCertificate { server_id, site_id }),
            KeyCode::Char('a') | KeyCode::Char('x') => {
                let Some(cert) = self.list.selected() else {
                    return PanelEvent::Handled;
                };
                let domain = cert.domain.clone().unwrap_or_else(|| format!("#{}", cert.id));
                if key.code == KeyCode::Char('a') {
                    PanelEvent::Confirm(PendingAction::ActivateCertificate {
                        server_id,
                        site_id,
                        certificate_id: cert.id,
                        domain,
                    })
                } else {
                    PanelEvent::Confirm(PendingAction::DeleteCertificate {
                        server_id,
                        site_id,
                        certificate_id: cert.id,
                        domain,
                    })
                }
            }
            _ => PanelEvent::Ignored,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let rows: Vec<Row> = self
            .list
            .items()
            .iter()
            .map(|cert| {
                let active = if cert.active { "✓" } else { "" };
                Row::new(vec![
                    cert.domain.as_deref().unwrap_or("-").into(),
                    cert.cert_type.as_deref().unwrap_or("-").into(),
                    status_cell(theme, cert.status.as_deref()),
                    active.into(),
                ])
            })
            .collect();

        self.list.render(
            frame,
            area,
            focused,
            theme,
            "SSL Certificates",
            Row::new(vec!["Domain", "Type", "Status", "Active"]),
            rows,
            &[
                Constraint::Fill(1),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(6),
            ],
            "No certificates",
        );
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        let mut bindings = LIST_BINDINGS.to_vec();
        bindings.extend([
            HelpBinding::new("c", "new Let's Encrypt certificate"),
            HelpBinding::new("a", "activate"),
            HelpBinding::new("x", "delete"),
        ]);
        bindings
    }

    fn load(&mut self) -> Option<ApiCall> {
        self.list.set_loading(true);
        Some(ApiCall::ListCertificates {
            server_id: self.server_id,
            site_id: self.site_id,
        })
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::Certificates { site_id, certificates } if *site_id == self.site_id => {
                self.list.set_items(certificates.clone());
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
    fn test_activate_and_delete_capture_certificate() {
        let mut panel = CertificatesPanel::new(1, 2);
        panel.apply(&Loaded::Certificates {
            site_id: 2,
            certificates: vec![Certificate {
                id: 9,
                domain: Some("example.com".to_string()),
                ..Default::default()
            }],
        });
        assert_eq!(
            panel.handle_key(KeyEvent::from(KeyCode::Char('a'))),
            PanelEvent::Confirm(PendingAction::ActivateCertificate {
                server_id: 1,
                site_id: 2,
                certificate_id: 9,
                domain: "example.com".to_string()
            })
        );
        assert!(matches!(
            panel.handle_key(KeyEvent::from(KeyCode::Char('x'))),
            PanelEvent::Confirm(PendingAction::DeleteCertificate { certificate_id: 9, .. })
        ));
    }
}
