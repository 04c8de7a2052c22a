use std::path::Path;

use crossterm::event::KeyEvent;

use super::{calls, scope, Session};
use crate::command::{ApiCall, Command};
use crate::components::{ConfirmDialog, InputDialog, Modal, ModalOutcome};
use crate::forge::{Server, Site};
use crate::intent::{parse_domains, parse_firewall_rule, InputPurpose, Selection, SubView};
use crate::panels::PanelEvent;
use crate::util::expand_home;

impl Session {
    pub(super) fn on_panel_event(&mut self, event: PanelEvent) -> Vec<Command> {
        match event {
            PanelEvent::Ignored | PanelEvent::Handled => Vec::new(),
            PanelEvent::Selected(Selection::Server(server)) => self.select_server(server),
            PanelEvent::Selected(Selection::Site(site)) => self.select_site(site),
            PanelEvent::Call(call) => vec![Command::Api(call)],
            PanelEvent::Confirm(pending) => {
                tracing::debug!("Opening confirm {}", pending.id());
                self.modal = Some(Modal::Confirm(ConfirmDialog::new(pending)));
                Vec::new()
            }
            PanelEvent::Prompt(purpose) => {
                tracing::debug!("Opening input {}", purpose.id());
                self.modal = Some(Modal::Input(InputDialog::new(purpose)));
                Vec::new()
            }
            PanelEvent::Open(view) => self.open_sub_view(view),
            PanelEvent::Edit(target, content) => self.launch_editor(target, content),
        }
    }

    /// A new server clears everything below it.
    fn select_server(&mut self, server: Server) -> Vec<Command> {
        if self.selected_server.as_ref().map(|s| s.id) == Some(server.id) {
            return Vec::new();
        }
        tracing::debug!("Selected server {} ({})", server.name, server.id);
        self.sites.reset(Some(server.id));
        self.selected_server = Some(server);
        self.selected_site = None;
        self.sections.reset();
        Vec::new()
    }

    fn select_site(&mut self, site: Site) -> Vec<Command> {
        if self.selected_site.as_ref().map(|s| s.id) == Some(site.id) {
            return Vec::new();
        }
        tracing::debug!("Selected site {} ({})", site.name, site.id);
        self.selected_site = Some(site);
        self.sections.reset();
        Vec::new()
    }

    fn open_sub_view(&mut self, view: SubView) -> Vec<Command> {
        match scope(&self.config, &self.selected_server, &self.selected_site) {
            Some(scope) => calls(self.sections.open_sub_view(view, &scope)),
            None => Vec::new(),
        }
    }

    /// Every key goes to the open modal. Only its resolution can change
    /// anything else.
    pub(super) fn handle_modal_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let Some(modal) = self.modal.as_mut() else {
            return Vec::new();
        };
        match modal.handle_key(&key) {
            ModalOutcome::Open => Vec::new(),
            ModalOutcome::Dismiss => {
                if let Some(modal) = self.modal.take() {
                    tracing::debug!("Dismissed {}", modal.id());
                    if matches!(modal, Modal::Input(_)) {
                        self.pending_value = None;
                    }
                }
                Vec::new()
            }
            ModalOutcome::Accept => match self.modal.take() {
                Some(Modal::Confirm(dialog)) => {
                    let pending = dialog.into_pending();
                    tracing::info!("Confirmed {}", pending.id());
                    vec![Command::Api(pending.into_call())]
                }
                Some(Modal::Input(dialog)) => {
                    let (purpose, value) = dialog.into_submission();
                    tracing::info!("Submitted {}", purpose.id());
                    self.submit_input(purpose, value)
                }
                Some(Modal::Help(_)) | None => Vec::new(),
            },
        }
    }

    fn submit_input(&mut self, purpose: InputPurpose, value: String) -> Vec<Command> {
        let call = match purpose {
            InputPurpose::CreateDatabase { server_id } => ApiCall::CreateDatabase { server_id, name: value },
            InputPurpose::CreateDatabaseUser { server_id } => ApiCall::CreateDatabaseUser {
                server_id,
                password: value.clone(),
                name: value,
            },
            InputPurpose::CreateCertificate { server_id, site_id } => {
                let domains = parse_domains(&value);
                if domains.is_empty() {
                    return Vec::new();
                }
                ApiCall::CreateCertificate {
                    server_id,
                    site_id,
                    domains,
                }
            }
            InputPurpose::CreateDaemon { server_id } => ApiCall::CreateDaemon {
                server_id,
                command: value,
            },
            InputPurpose::CreateFirewallRule { server_id } => match parse_firewall_rule(&value) {
                Some((name, port)) => ApiCall::CreateFirewallRule { server_id, name, port },
                None => return self.error(format!("Invalid firewall rule \"{value}\" (expected name:port)")),
            },
            InputPurpose::RunCommand { server_id, site_id } => ApiCall::RunCommand {
                server_id,
                site_id,
                command: value,
            },
            InputPurpose::AddDomain {
                server_id,
                site_id,
                mut aliases,
            } => {
                for domain in parse_domains(&value) {
                    if !aliases.contains(&domain) {
                        aliases.push(domain);
                    }
                }
                ApiCall::UpdateAliases {
                    server_id,
                    site_id,
                    aliases,
                }
            }
            InputPurpose::SshKeyPath { server_id, username } => {
                return self.submit_ssh_key_source(server_id, username, value);
            }
            InputPurpose::SshKeyName { server_id, username } => match self.pending_value.take() {
                Some(key) => ApiCall::CreateSshKey {
                    server_id,
                    name: value,
                    key,
                    username,
                },
                None => return Vec::new(),
            },
        };
        vec![Command::Api(call)]
    }

    /// First step of adding an SSH key. A readable file is uploaded right
    /// away under its own name; anything else is treated as key text and
    /// the user is asked for a name.
    fn submit_ssh_key_source(&mut self, server_id: u64, username: String, value: String) -> Vec<Command> {
        let path = expand_home(&value);
        if path.is_file() {
            return match std::fs::read_to_string(&path) {
                Ok(content) if !content.trim().is_empty() => vec![Command::Api(ApiCall::CreateSshKey {
                    server_id,
                    name: key_name_from_path(&path),
                    key: content.trim().to_string(),
                    username,
                })],
                Ok(_) => self.error(format!("{} is empty", path.display())),
                Err(e) => self.error(format!("Failed to read {}: {}", path.display(), e)),
            };
        }

        self.pending_value = Some(value);
        self.modal = Some(Modal::Input(InputDialog::new(InputPurpose::SshKeyName {
            server_id,
            username,
        })));
        Vec::new()
    }
}

/// `~/.ssh/id_ed25519.pub` -> `id_ed25519`.
fn key_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file_name.strip_suffix(".pub") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(file_name),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crossterm::event::KeyCode;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::super::fixtures::*;
    use super::super::Session;
    use super::*;
    use crate::action::{Action, Loaded};
    use crate::command::Command;
    use crate::forge::Database;
    use crate::input::focus::FocusArea;

    /// Server-level databases tab focused with one database loaded.
    fn on_databases() -> Session {
        let mut session = with_servers();
        session.update(key(KeyCode::Char('3')));
        session.update(key(KeyCode::BackTab));
        assert_eq!(session.focus(), FocusArea::DetailPanel);
        session.update(Action::Loaded(Loaded::Databases {
            server_id: 1,
            databases: vec![Database {
                id: 4,
                server_id: 1,
                name: "shop".to_string(),
                ..Default::default()
            }],
        }));
        session
    }

    /// SSH keys tab with the path prompt open.
    fn on_ssh_key_prompt() -> Session {
        let mut session = with_servers();
        session.update(key(KeyCode::Char('9')));
        session.update(key(KeyCode::BackTab));
        press(&mut session, 'c');
        assert_eq!(session.modal().map(|m| m.id()), Some("create-sshkey-path"));
        session
    }

    #[test]
    fn test_reject_dispatches_nothing() {
        let mut session = on_databases();
        press(&mut session, 'x');
        assert_eq!(session.modal().map(|m| m.id()), Some("delete-db"));

        let commands = press(&mut session, 'n');
        assert!(commands.is_empty());
        assert!(session.modal().is_none());
        assert_eq!(session.focus(), FocusArea::DetailPanel);
        assert_eq!(session.sections().active_tab(), 3);
    }

    #[rstest]
    #[case('y')]
    #[case('Y')]
    fn test_confirm_dispatches_delete(#[case] c: char) {
        let mut session = on_databases();
        press(&mut session, 'x');
        let commands = press(&mut session, c);
        assert_eq!(
            api_calls(&commands),
            vec![ApiCall::DeleteDatabase {
                server_id: 1,
                database_id: 4
            }]
        );
        assert!(session.modal().is_none());
    }

    #[test]
    fn test_create_db_dispatches_once() {
        let mut session = on_databases();
        press(&mut session, 'c');
        assert_eq!(session.modal().map(|m| m.id()), Some("create-db"));
        type_text(&mut session, "orders");
        let commands = session.update(key(KeyCode::Enter));
        assert_eq!(
            api_calls(&commands),
            vec![ApiCall::CreateDatabase {
                server_id: 1,
                name: "orders".to_string()
            }]
        );
        assert_eq!(commands.len(), 1);
        assert!(session.modal().is_none());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_blank_submission_is_cancel(#[case] text: &str) {
        let mut session = on_databases();
        press(&mut session, 'c');
        type_text(&mut session, text);
        assert!(session.update(key(KeyCode::Enter)).is_empty());
        assert!(session.modal().is_none());
    }

    #[test]
    fn test_database_user_uses_name_as_password() {
        let mut session = on_databases();
        press(&mut session, 'u');
        press(&mut session, 'c');
        type_text(&mut session, "app");
        let commands = session.update(key(KeyCode::Enter));
        assert_eq!(
            api_calls(&commands),
            vec![ApiCall::CreateDatabaseUser {
                server_id: 1,
                name: "app".to_string(),
                password: "app".to_string()
            }]
        );
    }

    #[test]
    fn test_invalid_firewall_rule_toasts() {
        let mut session = with_servers();
        session.update(key(KeyCode::Char('7')));
        session.update(key(KeyCode::BackTab));
        press(&mut session, 'c');
        type_text(&mut session, "web:http");
        let commands = session.update(key(KeyCode::Enter));
        assert!(api_calls(&commands).is_empty());
        assert!(session.toast().is_some_and(|t| t.is_error()));
    }

    #[test]
    fn test_firewall_rule_default_port() {
        let mut session = with_servers();
        session.update(key(KeyCode::Char('7')));
        session.update(key(KeyCode::BackTab));
        press(&mut session, 'c');
        type_text(&mut session, "web");
        let commands = session.update(key(KeyCode::Enter));
        assert_eq!(
            api_calls(&commands),
            vec![ApiCall::CreateFirewallRule {
                server_id: 1,
                name: "web".to_string(),
                port: 80
            }]
        );
    }

    #[test]
    fn test_add_domain_appends_alias() {
        let mut session = in_detail();
        session.update(key(KeyCode::Char('9')));
        press(&mut session, 'a');
        type_text(&mut session, "api.a.test");
        let commands = session.update(key(KeyCode::Enter));
        assert_eq!(
            api_calls(&commands),
            vec![ApiCall::UpdateAliases {
                server_id: 1,
                site_id: 10,
                aliases: vec!["www.a.test".to_string(), "api.a.test".to_string()]
            }]
        );
    }

    #[test]
    fn test_ssh_key_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id_ed25519.pub");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "ssh-ed25519 AAAAC3Nza laptop").unwrap();

        let mut session = on_ssh_key_prompt();
        type_text(&mut session, &path.display().to_string());
        let commands = session.update(key(KeyCode::Enter));
        assert_eq!(
            api_calls(&commands),
            vec![ApiCall::CreateSshKey {
                server_id: 1,
                name: "id_ed25519".to_string(),
                key: "ssh-ed25519 AAAAC3Nza laptop".to_string(),
                username: "forge".to_string()
            }]
        );
        assert!(session.modal().is_none());
        assert!(session.pending_value().is_none());
    }

    #[test]
    fn test_ssh_key_two_step() {
        let mut session = on_ssh_key_prompt();
        type_text(&mut session, "ssh-ed25519 AAAAC3Nza");
        assert!(session.update(key(KeyCode::Enter)).is_empty());
        assert_eq!(session.modal().map(|m| m.id()), Some("create-sshkey-name"));
        assert_eq!(session.pending_value(), Some("ssh-ed25519 AAAAC3Nza"));

        type_text(&mut session, "laptop");
        let commands = session.update(key(KeyCode::Enter));
        assert_eq!(
            api_calls(&commands),
            vec![ApiCall::CreateSshKey {
                server_id: 1,
                name: "laptop".to_string(),
                key: "ssh-ed25519 AAAAC3Nza".to_string(),
                username: "forge".to_string()
            }]
        );
        assert!(session.pending_value().is_none());
        assert!(session.modal().is_none());
    }

    #[test]
    fn test_ssh_key_cancel_clears_pending() {
        let mut session = on_ssh_key_prompt();
        type_text(&mut session, "ssh-rsa AAAAB3");
        session.update(key(KeyCode::Enter));
        assert!(session.pending_value().is_some());
        session.update(key(KeyCode::Esc));
        assert!(session.pending_value().is_none());
        assert!(session.modal().is_none());
    }

    #[test]
    fn test_ssh_key_uses_server_user_override() {
        let mut session = with_servers();
        session.update(key(KeyCode::Char('j')));
        session.update(key(KeyCode::Char('9')));
        session.update(key(KeyCode::BackTab));
        press(&mut session, 'c');
        type_text(&mut session, "ssh-ed25519 AAAA");
        session.update(key(KeyCode::Enter));
        type_text(&mut session, "ci");
        let commands = session.update(key(KeyCode::Enter));
        assert!(matches!(
            commands.as_slice(),
            [Command::Api(ApiCall::CreateSshKey { server_id: 2, username, .. })] if username == "deployer"
        ));
    }

    #[rstest]
    #[case("/home/me/.ssh/id_ed25519.pub", "id_ed25519")]
    #[case("/tmp/deploy.pub", "deploy")]
    #[case("/tmp/key.txt", "key")]
    #[case("/tmp/plain", "plain")]
    fn test_key_name_from_path(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(key_name_from_path(Path::new(path)), expected);
    }
}
