use super::Session;
use crate::command::{ApiCall, Command};
use crate::external::{DbCredentials, EditTarget, ExternalState, Launch, LaunchKind, TunnelHandle};

impl Session {
    /// A child owns the terminal, or a tunnel is still up.
    fn external_busy(&self) -> bool {
        !self.external.is_idle() || self.tunnel.is_some()
    }

    /// User, host and port for SSH-based launches on the selected server.
    fn ssh_target(&self) -> Option<Result<(String, String, u16), String>> {
        let server = self.selected_server.as_ref()?;
        if server.ip().is_empty() {
            return Some(Err(format!("{} has no public IP address", server.name)));
        }
        Some(Ok((
            self.config.ssh_user_for(&server.name).to_string(),
            server.ip().to_string(),
            server.ssh_port(),
        )))
    }

    /// Credentials and the tunnel are only wanted while the database flow
    /// that asked for them is still pending.
    pub(super) fn awaiting_database_client(&self) -> bool {
        self.external == ExternalState::Launching(LaunchKind::DatabaseClient) && self.tunnel.is_none()
    }

    fn begin_launch(&mut self, launch: Launch) -> Vec<Command> {
        let kind = launch.kind();
        tracing::info!("{} requested", kind.label());
        self.external = ExternalState::Launching(kind);
        vec![Command::Launch(launch)]
    }

    pub(super) fn launch_shell(&mut self) -> Vec<Command> {
        let (user, host, port) = match self.ssh_target() {
            None => return Vec::new(),
            Some(Err(message)) => return self.error(message),
            Some(Ok(target)) => target,
        };
        if self.external_busy() {
            return self.error("Another external process is running");
        }
        let directory = self
            .selected_site
            .as_ref()
            .and_then(|s| s.directory())
            .map(String::from);
        self.begin_launch(Launch::Shell {
            user,
            host,
            port,
            directory,
        })
    }

    pub(super) fn launch_file_browser(&mut self) -> Vec<Command> {
        let (user, host, port) = match self.ssh_target() {
            None => return Vec::new(),
            Some(Err(message)) => return self.error(message),
            Some(Ok(target)) => target,
        };
        if self.external_busy() {
            return self.error("Another external process is running");
        }
        let path = self
            .selected_site
            .as_ref()
            .and_then(|s| s.directory())
            .unwrap_or("/")
            .to_string();
        self.begin_launch(Launch::FileBrowser { user, host, port, path })
    }

    /// Start the database flow: credentials first, then the tunnel, then
    /// the client. Refused while anything external is still alive.
    pub(super) fn request_database_client(&mut self) -> Vec<Command> {
        let (Some(server_id), Some(site_id)) = (
            self.selected_server.as_ref().map(|s| s.id),
            self.selected_site.as_ref().map(|s| s.id),
        ) else {
            return Vec::new();
        };
        if self.tunnel.is_some() {
            return self.error("A database tunnel is already open");
        }
        if self.external_busy() {
            return self.error("Another external process is running");
        }
        let (ssh_user, ssh_host, ssh_port) = match self.ssh_target() {
            None => return Vec::new(),
            Some(Err(message)) => return self.error(message),
            Some(Ok(target)) => target,
        };
        self.external = ExternalState::Launching(LaunchKind::DatabaseClient);
        vec![Command::Api(ApiCall::DatabaseCredentials {
            server_id,
            site_id,
            ssh_user,
            ssh_host,
            ssh_port,
        })]
    }

    pub(super) fn launch_editor(&mut self, target: EditTarget, content: String) -> Vec<Command> {
        if self.external_busy() {
            return self.error("Another external process is running");
        }
        let editor = self.config.editor_command().to_string();
        self.begin_launch(Launch::Editor {
            editor,
            target,
            content,
        })
    }

    pub(super) fn on_tunnel_opened(&mut self, mut tunnel: TunnelHandle, credentials: DbCredentials) -> Vec<Command> {
        if !self.awaiting_database_client() {
            tracing::debug!("Tunnel on port {} opened with no launch pending, closing it", tunnel.local_port());
            tunnel.shutdown();
            return Vec::new();
        }
        if !tunnel.is_alive() {
            tunnel.shutdown();
            self.external = ExternalState::Idle;
            return self.error("SSH tunnel exited before it was ready");
        }
        let local_port = tunnel.local_port();
        self.tunnel = Some(tunnel);
        self.begin_launch(Launch::DatabaseClient {
            credentials,
            local_port,
        })
    }

    /// A step of `kind`'s launch failed before the child started.
    pub(super) fn on_launch_failed(&mut self, kind: LaunchKind, operation: &str, message: &str) -> Vec<Command> {
        if self.external == ExternalState::Launching(kind) && self.tunnel.is_none() {
            self.external = ExternalState::Idle;
        } else {
            tracing::debug!("{} failure arrived after the launch moved on", kind.label());
        }
        self.error(format!("{operation} failed: {message}"))
    }

    pub(super) fn on_external_started(&mut self, kind: LaunchKind) -> Vec<Command> {
        self.external = ExternalState::Suspended(kind);
        Vec::new()
    }

    /// The child gave the terminal back. Whatever happened to it, the
    /// tunnel goes now.
    pub(super) fn on_external_exited(&mut self, kind: LaunchKind, result: Result<(), String>) -> Vec<Command> {
        self.external = ExternalState::Resuming(kind);
        self.close_tunnel();
        match result {
            Ok(()) => Vec::new(),
            Err(message) => self.error(message),
        }
    }

    pub(super) fn on_editor_finished(
        &mut self,
        target: EditTarget,
        original: String,
        edited: Result<String, String>,
    ) -> Vec<Command> {
        self.external = ExternalState::Resuming(LaunchKind::Editor);
        self.close_tunnel();
        let content = match edited {
            Ok(content) => content,
            Err(message) => return self.error(message),
        };
        if content == original {
            return self.info("No changes");
        }
        tracing::info!("{} changed, uploading", target.label());
        let call = match target {
            EditTarget::Environment { server_id, site_id } => ApiCall::UpdateEnvironment {
                server_id,
                site_id,
                content,
            },
            EditTarget::DeployScript { server_id, site_id } => ApiCall::UpdateDeployScript {
                server_id,
                site_id,
                content,
            },
        };
        vec![Command::Api(call)]
    }

    pub(super) fn on_external_resumed(&mut self) -> Vec<Command> {
        self.external = ExternalState::Idle;
        Vec::new()
    }

    fn close_tunnel(&mut self) {
        if let Some(mut tunnel) = self.tunnel.take() {
            tunnel.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::process::Command as Process;

    use crossterm::event::KeyCode;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::super::fixtures::*;
    use super::super::Session;
    use super::*;
    use crate::action::{Action, Loaded};
    use crate::external::TunnelRequest;

    fn credentials() -> DbCredentials {
        DbCredentials::from_env("DB_CONNECTION=mysql\nDB_HOST=127.0.0.1\nDB_DATABASE=shop\nDB_USERNAME=forge\nDB_PASSWORD=secret\n")
            .unwrap()
    }

    fn live_tunnel() -> TunnelHandle {
        let child = Process::new("sleep").arg("30").spawn().unwrap();
        TunnelHandle::new(child, 45000)
    }

    /// Drive the database flow up to the running client.
    fn with_db_client() -> Session {
        let mut session = with_sites();
        let commands = session.update(ctrl('d'));
        assert_eq!(
            api_calls(&commands),
            vec![ApiCall::DatabaseCredentials {
                server_id: 1,
                site_id: 10,
                ssh_user: "forge".to_string(),
                ssh_host: "203.0.113.1".to_string(),
                ssh_port: 22,
            }]
        );
        session.update(Action::TunnelOpened {
            tunnel: live_tunnel(),
            credentials: credentials(),
        });
        session.update(Action::ExternalStarted(LaunchKind::DatabaseClient));
        session
    }

    #[rstest]
    #[case(Ok(()))]
    #[case(Err("lazysql exited with exit status: 1".to_string()))]
    fn test_tunnel_released_on_client_exit(#[case] result: Result<(), String>) {
        let mut session = with_db_client();
        assert!(session.has_tunnel());
        assert_eq!(
            session.external_state(),
            ExternalState::Suspended(LaunchKind::DatabaseClient)
        );

        let failed = result.is_err();
        session.update(Action::ExternalExited {
            kind: LaunchKind::DatabaseClient,
            result,
        });
        assert!(!session.has_tunnel());
        assert_eq!(session.toast().is_some_and(|t| t.is_error()), failed);

        session.update(Action::ExternalResumed);
        assert_eq!(session.external_state(), ExternalState::Idle);
    }

    #[test]
    fn test_credentials_open_tunnel_then_launch_client() {
        let mut session = with_sites();
        session.update(ctrl('d'));
        let request = TunnelRequest {
            ssh_user: "forge".to_string(),
            ssh_host: "203.0.113.1".to_string(),
            ssh_port: 22,
            remote_host: "127.0.0.1".to_string(),
            remote_port: 3306,
        };
        let commands = session.update(Action::Loaded(Loaded::DbCredentials {
            request: request.clone(),
            credentials: credentials(),
        }));
        assert!(matches!(
            commands.as_slice(),
            [Command::OpenTunnel { request: r, .. }] if *r == request
        ));

        let commands = session.update(Action::TunnelOpened {
            tunnel: live_tunnel(),
            credentials: credentials(),
        });
        assert!(matches!(
            commands.as_slice(),
            [Command::Launch(Launch::DatabaseClient { local_port: 45000, .. })]
        ));
        assert_eq!(
            session.external_state(),
            ExternalState::Launching(LaunchKind::DatabaseClient)
        );
        session.shutdown();
        assert!(!session.has_tunnel());
    }

    #[test]
    fn test_dead_tunnel_is_not_used() {
        let mut session = with_sites();
        session.update(ctrl('d'));
        let mut child = Process::new("true").spawn().unwrap();
        child.wait().unwrap();
        let commands = session.update(Action::TunnelOpened {
            tunnel: TunnelHandle::new(child, 45000),
            credentials: credentials(),
        });
        assert!(!commands.iter().any(|c| matches!(c, Command::Launch(_))));
        assert!(!session.has_tunnel());
        assert_eq!(session.external_state(), ExternalState::Idle);
        assert!(session.toast().is_some_and(|t| t.is_error()));
    }

    #[test]
    fn test_tunnel_failure_single_toast_and_idle() {
        let mut session = with_sites();
        session.update(ctrl('d'));
        let commands = session.update(Action::launch_failed(
            LaunchKind::DatabaseClient,
            "Open SSH tunnel",
            "could not allocate a local port",
        ));
        assert_eq!(commands.len(), 1);
        assert!(!session.has_tunnel());
        assert_eq!(session.external_state(), ExternalState::Idle);
        assert_eq!(
            session.toast().map(|t| t.message.as_str()),
            Some("Open SSH tunnel failed: could not allocate a local port")
        );
    }

    #[test]
    fn test_unrelated_failure_keeps_database_flow_pending() {
        let mut session = with_sites();
        session.update(ctrl('d'));
        session.update(Action::failed("List sites", "rate limited"));
        assert_eq!(
            session.external_state(),
            ExternalState::Launching(LaunchKind::DatabaseClient)
        );

        let commands = session.update(ctrl('d'));
        assert!(api_calls(&commands).is_empty());
        assert_eq!(
            session.toast().map(|t| t.message.as_str()),
            Some("Another external process is running")
        );
        assert_eq!(
            session.external_state(),
            ExternalState::Launching(LaunchKind::DatabaseClient)
        );
    }

    #[test]
    fn test_late_credentials_are_dropped() {
        let mut session = with_sites();
        let request = TunnelRequest {
            ssh_user: "forge".to_string(),
            ssh_host: "203.0.113.1".to_string(),
            ssh_port: 22,
            remote_host: "127.0.0.1".to_string(),
            remote_port: 3306,
        };
        let commands = session.update(Action::Loaded(Loaded::DbCredentials {
            request,
            credentials: credentials(),
        }));
        assert!(commands.is_empty());
        assert_eq!(session.external_state(), ExternalState::Idle);
    }

    #[test]
    fn test_stray_tunnel_is_closed_not_adopted() {
        let mut session = with_sites();
        let commands = session.update(Action::TunnelOpened {
            tunnel: live_tunnel(),
            credentials: credentials(),
        });
        assert!(commands.is_empty());
        assert!(!session.has_tunnel());
        assert_eq!(session.external_state(), ExternalState::Idle);
    }

    #[test]
    fn test_second_tunnel_does_not_replace_the_first() {
        let mut session = with_db_client();
        let commands = session.update(Action::TunnelOpened {
            tunnel: live_tunnel(),
            credentials: credentials(),
        });
        assert!(commands.is_empty());
        assert!(session.has_tunnel());
        assert_eq!(
            session.external_state(),
            ExternalState::Suspended(LaunchKind::DatabaseClient)
        );
        session.shutdown();
    }

    #[test]
    fn test_db_client_refused_while_tunnel_open() {
        let mut session = with_db_client();
        let commands = session.update(ctrl('d'));
        assert!(api_calls(&commands).is_empty());
        assert!(session.toast().is_some_and(|t| t.is_error()));
        session.shutdown();
    }

    #[test]
    fn test_db_client_needs_a_site() {
        let mut session = with_servers();
        assert!(session.update(ctrl('d')).is_empty());
        assert_eq!(session.external_state(), ExternalState::Idle);
    }

    #[test]
    fn test_shell_cds_into_site_directory() {
        let mut session = with_sites();
        let commands = session.update(ctrl('s'));
        assert!(matches!(
            commands.as_slice(),
            [Command::Launch(Launch::Shell { user, host, port: 22, directory: Some(dir) })]
                if user == "forge" && host == "203.0.113.1" && dir == "/home/forge/a.test"
        ));
        assert_eq!(session.external_state(), ExternalState::Launching(LaunchKind::Shell));
    }

    #[test]
    fn test_file_browser_defaults_to_root() {
        let mut session = with_servers();
        let commands = session.update(ctrl('f'));
        assert!(matches!(
            commands.as_slice(),
            [Command::Launch(Launch::FileBrowser { path, .. })] if path == "/"
        ));
    }

    #[test]
    fn test_server_without_ip_is_refused() {
        let mut session = Session::new(config());
        session.update(Action::Loaded(Loaded::Servers(vec![crate::forge::Server {
            id: 3,
            name: "pending".to_string(),
            ..Default::default()
        }])));
        let commands = session.update(ctrl('s'));
        assert!(!commands.iter().any(|c| matches!(c, Command::Launch(_))));
        assert!(session.toast().is_some_and(|t| t.is_error()));
    }

    #[test]
    fn test_editor_round_trip() {
        let mut session = in_detail();
        let target = EditTarget::Environment {
            server_id: 1,
            site_id: 10,
        };

        let commands = session.update(Action::EditorFinished {
            target: target.clone(),
            original: "APP_ENV=production\n".to_string(),
            edited: Ok("APP_ENV=production\n".to_string()),
        });
        assert!(api_calls(&commands).is_empty());
        assert_eq!(session.toast().map(|t| t.message.as_str()), Some("No changes"));

        let commands = session.update(Action::EditorFinished {
            target,
            original: "APP_ENV=production\n".to_string(),
            edited: Ok("APP_ENV=staging\n".to_string()),
        });
        assert_eq!(
            api_calls(&commands),
            vec![ApiCall::UpdateEnvironment {
                server_id: 1,
                site_id: 10,
                content: "APP_ENV=staging\n".to_string()
            }]
        );
    }

    #[test]
    fn test_edit_key_launches_editor() {
        let mut session = in_detail();
        session.update(key(KeyCode::Char('2')));
        session.update(Action::Loaded(Loaded::Environment {
            site_id: 10,
            content: "APP_KEY=x\n".to_string(),
        }));
        let commands = press(&mut session, 'e');
        assert!(matches!(
            commands.as_slice(),
            [Command::Launch(Launch::Editor { editor, content, .. })] if editor == "vim" && content == "APP_KEY=x\n"
        ));
    }
}
