use std::time::Duration;

use super::{calls, Session};
use crate::action::{Action, Loaded};
use crate::command::{ApiCall, Command};
use crate::components::Toast;
use crate::forge::Site;
use crate::input::focus::FocusArea;
use crate::intent::SubView;
use crate::panels::Panel;

/// Deployment output is re-fetched at this interval while it is on
/// screen and the deployment is still running.
pub const DEPLOY_POLL_INTERVAL: Duration = Duration::from_secs(2);

impl Session {
    pub(super) fn on_loaded(&mut self, loaded: Loaded) -> Vec<Command> {
        match loaded {
            Loaded::Servers(_) => {
                let first_load = self.selected_server.is_none();
                self.servers.apply(&loaded);
                if first_load {
                    self.point_at_default_server();
                }
                self.sync_server_selection();
                self.mark_defaults();
                if first_load {
                    return self.open_default_server();
                }
                Vec::new()
            }
            Loaded::Sites { server_id, ref sites } => {
                let mut commands = Vec::new();
                if self.sites.apply(&loaded) {
                    self.point_at_default_site(server_id);
                    commands = self.sync_site_selection(sites);
                }
                self.sections.apply(&loaded);
                commands
            }
            Loaded::DeploymentOutput {
                deployment_id,
                finished,
                ..
            } => {
                self.sections.apply(&loaded);
                let watching = self.sections.sub_view() == Some(SubView::DeploymentOutput { deployment_id });
                if watching && !finished {
                    vec![Command::After {
                        delay: DEPLOY_POLL_INTERVAL,
                        action: Action::PollDeployOutput { deployment_id },
                    }]
                } else {
                    Vec::new()
                }
            }
            Loaded::DbCredentials { request, credentials } => {
                if !self.awaiting_database_client() {
                    tracing::debug!("Database credentials arrived with no launch pending, dropped");
                    return Vec::new();
                }
                tracing::info!(
                    "Database credentials loaded ({:?}), opening tunnel to {}",
                    credentials.driver,
                    request.ssh_host
                );
                vec![Command::OpenTunnel { request, credentials }]
            }
            other => {
                if !self.sections.apply(&other) {
                    tracing::trace!("No panel took the result; selection moved on");
                }
                Vec::new()
            }
        }
    }

    /// Pick up the cursor's server when nothing is selected yet, or refresh
    /// the selected one in place.
    fn sync_server_selection(&mut self) {
        let Some(current) = self.servers.selected().cloned() else {
            return;
        };
        match &self.selected_server {
            None => {
                self.sites.reset(Some(current.id));
                self.selected_server = Some(current);
            }
            Some(selected) if selected.id == current.id => self.selected_server = Some(current),
            Some(_) => {}
        }
    }

    /// Keep the selected site in step with a freshly loaded list. A change
    /// of site rebuilds the detail region from tab 1.
    fn sync_site_selection(&mut self, sites: &[Site]) -> Vec<Command> {
        let previous = self.selected_site.as_ref().map(|s| s.id);
        let refreshed = previous.and_then(|id| sites.iter().find(|s| s.id == id).cloned());
        self.selected_site = refreshed.or_else(|| self.sites.selected().cloned());

        if self.selected_site.as_ref().map(|s| s.id) == previous {
            return Vec::new();
        }
        self.sections.reset();
        if self.focus == FocusArea::DetailPanel {
            return self.activate_section();
        }
        Vec::new()
    }

    pub(super) fn on_completed(&mut self, call: ApiCall) -> Vec<Command> {
        tracing::info!("{} succeeded", call.describe());
        let mut commands = Vec::new();
        if let Some(message) = call.success_message() {
            commands.push(self.show_toast(Toast::info(message)));
        }
        // Reloads are chained here rather than sent alongside the mutation
        // so they always observe its effect.
        if let Some(follow_up) = call.follow_up() {
            commands.push(Command::Api(follow_up));
        }
        commands
    }

    pub(super) fn on_failed(&mut self, operation: &str, message: &str) -> Vec<Command> {
        self.servers.stop_loading();
        self.sites.stop_loading();
        self.sections.stop_loading();
        self.error(format!("{operation} failed: {message}"))
    }

    pub(super) fn on_poll_deploy_output(&mut self, deployment_id: u64) -> Vec<Command> {
        if self.sections.sub_view() == Some(SubView::DeploymentOutput { deployment_id }) {
            calls(self.sections.reload())
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;
    use pretty_assertions::assert_eq;

    use super::super::fixtures::*;
    use super::*;
    use crate::forge::{Deployment, Server};
    use crate::sections::Section;

    fn watching_deployment() -> super::super::Session {
        let mut session = in_detail();
        session.update(Action::Loaded(Loaded::Deployments {
            site_id: 10,
            deployments: vec![Deployment {
                id: 5,
                site_id: 10,
                status: Some("deploying".to_string()),
                ..Default::default()
            }],
        }));
        let commands = session.update(key(KeyCode::Enter));
        assert_eq!(
            api_calls(&commands),
            vec![ApiCall::DeploymentOutput {
                server_id: 1,
                site_id: 10,
                deployment_id: 5
            }]
        );
        session
    }

    #[test]
    fn test_running_deployment_is_polled() {
        let mut session = watching_deployment();
        let commands = session.update(Action::Loaded(Loaded::DeploymentOutput {
            deployment_id: 5,
            output: "Cloning...".to_string(),
            finished: false,
        }));
        assert!(matches!(
            commands.as_slice(),
            [Command::After {
                action: Action::PollDeployOutput { deployment_id: 5 },
                ..
            }]
        ));

        let commands = session.update(Action::PollDeployOutput { deployment_id: 5 });
        assert_eq!(
            api_calls(&commands),
            vec![ApiCall::DeploymentOutput {
                server_id: 1,
                site_id: 10,
                deployment_id: 5
            }]
        );
    }

    #[test]
    fn test_polling_stops_when_finished_or_closed() {
        let mut session = watching_deployment();
        let commands = session.update(Action::Loaded(Loaded::DeploymentOutput {
            deployment_id: 5,
            output: "Done".to_string(),
            finished: true,
        }));
        assert!(commands.is_empty());

        session.update(key(KeyCode::Esc));
        assert!(session.update(Action::PollDeployOutput { deployment_id: 5 }).is_empty());
    }

    #[test]
    fn test_completed_mutation_toasts_then_reloads() {
        let mut session = in_detail();
        let commands = session.update(Action::Completed(ApiCall::ResetDeployStatus {
            server_id: 1,
            site_id: 10,
        }));
        assert_eq!(session.toast().map(|t| t.message.as_str()), Some("Deploy status reset"));
        assert_eq!(
            api_calls(&commands),
            vec![ApiCall::ListDeployments {
                server_id: 1,
                site_id: 10
            }]
        );
    }

    #[test]
    fn test_failed_reload_keeps_previous_rows() {
        let mut session = with_sites();
        session.update(ctrl('r'));
        session.update(Action::failed("List sites", "rate limited"));
        assert_eq!(session.selected_site().map(|s| s.id), Some(10));
        assert!(session.sites().selected().is_some());
        assert_eq!(
            session.toast().map(|t| t.message.as_str()),
            Some("List sites failed: rate limited")
        );
    }

    #[test]
    fn test_stale_sites_are_ignored() {
        let mut session = with_sites();
        session.update(Action::Loaded(Loaded::Sites {
            server_id: 2,
            sites: vec![site(30, 2, "other.test")],
        }));
        assert_eq!(session.selected_site().map(|s| s.id), Some(10));
    }

    #[test]
    fn test_sites_reload_refreshes_selected_site() {
        let mut session = in_detail();
        let mut renamed = site(10, 1, "a.test");
        renamed.aliases = vec!["new.a.test".to_string()];
        let commands = session.update(Action::Loaded(Loaded::Sites {
            server_id: 1,
            sites: vec![renamed, site(11, 1, "b.test")],
        }));
        assert!(commands.is_empty());
        assert_eq!(
            session.selected_site().map(|s| s.aliases.clone()),
            Some(vec!["new.a.test".to_string()])
        );
        assert_eq!(session.sections().section(), Some(Section::Deployments));
    }

    #[test]
    fn test_vanished_site_resets_detail() {
        let mut session = in_detail();
        session.update(key(KeyCode::Char('5')));
        let commands = session.update(Action::Loaded(Loaded::Sites {
            server_id: 1,
            sites: vec![site(11, 1, "b.test")],
        }));
        assert_eq!(session.selected_site().map(|s| s.id), Some(11));
        assert_eq!(session.sections().active_tab(), 1);
        assert_eq!(
            api_calls(&commands),
            vec![ApiCall::ListDeployments {
                server_id: 1,
                site_id: 11
            }]
        );
    }

    #[test]
    fn test_server_reload_refreshes_selection() {
        let mut session = with_servers();
        let mut updated = server(1, "web-1");
        updated.php_version = Some("php84".to_string());
        session.update(Action::Loaded(Loaded::Servers(vec![updated, server(2, "web-2")])));
        assert_eq!(
            session.selected_server().and_then(|s: &Server| s.php_version.clone()),
            Some("php84".to_string())
        );
    }
}
