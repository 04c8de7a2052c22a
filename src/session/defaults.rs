use super::{calls, Session};
use crate::command::Command;
use crate::config::ProjectDefaults;
use crate::input::focus::FocusArea;
use crate::panels::Panel;

impl Session {
    /// `D` on a list: make the selected server (or site) this directory's
    /// default, or clear it if it already is.
    pub(super) fn toggle_default(&mut self) -> Vec<Command> {
        let Some(server) = self.selected_server.as_ref() else {
            return Vec::new();
        };
        let site = match self.focus {
            FocusArea::ResourceList => None,
            FocusArea::ContextList => match self.selected_site.as_ref() {
                Some(site) => Some(site.name.as_str()),
                None => return Vec::new(),
            },
            FocusArea::DetailPanel => return Vec::new(),
        };
        vec![Command::SaveDefaults(self.defaults.toggled(&server.name, site))]
    }

    pub(super) fn on_defaults_saved(&mut self, defaults: ProjectDefaults, result: Result<(), String>) -> Vec<Command> {
        if let Err(message) = result {
            return self.error(format!("Failed to save default: {message}"));
        }
        let message = match (&defaults.server, &defaults.site) {
            (Some(server), Some(site)) => format!("Set {server}/{site} as default"),
            (Some(server), None) => format!("Set {server} as default server"),
            _ => "Cleared default".to_string(),
        };
        self.defaults = defaults;
        self.mark_defaults();
        self.info(message)
    }

    /// Star the default server and site in the lists.
    pub(super) fn mark_defaults(&mut self) {
        self.servers.set_default(self.defaults.server.clone());
        let site = match (&self.defaults.server, &self.defaults.site) {
            (Some(server), Some(site)) => self.servers.find_named(server).map(|s| (s.id, site.clone())),
            _ => None,
        };
        self.sites.set_default(site);
    }

    /// Before the first server is picked up, put the cursor on the default.
    pub(super) fn point_at_default_server(&mut self) {
        if let Some(name) = self.defaults.server.as_deref() {
            if !self.servers.select_named(name) {
                tracing::info!("Default server {} not found on this account", name);
            }
        }
    }

    /// Having landed on the default server, open its sites and remember
    /// which one to select when they arrive.
    pub(super) fn open_default_server(&mut self) -> Vec<Command> {
        let Some(server) = self.selected_server.as_ref() else {
            return Vec::new();
        };
        if !self.defaults.is_server(&server.name) {
            return Vec::new();
        }
        tracing::info!("Opening default server {}", server.name);
        self.pending_default_site = self.defaults.site.clone().map(|site| (server.id, site));
        self.set_focus(FocusArea::ContextList);
        calls(self.sites.load())
    }

    pub(super) fn point_at_default_site(&mut self, server_id: u64) {
        let Some((pending_server, name)) = self.pending_default_site.take() else {
            return;
        };
        if pending_server != server_id {
            return;
        }
        if !self.sites.select_named(&name) {
            tracing::info!("Default site {} not found on server {}", name, server_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;
    use pretty_assertions::assert_eq;

    use super::super::fixtures::*;
    use super::*;
    use crate::action::{Action, Loaded};
    use crate::command::ApiCall;

    fn saved_defaults(commands: &[Command]) -> Option<ProjectDefaults> {
        commands.iter().find_map(|c| match c {
            Command::SaveDefaults(defaults) => Some(defaults.clone()),
            _ => None,
        })
    }

    fn started_with(defaults: ProjectDefaults) -> (Session, Vec<Command>) {
        let mut session = Session::new(config()).with_defaults(defaults);
        session.init();
        let commands = session.update(Action::Loaded(Loaded::Servers(vec![server(1, "web-1"), server(2, "web-2")])));
        (session, commands)
    }

    #[test]
    fn test_default_server_and_site_are_opened_at_startup() {
        let (mut session, commands) = started_with(ProjectDefaults::site("WEB-2", "b.test"));
        assert_eq!(session.selected_server().map(|s| s.id), Some(2));
        assert_eq!(session.focus(), FocusArea::ContextList);
        assert_eq!(api_calls(&commands), vec![ApiCall::ListSites { server_id: 2 }]);

        session.update(Action::Loaded(Loaded::Sites {
            server_id: 2,
            sites: vec![site(20, 2, "a.test"), site(21, 2, "b.test")],
        }));
        assert_eq!(session.selected_site().map(|s| s.id), Some(21));

        // Only the first load is steered.
        session.update(Action::Loaded(Loaded::Servers(vec![server(1, "web-1"), server(2, "web-2")])));
        assert_eq!(session.focus(), FocusArea::ContextList);
    }

    #[test]
    fn test_unknown_default_falls_back_to_first_server() {
        let (session, commands) = started_with(ProjectDefaults::server("gone"));
        assert_eq!(session.selected_server().map(|s| s.id), Some(1));
        assert_eq!(session.focus(), FocusArea::ResourceList);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_toggle_on_server_then_clear() {
        let mut session = with_servers();
        let commands = press(&mut session, 'D');
        let defaults = saved_defaults(&commands).unwrap();
        assert_eq!(defaults, ProjectDefaults::server("web-1"));

        session.update(Action::DefaultsSaved {
            defaults,
            result: Ok(()),
        });
        assert_eq!(
            session.toast().map(|t| t.message.as_str()),
            Some("Set web-1 as default server")
        );

        let commands = press(&mut session, 'D');
        assert_eq!(saved_defaults(&commands), Some(ProjectDefaults::default()));
    }

    #[test]
    fn test_toggle_on_site_sets_both() {
        let mut session = with_sites();
        let commands = press(&mut session, 'D');
        assert_eq!(saved_defaults(&commands), Some(ProjectDefaults::site("web-1", "a.test")));
    }

    #[test]
    fn test_toggle_ignored_in_detail() {
        let mut session = in_detail();
        let commands = session.update(key(KeyCode::Char('D')));
        assert!(saved_defaults(&commands).is_none());
    }

    #[test]
    fn test_failed_save_keeps_old_defaults() {
        let mut session = with_servers();
        session.update(Action::DefaultsSaved {
            defaults: ProjectDefaults::server("web-2"),
            result: Err("permission denied".to_string()),
        });
        assert_eq!(
            session.toast().map(|t| t.message.as_str()),
            Some("Failed to save default: permission denied")
        );
        let commands = press(&mut session, 'D');
        assert_eq!(saved_defaults(&commands), Some(ProjectDefaults::server("web-1")));
    }
}
