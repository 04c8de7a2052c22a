//! The session reducer. `Session::update` takes one [`Action`], mutates the
//! state, and returns the [`Command`]s the app should run. It never does
//! I/O itself, so every transition can be driven from tests.
//!
//! - mod.rs: state, constructor, accessors, the `update` entry point
//! - keys.rs: modal, global, tab and focus routing
//! - dialogs.rs: panel intents and modal resolution
//! - results.rs: loaded data, completions and failures
//! - external.rs: the external-process state machine and tunnel ownership
//! - defaults.rs: the directory's default server and site

mod defaults;
mod dialogs;
mod external;
mod keys;
mod results;

use crate::action::Action;
use crate::command::{ApiCall, Command};
use crate::components::{Modal, Toast};
use crate::config::{Config, ProjectDefaults};
use crate::external::{ExternalState, TunnelHandle};
use crate::forge::{Server, Site};
use crate::input::focus::FocusArea;
use crate::panels::{Panel, ServersPanel, SitesPanel};
use crate::sections::{Multiplexer, Scope};

pub struct Session {
    config: Config,
    focus: FocusArea,
    servers: ServersPanel,
    sites: SitesPanel,
    sections: Multiplexer,
    selected_server: Option<Server>,
    selected_site: Option<Site>,
    modal: Option<Modal>,
    /// First answer of a two-step prompt, waiting for the second.
    pending_value: Option<String>,
    toast: Option<Toast>,
    tunnel: Option<TunnelHandle>,
    external: ExternalState,
    defaults: ProjectDefaults,
    /// Default site to select once its server's sites arrive at startup.
    pending_default_site: Option<(u64, String)>,
    should_quit: bool,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            focus: FocusArea::default(),
            servers: ServersPanel::new(),
            sites: SitesPanel::new(),
            sections: Multiplexer::new(),
            selected_server: None,
            selected_site: None,
            modal: None,
            pending_value: None,
            toast: None,
            tunnel: None,
            external: ExternalState::Idle,
            defaults: ProjectDefaults::default(),
            pending_default_site: None,
            should_quit: false,
        }
    }

    /// Server and site to open once the first server list arrives.
    pub fn with_defaults(mut self, defaults: ProjectDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Commands to run once at startup.
    pub fn init(&mut self) -> Vec<Command> {
        calls(self.servers.load())
    }

    pub fn update(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::Key(key) => self.handle_key(key),
            Action::Paste(text) => {
                if let Some(Modal::Input(dialog)) = self.modal.as_mut() {
                    dialog.paste(&text);
                }
                Vec::new()
            }
            Action::Resize(..) => Vec::new(),
            Action::Loaded(loaded) => self.on_loaded(loaded),
            Action::Completed(call) => self.on_completed(call),
            Action::Failed { operation, message } => self.on_failed(&operation, &message),
            Action::LaunchFailed {
                kind,
                operation,
                message,
            } => self.on_launch_failed(kind, &operation, &message),
            Action::ClearToast => {
                self.toast = None;
                Vec::new()
            }
            Action::PollDeployOutput { deployment_id } => self.on_poll_deploy_output(deployment_id),
            Action::DefaultsSaved { defaults, result } => self.on_defaults_saved(defaults, result),
            Action::TunnelOpened { tunnel, credentials } => self.on_tunnel_opened(tunnel, credentials),
            Action::ExternalStarted(kind) => self.on_external_started(kind),
            Action::ExternalExited { kind, result } => self.on_external_exited(kind, result),
            Action::EditorFinished {
                target,
                original,
                edited,
            } => self.on_editor_finished(target, original, edited),
            Action::ExternalResumed => self.on_external_resumed(),
        }
    }

    pub fn focus(&self) -> FocusArea {
        self.focus
    }

    pub fn servers(&self) -> &ServersPanel {
        &self.servers
    }

    pub fn sites(&self) -> &SitesPanel {
        &self.sites
    }

    pub fn sections(&self) -> &Multiplexer {
        &self.sections
    }

    pub fn selected_server(&self) -> Option<&Server> {
        self.selected_server.as_ref()
    }

    pub fn selected_site(&self) -> Option<&Site> {
        self.selected_site.as_ref()
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn pending_value(&self) -> Option<&str> {
        self.pending_value.as_deref()
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    #[cfg(test)]
    pub fn has_tunnel(&self) -> bool {
        self.tunnel.is_some()
    }

    #[cfg(test)]
    pub fn external_state(&self) -> ExternalState {
        self.external
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Kill anything the session still owns. Called on the way out.
    pub fn shutdown(&mut self) {
        if let Some(mut tunnel) = self.tunnel.take() {
            tunnel.shutdown();
        }
    }

    fn set_focus(&mut self, focus: FocusArea) {
        if self.focus != focus {
            tracing::debug!("Focus {} -> {}", self.focus.label(), focus.label());
            self.focus = focus;
        }
    }

    fn show_toast(&mut self, toast: Toast) -> Command {
        let delay = toast.level.duration();
        if toast.is_error() {
            tracing::warn!("{}", toast.message);
        }
        self.toast = Some(toast);
        Command::After {
            delay,
            action: Action::ClearToast,
        }
    }

    fn info(&mut self, message: impl Into<String>) -> Vec<Command> {
        vec![self.show_toast(Toast::info(message))]
    }

    fn error(&mut self, message: impl Into<String>) -> Vec<Command> {
        vec![self.show_toast(Toast::error(message))]
    }

    /// Build (or rebuild) the active tab against the current selection.
    fn activate_section(&mut self) -> Vec<Command> {
        match scope(&self.config, &self.selected_server, &self.selected_site) {
            Some(scope) => calls(self.sections.activate(&scope)),
            None => {
                self.sections.clear();
                Vec::new()
            }
        }
    }
}

fn scope<'a>(config: &'a Config, server: &'a Option<Server>, site: &'a Option<Site>) -> Option<Scope<'a>> {
    let server = server.as_ref()?;
    Some(Scope {
        server,
        site: site.as_ref(),
        ssh_user: config.ssh_user_for(&server.name),
    })
}

fn calls(call: Option<ApiCall>) -> Vec<Command> {
    call.map(Command::Api).into_iter().collect()
}
