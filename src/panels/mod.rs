//! Navigable views over one resource family each. A panel owns its cursor
//! and its last fetched collection, turns keys into intents, and never
//! performs I/O: loads are returned as [`ApiCall`]s for the dispatcher.

mod certificates;
mod commands;
mod daemons;
mod database_users;
mod databases;
mod deployments;
mod domains;
mod firewall;
mod git;
mod jobs;
mod list;
mod logs;
mod output;
mod server_info;
mod servers;
mod sites;
mod ssh_keys;
mod text_document;
mod workers;

pub use certificates::CertificatesPanel;
pub use commands::CommandsPanel;
pub use daemons::DaemonsPanel;
pub use database_users::DatabaseUsersPanel;
pub use databases::DatabasesPanel;
pub use deployments::DeploymentsPanel;
pub use domains::DomainsPanel;
pub use firewall::FirewallPanel;
pub use git::GitPanel;
pub use jobs::JobsPanel;
pub use list::{status_cell, ListView};
pub use logs::LogsPanel;
pub use output::{OutputPanel, OutputSource};
pub use server_info::ServerInfoPanel;
pub use servers::ServersPanel;
pub use sites::SitesPanel;
pub use ssh_keys::SshKeysPanel;
pub use text_document::TextDocumentPanel;
pub use workers::WorkersPanel;

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::action::Loaded;
use crate::command::ApiCall;
use crate::config::Theme;
use crate::external::EditTarget;
use crate::intent::{InputPurpose, PendingAction, Selection, SubView};

/// What a panel did with a key.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// Not a key this panel understands; the router may use it.
    Ignored,
    /// Consumed with only a local cursor or scroll change.
    Handled,
    Selected(Selection),
    Call(ApiCall),
    Confirm(PendingAction),
    Prompt(InputPurpose),
    Open(SubView),
    Edit(EditTarget, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpBinding {
    pub key: &'static str,
    pub desc: &'static str,
}

impl HelpBinding {
    pub const fn new(key: &'static str, desc: &'static str) -> Self {
        Self { key, desc }
    }
}

pub trait Panel {
    fn title(&self) -> String;

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent;

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme);

    fn help_bindings(&self) -> Vec<HelpBinding>;

    /// Mark the panel as loading and return the call that fetches its data.
    fn load(&mut self) -> Option<ApiCall> {
        None
    }

    /// Take a result if it belongs to this panel's scope. Returns whether
    /// it was consumed.
    fn apply(&mut self, _loaded: &Loaded) -> bool {
        false
    }

    /// Called when any call fails; the cached collection is left as is.
    fn stop_loading(&mut self) {}

    /// True while a text prompt inside the panel wants every key, so global
    /// shortcuts must not fire.
    fn is_capturing_input(&self) -> bool {
        false
    }
}

/// Navigation bindings shared by every list panel.
pub const LIST_BINDINGS: [HelpBinding; 2] = [
    HelpBinding::new("j/k", "move"),
    HelpBinding::new("g/G", "top/bottom"),
];

/// Bindings of the server and site lists on top of [`LIST_BINDINGS`].
pub const FILTER_BINDINGS: [HelpBinding; 2] = [
    HelpBinding::new("/", "filter (enter keeps, esc clears)"),
    HelpBinding::new("D", "toggle default for this directory"),
];
