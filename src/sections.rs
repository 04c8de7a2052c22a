//! Maps the numeric tabs of the detail region to panels. The same tab
//! number means a site-scoped view when a site is selected and a
//! server-scoped view otherwise.

use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::action::Loaded;
use crate::command::ApiCall;
use crate::config::Theme;
use crate::external::EditTarget;
use crate::forge::{Server, Site};
use crate::intent::SubView;
use crate::panels::{
    CertificatesPanel, CommandsPanel, DaemonsPanel, DatabaseUsersPanel, DatabasesPanel, DeploymentsPanel,
    DomainsPanel, FirewallPanel, GitPanel, HelpBinding, JobsPanel, LogsPanel, OutputPanel, OutputSource, Panel,
    PanelEvent, ServerInfoPanel, SshKeysPanel, TextDocumentPanel, WorkersPanel,
};

pub const TAB_COUNT: u8 = 9;
pub const DEFAULT_TAB: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    ServerInfo,
    Deployments,
    Environment,
    Databases,
    Ssl,
    Workers,
    Commands,
    Logs,
    Git,
    Domains,
    Daemons,
    Firewall,
    Jobs,
    SshKeys,
}

impl Section {
    /// Resolve a tab to a section. Out-of-range tabs fall back to tab 1.
    pub fn resolve(tab: u8, has_site: bool) -> Section {
        if has_site {
            match tab {
                2 => Section::Environment,
                3 => Section::Databases,
                4 => Section::Ssl,
                5 => Section::Workers,
                6 => Section::Commands,
                7 => Section::Logs,
                8 => Section::Git,
                9 => Section::Domains,
                _ => Section::Deployments,
            }
        } else {
            match tab {
                3 => Section::Databases,
                6 => Section::Daemons,
                7 => Section::Firewall,
                8 => Section::Jobs,
                9 => Section::SshKeys,
                _ => Section::ServerInfo,
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::ServerInfo => "Server",
            Section::Deployments => "Deploys",
            Section::Environment => "Env",
            Section::Databases => "Databases",
            Section::Ssl => "SSL",
            Section::Workers => "Workers",
            Section::Commands => "Commands",
            Section::Logs => "Logs",
            Section::Git => "Git",
            Section::Domains => "Domains",
            Section::Daemons => "Daemons",
            Section::Firewall => "Firewall",
            Section::Jobs => "Jobs",
            Section::SshKeys => "SSH Keys",
        }
    }

    /// Build a fresh panel for this section. Site-scoped sections need a
    /// site and return `None` without one.
    pub fn build(self, scope: &Scope) -> Option<Box<dyn Panel>> {
        let server_id = scope.server.id;
        let panel: Box<dyn Panel> = match self {
            Section::ServerInfo => Box::new(ServerInfoPanel::new(scope.server.clone())),
            Section::Databases => Box::new(DatabasesPanel::new(server_id)),
            Section::Daemons => Box::new(DaemonsPanel::new(server_id)),
            Section::Firewall => Box::new(FirewallPanel::new(server_id)),
            Section::Jobs => Box::new(JobsPanel::new(server_id)),
            Section::SshKeys => Box::new(SshKeysPanel::new(server_id, scope.ssh_user)),
            site_scoped => {
                let site = scope.site?;
                match site_scoped {
                    Section::Deployments => Box::new(DeploymentsPanel::new(server_id, site.id, site.name.clone())),
                    Section::Environment => Box::new(TextDocumentPanel::new(EditTarget::Environment {
                        server_id,
                        site_id: site.id,
                    })),
                    Section::Ssl => Box::new(CertificatesPanel::new(server_id, site.id)),
                    Section::Workers => Box::new(WorkersPanel::new(server_id, site.id)),
                    Section::Commands => Box::new(CommandsPanel::new(server_id, site.id)),
                    Section::Logs => Box::new(LogsPanel::new(server_id, site.id)),
                    Section::Git => Box::new(GitPanel::new(site.clone())),
                    _ => Box::new(DomainsPanel::new(site)),
                }
            }
        };
        Some(panel)
    }
}

/// The selection a section is built against.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub server: &'a Server,
    pub site: Option<&'a Site>,
    /// SSH account used when installing keys on this server.
    pub ssh_user: &'a str,
}

fn build_sub_view(view: SubView, scope: &Scope) -> Option<Box<dyn Panel>> {
    let server_id = scope.server.id;
    let panel: Box<dyn Panel> = match view {
        SubView::DatabaseUsers => Box::new(DatabaseUsersPanel::new(server_id)),
        SubView::DeployScript => Box::new(TextDocumentPanel::new(EditTarget::DeployScript {
            server_id,
            site_id: scope.site?.id,
        })),
        SubView::DeploymentOutput { deployment_id } => Box::new(OutputPanel::new(OutputSource::Deployment {
            server_id,
            site_id: scope.site?.id,
            deployment_id,
        })),
        SubView::CommandDetail { command_id } => Box::new(OutputPanel::new(OutputSource::Command {
            server_id,
            site_id: scope.site?.id,
            command_id,
        })),
    };
    Some(panel)
}

/// Owns the active tab, its panel, and an optional drill-down sub-view.
/// Panels are rebuilt on every activation; nothing is cached across tabs.
pub struct Multiplexer {
    active_tab: u8,
    section: Option<Section>,
    panel: Option<Box<dyn Panel>>,
    sub_view: Option<(SubView, Box<dyn Panel>)>,
}

impl Default for Multiplexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Multiplexer {
    pub fn new() -> Self {
        Self {
            active_tab: DEFAULT_TAB,
            section: None,
            panel: None,
            sub_view: None,
        }
    }

    pub fn active_tab(&self) -> u8 {
        self.active_tab
    }

    pub fn section(&self) -> Option<Section> {
        self.section
    }

    pub fn sub_view(&self) -> Option<SubView> {
        self.sub_view.as_ref().map(|(view, _)| *view)
    }

    pub fn is_active(&self) -> bool {
        self.panel.is_some()
    }

    /// Select `tab` and (re)build its panel. Returns the panel's load.
    pub fn switch_tab(&mut self, tab: u8, scope: &Scope) -> Option<ApiCall> {
        if (1..=TAB_COUNT).contains(&tab) {
            self.active_tab = tab;
        }
        self.activate(scope)
    }

    /// Rebuild the current tab's panel against `scope`, dropping any
    /// sub-view.
    pub fn activate(&mut self, scope: &Scope) -> Option<ApiCall> {
        self.sub_view = None;
        let section = Section::resolve(self.active_tab, scope.site.is_some());
        self.section = Some(section);
        self.panel = section.build(scope);
        tracing::debug!("Section {:?} active (tab {})", section, self.active_tab);
        self.panel.as_mut().and_then(|p| p.load())
    }

    /// Back to the default tab with nothing built.
    pub fn reset(&mut self) {
        self.active_tab = DEFAULT_TAB;
        self.clear();
    }

    /// Drop the panel but remember the tab.
    pub fn clear(&mut self) {
        self.section = None;
        self.panel = None;
        self.sub_view = None;
    }

    pub fn open_sub_view(&mut self, view: SubView, scope: &Scope) -> Option<ApiCall> {
        let mut panel = build_sub_view(view, scope)?;
        let load = panel.load();
        self.sub_view = Some((view, panel));
        load
    }

    /// Returns whether there was a sub-view to close.
    pub fn close_sub_view(&mut self) -> bool {
        self.sub_view.take().is_some()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        if let Some((_, panel)) = self.sub_view.as_mut() {
            return panel.handle_key(key);
        }
        match self.panel.as_mut() {
            Some(panel) => panel.handle_key(key),
            None => PanelEvent::Ignored,
        }
    }

    /// Offer a result to the sub-view and the section panel. Panels check
    /// the scope tag themselves, so stale results fall through.
    pub fn apply(&mut self, loaded: &Loaded) -> bool {
        let mut consumed = false;
        if let Some((_, panel)) = self.sub_view.as_mut() {
            consumed |= panel.apply(loaded);
        }
        if let Some(panel) = self.panel.as_mut() {
            consumed |= panel.apply(loaded);
        }
        consumed
    }

    /// Reload whatever is on screen.
    pub fn reload(&mut self) -> Option<ApiCall> {
        if let Some((_, panel)) = self.sub_view.as_mut() {
            return panel.load();
        }
        self.panel.as_mut().and_then(|p| p.load())
    }

    pub fn stop_loading(&mut self) {
        if let Some((_, panel)) = self.sub_view.as_mut() {
            panel.stop_loading();
        }
        if let Some(panel) = self.panel.as_mut() {
            panel.stop_loading();
        }
    }

    pub fn help_bindings(&self) -> Vec<HelpBinding> {
        if let Some((_, panel)) = self.sub_view.as_ref() {
            return panel.help_bindings();
        }
        self.panel.as_ref().map(|p| p.help_bindings()).unwrap_or_default()
    }

    pub fn title(&self) -> Option<String> {
        if let Some((_, panel)) = self.sub_view.as_ref() {
            return Some(panel.title());
        }
        self.panel.as_ref().map(|p| p.title())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme, has_site: bool) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);

        let titles: Vec<Line> = (1..=TAB_COUNT)
            .map(|tab| Line::from(format!("{} {}", tab, Section::resolve(tab, has_site).label())))
            .collect();
        let tabs = Tabs::new(titles)
            .select(usize::from(self.active_tab - 1))
            .style(theme.muted())
            .highlight_style(
                Style::default()
                    .fg(theme.colors.primary.to_color())
                    .add_modifier(Modifier::BOLD),
            )
            .divider("│");
        frame.render_widget(tabs, chunks[0]);

        if let Some((_, panel)) = self.sub_view.as_ref() {
            panel.render(frame, chunks[1], focused, theme);
        } else if let Some(panel) = self.panel.as_ref() {
            panel.render(frame, chunks[1], focused, theme);
        } else {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(focused));
            let hint = Paragraph::new(Span::styled("Select a server, then press enter", theme.muted())).block(block);
            frame.render_widget(hint, chunks[1]);
        }
    }
}
