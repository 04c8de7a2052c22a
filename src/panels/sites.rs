use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Cell, Row},
    Frame,
};

use super::{status_cell, HelpBinding, ListView, Panel, PanelEvent, FILTER_BINDINGS, LIST_BINDINGS};
use crate::action::Loaded;
use crate::command::ApiCall;
use crate::config::Theme;
use crate::forge::Site;
use crate::intent::Selection;

/// The context list: sites of the selected server.
#[derive(Debug)]
pub struct SitesPanel {
    server_id: Option<u64>,
    list: ListView<Site>,
    /// Server id and site name of this directory's default site.
    default_site: Option<(u64, String)>,
}

fn site_name(site: &Site) -> &str {
    &site.name
}

impl SitesPanel {
    pub fn new() -> Self {
        Self {
            server_id: None,
            list: ListView::filterable(site_name),
            default_site: None,
        }
    }

    pub fn server_id(&self) -> Option<u64> {
        self.server_id
    }

    /// Point the list at another server, dropping the old rows.
    pub fn reset(&mut self, server_id: Option<u64>) {
        self.server_id = server_id;
        self.list.clear();
    }

    pub fn selected(&self) -> Option<&Site> {
        self.list.selected()
    }

    /// Move the cursor to the site called `name`, ignoring case.
    pub fn select_named(&mut self, name: &str) -> bool {
        self.list.select_where(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn set_default(&mut self, site: Option<(u64, String)>) {
        self.default_site = site;
    }

    fn is_default(&self, site: &Site) -> bool {
        self.default_site
            .as_ref()
            .is_some_and(|(server_id, name)| *server_id == site.server_id && name.eq_ignore_ascii_case(&site.name))
    }

    /// Move the cursor by `delta` rows and return the newly selected site,
    /// or `None` when already at that edge.
    pub fn step(&mut self, delta: isize) -> Option<Site> {
        let current = self.list.selected_index()?;
        let target = current.checked_add_signed(delta)?;
        if target >= self.list.visible_len() {
            return None;
        }
        self.list.select(target);
        self.list.selected().cloned()
    }
}

impl Panel for SitesPanel {
    fn title(&self) -> String {
        "Sites".to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        let before = self.list.selected().map(|s| s.id);
        if !self.list.handle_filter_key(&key) && !self.list.handle_nav(&key) {
            return PanelEvent::Ignored;
        }
        match self.list.selected() {
            Some(site) if Some(site.id) != before => PanelEvent::Selected(Selection::Site(site.clone())),
            _ => PanelEvent::Handled,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let rows: Vec<Row> = self
            .list
            .visible()
            .map(|site| {
                let lock = if site.is_secured { "🔒" } else { " " };
                let name = if self.is_default(site) {
                    format!("{} ★", site.name)
                } else {
                    site.name.clone()
                };
                Row::new(vec![
                    Cell::from(Span::styled(lock, Style::default())),
                    Cell::from(name),
                    status_cell(theme, site.repository_status.as_deref().or(site.status.as_deref())),
                ])
            })
            .collect();

        let empty = if self.server_id.is_some() {
            "No sites"
        } else {
            "Select a server"
        };
        self.list.render(
            frame,
            area,
            focused,
            theme,
            "Sites",
            Row::new(vec!["", "Domain", "Status"]),
            rows,
            &[Constraint::Length(2), Constraint::Fill(1), Constraint::Length(10)],
            empty,
        );
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        let mut bindings = LIST_BINDINGS.to_vec();
        bindings.extend(FILTER_BINDINGS);
        bindings.push(HelpBinding::new("enter", "open site"));
        bindings.push(HelpBinding::new("esc", "back to servers"));
        bindings
    }

    fn load(&mut self) -> Option<ApiCall> {
        let server_id = self.server_id?;
        self.list.set_loading(true);
        Some(ApiCall::ListSites { server_id })
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::Sites { server_id, sites } if Some(*server_id) == self.server_id => {
                self.list.set_items(sites.clone());
                true
            }
            _ => false,
        }
    }

    fn stop_loading(&mut self) {
        self.list.set_loading(false);
    }

    fn is_capturing_input(&self) -> bool {
        self.list.is_typing_filter()
    }
}
