use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Cell, Row},
    Frame,
};

use super::{HelpBinding, ListView, Panel, PanelEvent, FILTER_BINDINGS, LIST_BINDINGS};
use crate::action::Loaded;
use crate::command::ApiCall;
use crate::config::Theme;
use crate::forge::Server;
use crate::intent::Selection;

/// The resource list: every server on the account.
#[derive(Debug)]
pub struct ServersPanel {
    list: ListView<Server>,
    /// Name of this directory's default server, marked with a star.
    default_name: Option<String>,
}

fn server_name(server: &Server) -> &str {
    &server.name
}

impl ServersPanel {
    pub fn new() -> Self {
        Self {
            list: ListView::filterable(server_name),
            default_name: None,
        }
    }

    pub fn selected(&self) -> Option<&Server> {
        self.list.selected()
    }

    /// Move the cursor to the server called `name`, ignoring case.
    pub fn select_named(&mut self, name: &str) -> bool {
        self.list.select_where(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn find_named(&self, name: &str) -> Option<&Server> {
        self.list.items().iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn set_default(&mut self, name: Option<String>) {
        self.default_name = name;
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl Panel for ServersPanel {
    fn title(&self) -> String {
        "Servers".to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        let before = self.list.selected().map(|s| s.id);
        if !self.list.handle_filter_key(&key) && !self.list.handle_nav(&key) {
            return PanelEvent::Ignored;
        }
        match self.list.selected() {
            Some(server) if Some(server.id) != before => PanelEvent::Selected(Selection::Server(server.clone())),
            _ => PanelEvent::Handled,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let rows: Vec<Row> = self
            .list
            .visible()
            .map(|server| {
                let marker = if server.is_ready { "●" } else { "○" };
                let color = if server.is_ready {
                    theme.colors.success.to_color()
                } else {
                    theme.colors.warning.to_color()
                };
                let is_default = self
                    .default_name
                    .as_deref()
                    .is_some_and(|d| d.eq_ignore_ascii_case(&server.name));
                let name = if is_default {
                    format!("{} ★", server.name)
                } else {
                    server.name.clone()
                };
                Row::new(vec![
                    Cell::from(Span::styled(marker, Style::default().fg(color))),
                    Cell::from(name),
                    Cell::from(Span::styled(server.ip().to_string(), theme.muted())),
                ])
            })
            .collect();

        self.list.render(
            frame,
            area,
            focused,
            theme,
            "Servers",
            Row::new(vec!["", "Name", "IP"]),
            rows,
            &[Constraint::Length(1), Constraint::Fill(1), Constraint::Length(15)],
            "No servers",
        );
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        let mut bindings = LIST_BINDINGS.to_vec();
        bindings.extend(FILTER_BINDINGS);
        bindings.push(HelpBinding::new("enter", "open sites"));
        bindings
    }

    fn load(&mut self) -> Option<ApiCall> {
        self.list.set_loading(true);
        Some(ApiCall::ListServers)
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        match loaded {
            Loaded::Servers(servers) => {
                self.list.set_items(servers.clone());
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
