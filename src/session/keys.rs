use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{calls, scope, Session};
use crate::command::Command;
use crate::components::{HelpModal, Modal};
use crate::input::focus::FocusArea;
use crate::panels::{HelpBinding, Panel};

const GLOBAL_BINDINGS: [HelpBinding; 7] = [
    HelpBinding::new("q / ctrl+c", "quit"),
    HelpBinding::new("ctrl+r", "refresh everything"),
    HelpBinding::new("?", "toggle help"),
    HelpBinding::new("ctrl+s", "ssh to server (site dir)"),
    HelpBinding::new("ctrl+f", "browse files (termscp)"),
    HelpBinding::new("ctrl+d", "database client (lazysql)"),
    HelpBinding::new("1-9", "switch section tab"),
];

const FOCUS_BINDINGS: [HelpBinding; 4] = [
    HelpBinding::new("tab / S-tab", "cycle focus"),
    HelpBinding::new("enter", "drill in"),
    HelpBinding::new("esc", "back out"),
    HelpBinding::new("[ / ]", "previous / next site"),
];

fn tab_number(key: &KeyEvent) -> Option<u8> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    match key.code {
        KeyCode::Char(c @ '1'..='9') => c.to_digit(10).and_then(|d| u8::try_from(d).ok()),
        _ => None,
    }
}

impl Session {
    /// Modal first, then global keys, then tabs and focus moves, then the
    /// focused panel.
    pub(super) fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if key.kind == KeyEventKind::Release {
            return Vec::new();
        }
        if self.modal.is_some() {
            return self.handle_modal_key(key);
        }
        let ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
        if self.focused_is_capturing_input() && !ctrl_c {
            return self.route_to_focused(key);
        }
        if let Some(commands) = self.handle_global_key(&key) {
            return commands;
        }
        if let Some(tab) = tab_number(&key) {
            if self.selected_server.is_some() {
                return self.switch_tab(tab);
            }
        }

        let in_detail = self.focus == FocusArea::DetailPanel;
        match key.code {
            KeyCode::Tab => return self.cycle_focus(true),
            KeyCode::BackTab => return self.cycle_focus(false),
            KeyCode::Esc => return self.back(),
            KeyCode::Enter if !in_detail => return self.enter(),
            KeyCode::Char('[') if in_detail => return self.step_site(-1),
            KeyCode::Char(']') if in_detail => return self.step_site(1),
            KeyCode::Char('D') if !in_detail => return self.toggle_default(),
            _ => {}
        }
        self.route_to_focused(key)
    }

    fn focused_is_capturing_input(&self) -> bool {
        match self.focus {
            FocusArea::ResourceList => self.servers.is_capturing_input(),
            FocusArea::ContextList => self.sites.is_capturing_input(),
            FocusArea::DetailPanel => false,
        }
    }

    fn route_to_focused(&mut self, key: KeyEvent) -> Vec<Command> {
        let event = match self.focus {
            FocusArea::ResourceList => self.servers.handle_key(key),
            FocusArea::ContextList => self.sites.handle_key(key),
            FocusArea::DetailPanel => self.sections.handle_key(key),
        };
        self.on_panel_event(event)
    }

    fn handle_global_key(&mut self, key: &KeyEvent) -> Option<Vec<Command>> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let commands = match key.code {
            KeyCode::Char('q') if !ctrl => self.quit(),
            KeyCode::Char('c') if ctrl => self.quit(),
            KeyCode::Char('r') if ctrl => self.refresh_all(),
            KeyCode::Char('s') if ctrl => self.launch_shell(),
            KeyCode::Char('f') if ctrl => self.launch_file_browser(),
            KeyCode::Char('d') if ctrl => self.request_database_client(),
            KeyCode::Char('?') => {
                self.modal = Some(Modal::Help(HelpModal::new(self.help_groups())));
                Vec::new()
            }
            _ => return None,
        };
        Some(commands)
    }

    fn quit(&mut self) -> Vec<Command> {
        tracing::info!("Quit requested");
        self.should_quit = true;
        Vec::new()
    }

    /// Reload servers, the current server's sites and whatever the detail
    /// region shows.
    fn refresh_all(&mut self) -> Vec<Command> {
        let mut commands = calls(self.servers.load());
        if self.selected_server.is_some() && self.sites.server_id().is_some() {
            commands.extend(calls(self.sites.load()));
        }
        commands.extend(calls(self.sections.reload()));
        commands
    }

    fn switch_tab(&mut self, tab: u8) -> Vec<Command> {
        match scope(&self.config, &self.selected_server, &self.selected_site) {
            Some(scope) => calls(self.sections.switch_tab(tab, &scope)),
            None => Vec::new(),
        }
    }

    fn cycle_focus(&mut self, forward: bool) -> Vec<Command> {
        let next = if forward { self.focus.next() } else { self.focus.prev() };
        self.set_focus(next);
        if next == FocusArea::DetailPanel && !self.sections.is_active() {
            return self.activate_section();
        }
        Vec::new()
    }

    fn enter(&mut self) -> Vec<Command> {
        match self.focus {
            FocusArea::ResourceList => {
                let Some(server_id) = self.selected_server.as_ref().map(|s| s.id) else {
                    return Vec::new();
                };
                self.set_focus(FocusArea::ContextList);
                if self.sites.server_id() != Some(server_id) {
                    self.sites.reset(Some(server_id));
                }
                calls(self.sites.load())
            }
            FocusArea::ContextList => {
                if self.selected_server.is_none() {
                    return Vec::new();
                }
                self.set_focus(FocusArea::DetailPanel);
                self.activate_section()
            }
            FocusArea::DetailPanel => Vec::new(),
        }
    }

    /// Esc. In the detail region a sub-view closes before focus moves.
    /// Leaving the context list drops the site selection.
    fn back(&mut self) -> Vec<Command> {
        match self.focus {
            FocusArea::DetailPanel => {
                if !self.sections.close_sub_view() {
                    self.set_focus(FocusArea::ContextList);
                }
            }
            FocusArea::ContextList => {
                self.set_focus(FocusArea::ResourceList);
                if self.selected_site.take().is_some() {
                    self.sections.reset();
                }
            }
            FocusArea::ResourceList => {}
        }
        Vec::new()
    }

    /// Move to the neighbouring site while keeping the current tab.
    fn step_site(&mut self, delta: isize) -> Vec<Command> {
        match self.sites.step(delta) {
            Some(site) => {
                tracing::debug!("Stepped to site {}", site.name);
                self.selected_site = Some(site);
                self.activate_section()
            }
            None => Vec::new(),
        }
    }

    fn help_groups(&self) -> Vec<(String, Vec<HelpBinding>)> {
        let focused = match self.focus {
            FocusArea::ResourceList => self.servers.help_bindings(),
            FocusArea::ContextList => self.sites.help_bindings(),
            FocusArea::DetailPanel => self.sections.help_bindings(),
        };
        let mut groups = vec![
            ("Global".to_string(), GLOBAL_BINDINGS.to_vec()),
            ("Navigation".to_string(), FOCUS_BINDINGS.to_vec()),
        ];
        if !focused.is_empty() {
            let title = match (self.focus, self.sections.title()) {
                (FocusArea::DetailPanel, Some(title)) => title,
                _ => self.focus.label().to_string(),
            };
            groups.push((title, focused));
        }
        groups
    }

    /// Key hints for the status bar.
    pub fn status_hints(&self) -> Vec<HelpBinding> {
        match self.focus {
            FocusArea::ResourceList => self.servers.help_bindings(),
            FocusArea::ContextList => self.sites.help_bindings(),
            FocusArea::DetailPanel => self.sections.help_bindings(),
        }
        .into_iter()
        .filter(|b| !matches!(b.key, "j/k" | "g/G"))
        .collect()
    }
}
