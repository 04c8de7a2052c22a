use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{layout::Rect, Frame};

use super::{HelpBinding, OutputPanel, OutputSource, Panel, PanelEvent};
use crate::action::Loaded;
use crate::command::ApiCall;
use crate::config::Theme;

/// The site's application log, reloaded on demand.
pub struct LogsPanel {
    output: OutputPanel,
}

impl LogsPanel {
    pub fn new(server_id: u64, site_id: u64) -> Self {
        Self {
            output: OutputPanel::new(OutputSource::SiteLog { server_id, site_id }),
        }
    }
}

impl Panel for LogsPanel {
    fn title(&self) -> String {
        "Logs".to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        match key.code {
            KeyCode::Char('r') => self.load().map(PanelEvent::Call).unwrap_or(PanelEvent::Handled),
            _ => self.output.handle_key(key),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        self.output.render(frame, area, focused, theme);
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        vec![
            HelpBinding::new("j/k", "scroll"),
            HelpBinding::new("g/G", "top/bottom"),
            HelpBinding::new("r", "reload"),
        ]
    }

    fn load(&mut self) -> Option<ApiCall> {
        self.output.load()
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        self.output.apply(loaded)
    }

    fn stop_loading(&mut self) {
        self.output.stop_loading();
    }
}
