use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{HelpBinding, Panel, PanelEvent};
use crate::action::Loaded;
use crate::command::ApiCall;
use crate::config::Theme;
use crate::external::EditTarget;

/// A remote text file (environment or deploy script) shown read-only and
/// edited through the external editor.
pub struct TextDocumentPanel {
    target: EditTarget,
    content: Option<String>,
    scroll: u16,
    loading: bool,
}

impl TextDocumentPanel {
    pub fn new(target: EditTarget) -> Self {
        Self {
            target,
            content: None,
            scroll: 0,
            loading: false,
        }
    }

    fn ids(&self) -> (u64, u64) {
        match self.target {
            EditTarget::Environment { server_id, site_id } | EditTarget::DeployScript { server_id, site_id } => {
                (server_id, site_id)
            }
        }
    }

    fn line_count(&self) -> u16 {
        self.content
            .as_deref()
            .map(|c| c.lines().count())
            .unwrap_or(0)
            .min(u16::MAX as usize) as u16
    }
}

impl Panel for TextDocumentPanel {
    fn title(&self) -> String {
        self.target.label().to_string()
    }

    fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll = (self.scroll + 1).min(self.line_count().saturating_sub(1));
            }
            KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Char('g') | KeyCode::Home => self.scroll = 0,
            KeyCode::Char('G') | KeyCode::End => self.scroll = self.line_count().saturating_sub(1),
            KeyCode::Char('e') => {
                return match &self.content {
                    Some(content) => PanelEvent::Edit(self.target.clone(), content.clone()),
                    None => PanelEvent::Handled,
                };
            }
            _ => return PanelEvent::Ignored,
        }
        PanelEvent::Handled
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let title = if self.loading {
            format!(" {} (loading…) ", self.target.label())
        } else {
            format!(" {} ", self.target.label())
        };
        let block = Block::default()
            .title(Span::styled(title, theme.title_style(focused)))
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused));

        let paragraph = match &self.content {
            Some(content) if !content.is_empty() => Paragraph::new(content.as_str()).scroll((self.scroll, 0)),
            Some(_) => Paragraph::new("(empty)").style(theme.muted()),
            None => Paragraph::new("Loading…").style(theme.muted()),
        };
        frame.render_widget(paragraph.block(block), area);
    }

    fn help_bindings(&self) -> Vec<HelpBinding> {
        vec![
            HelpBinding::new("j/k", "scroll"),
            HelpBinding::new("e", "edit in $EDITOR"),
        ]
    }

    fn load(&mut self) -> Option<ApiCall> {
        let (server_id, site_id) = self.ids();
        self.loading = true;
        Some(match self.target {
            EditTarget::Environment { .. } => ApiCall::Environment { server_id, site_id },
            EditTarget::DeployScript { .. } => ApiCall::DeployScript { server_id, site_id },
        })
    }

    fn apply(&mut self, loaded: &Loaded) -> bool {
        let (_, own_site) = self.ids();
        let content = match (&self.target, loaded) {
            (EditTarget::Environment { .. }, Loaded::Environment { site_id, content })
            | (EditTarget::DeployScript { .. }, Loaded::DeployScript { site_id, content })
                if *site_id == own_site =>
            {
                content
            }
            _ => return false,
        };
        self.content = Some(content.clone());
        self.scroll = self.scroll.min(self.line_count().saturating_sub(1));
        self.loading = false;
        true
    }

    fn stop_loading(&mut self) {
        self.loading = false;
    }
}
