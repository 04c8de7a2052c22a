use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{centered, ModalOutcome};
use crate::config::Theme;
use crate::panels::HelpBinding;

/// Keybinding reference, grouped by where the keys apply.
#[derive(Debug, Clone)]
pub struct HelpModal {
    groups: Vec<(String, Vec<HelpBinding>)>,
    scroll: u16,
}

impl HelpModal {
    pub fn new(groups: Vec<(String, Vec<HelpBinding>)>) -> Self {
        Self { groups, scroll: 0 }
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    fn line_count(&self) -> u16 {
        let lines: usize = self.groups.iter().map(|(_, b)| b.len() + 2).sum();
        u16::try_from(lines).unwrap_or(u16::MAX)
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> ModalOutcome {
        let max = self.line_count().saturating_sub(1);
        match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc => return ModalOutcome::Dismiss,
            KeyCode::Char('j') | KeyCode::Down => self.scroll = (self.scroll + 1).min(max),
            KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Char('g') | KeyCode::Home => self.scroll = 0,
            KeyCode::Char('G') | KeyCode::End => self.scroll = max,
            _ => {}
        }
        ModalOutcome::Open
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let width = (area.width * 60 / 100).clamp(40, 72);
        let height = (area.height * 80 / 100).max(10);
        let modal_area = centered(area, width, height);

        frame.render_widget(Clear, modal_area);

        let key_style = Style::default()
            .fg(theme.colors.accent.to_color())
            .add_modifier(Modifier::BOLD);
        let header_style = Style::default()
            .fg(theme.colors.primary.to_color())
            .add_modifier(Modifier::BOLD);

        let mut lines = Vec::new();
        for (heading, bindings) in &self.groups {
            lines.push(Line::from(Span::styled(heading.clone(), header_style)));
            for b in bindings {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<12}", b.key), key_style),
                    Span::raw(b.desc),
                ]));
            }
            lines.push(Line::default());
        }

        let block = Block::default()
            .title(" Help ")
            .title_bottom(Line::from(Span::styled(" j/k scroll · ? close ", theme.muted())))
            .borders(Borders::ALL)
            .border_style(theme.border_style(true));

        frame.render_widget(Paragraph::new(lines).block(block).scroll((self.scroll, 0)), modal_area);
    }
}
