use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::{centered, ModalOutcome};
use crate::config::Theme;
use crate::intent::PendingAction;

/// Yes/no gate in front of a destructive or billable operation.
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pending: PendingAction,
}

impl ConfirmDialog {
    pub fn new(pending: PendingAction) -> Self {
        Self { pending }
    }

    pub fn id(&self) -> &'static str {
        self.pending.id()
    }

    pub fn pending(&self) -> &PendingAction {
        &self.pending
    }

    pub fn into_pending(self) -> PendingAction {
        self.pending
    }

    /// Keys other than the accept and reject sets are swallowed so nothing
    /// reaches the panels underneath.
    pub fn handle_key(&mut self, key: &KeyEvent) -> ModalOutcome {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => ModalOutcome::Accept,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => ModalOutcome::Dismiss,
            _ => ModalOutcome::Open,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let dialog_width = (area.width * 60 / 100).clamp(40, 70);
        let dialog_area = centered(area, dialog_width, 8);

        frame.render_widget(Clear, dialog_area);

        let warning = theme.colors.warning.to_color();
        let block = Block::default()
            .title(format!(" {} ", self.pending.title()))
            .title_style(Style::default().fg(warning).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(warning));

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(2), Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let prompt = Paragraph::new(self.pending.prompt())
            .style(Style::default().fg(theme.colors.foreground.to_color()))
            .wrap(Wrap { trim: true });
        frame.render_widget(prompt, chunks[0]);

        let instructions = Line::from(vec![
            Span::styled(
                "[Y]",
                Style::default()
                    .fg(theme.colors.success.to_color())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Confirm   "),
            Span::styled(
                "[N/Esc]",
                Style::default()
                    .fg(theme.colors.error.to_color())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Cancel"),
        ]);
        frame.render_widget(Paragraph::new(instructions).alignment(Alignment::Center), chunks[2]);
    }
}
