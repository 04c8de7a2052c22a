use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{centered, ModalOutcome};
use crate::config::Theme;
use crate::intent::InputPurpose;

/// Single-line text prompt. Submitting an empty or whitespace-only value
/// counts as cancelling.
#[derive(Debug, Clone)]
pub struct InputDialog {
    purpose: InputPurpose,
    value: String,
    /// Cursor position in chars.
    cursor: usize,
}

impl InputDialog {
    pub fn new(purpose: InputPurpose) -> Self {
        Self {
            purpose,
            value: String::new(),
            cursor: 0,
        }
    }

    pub fn id(&self) -> &'static str {
        self.purpose.id()
    }

    pub fn purpose(&self) -> &InputPurpose {
        &self.purpose
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The trimmed value and the purpose it was entered for.
    pub fn into_submission(self) -> (InputPurpose, String) {
        let value = self.value.trim().to_string();
        (self.purpose, value)
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> ModalOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return ModalOutcome::Dismiss,
            KeyCode::Enter => {
                return if self.value.trim().is_empty() {
                    ModalOutcome::Dismiss
                } else {
                    ModalOutcome::Accept
                };
            }
            KeyCode::Char('u') if ctrl => {
                self.value.clear();
                self.cursor = 0;
            }
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.len(),
            KeyCode::Char(c) if !ctrl => self.insert_char(c),
            KeyCode::Backspace => self.delete_char_before(),
            KeyCode::Delete => self.delete_char_at(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            _ => {}
        }
        ModalOutcome::Open
    }

    /// Insert pasted text at the cursor. Newlines are dropped.
    pub fn paste(&mut self, text: &str) {
        for c in text.chars().filter(|c| *c != '\n' && *c != '\r') {
            self.insert_char(c);
        }
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_pos(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    fn delete_char_before(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = char_to_byte_pos(&self.value, self.cursor - 1);
        let end = char_to_byte_pos(&self.value, self.cursor);
        self.value.replace_range(start..end, "");
        self.cursor -= 1;
    }

    fn delete_char_at(&mut self) {
        if self.cursor >= self.len() {
            return;
        }
        let start = char_to_byte_pos(&self.value, self.cursor);
        let end = char_to_byte_pos(&self.value, self.cursor + 1);
        self.value.replace_range(start..end, "");
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let dialog_width = (area.width * 60 / 100).clamp(40, 80);
        let dialog_area = centered(area, dialog_width, 7);

        frame.render_widget(Clear, dialog_area);

        let primary = theme.colors.primary.to_color();
        let block = Block::default()
            .title(format!(" {} ", self.purpose.title()))
            .title_style(Style::default().fg(primary).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(primary));

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(inner);

        // Keep the cursor on screen for values wider than the box.
        let width = usize::from(chunks[1].width.max(1));
        let offset = (self.cursor + 1).saturating_sub(width);
        let line = if self.value.is_empty() {
            Line::from(Span::styled(self.purpose.placeholder(), theme.muted()))
        } else {
            let visible: String = self.value.chars().skip(offset).take(width).collect();
            Line::from(Span::styled(
                visible,
                Style::default().fg(theme.colors.foreground.to_color()),
            ))
        };
        frame.render_widget(Paragraph::new(line), chunks[1]);

        let cursor_x = chunks[1].x + (self.cursor - offset) as u16;
        frame.set_cursor_position((cursor_x, chunks[1].y));

        let hint = Paragraph::new(Span::styled("enter submit · esc cancel", theme.muted())).alignment(Alignment::Center);
        frame.render_widget(hint, chunks[3]);
    }
}

/// Convert a character index to a byte index in a string
fn char_to_byte_pos(s: &str, char_pos: usize) -> usize {
    s.char_indices().nth(char_pos).map(|(i, _)| i).unwrap_or(s.len())
}
