use std::time::Duration;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::config::Theme;
use crate::util::truncate;

const INFO_DURATION: Duration = Duration::from_secs(3);
const ERROR_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

impl ToastLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastLevel::Info => "●",
            ToastLevel::Error => "✗",
        }
    }

    /// How long a toast of this level stays up.
    pub fn duration(&self) -> Duration {
        match self {
            ToastLevel::Info => INFO_DURATION,
            ToastLevel::Error => ERROR_DURATION,
        }
    }
}

/// One transient message on the bottom line. A newer toast replaces the
/// current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == ToastLevel::Error
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        frame.render_widget(Clear, area);

        let fg = match self.level {
            ToastLevel::Info => theme.colors.success.to_color(),
            ToastLevel::Error => theme.colors.error.to_color(),
        };
        let text = format!(" {} {}", self.level.icon(), self.message);
        let line = Line::from(Span::styled(
            truncate(&text, usize::from(area.width)),
            Style::default().fg(fg).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line), area);
    }
}
