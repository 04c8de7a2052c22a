use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::config::Theme;
use crate::input::focus::FocusArea;
use crate::panels::HelpBinding;

const MAX_HINTS: usize = 6;
const HELP_HINT: HelpBinding = HelpBinding::new("?", "help");

/// Bottom bar: where the user is on the left, the most useful keys for
/// the focused area on the right.
pub struct StatusBar<'a> {
    pub focus: FocusArea,
    pub server: Option<&'a str>,
    pub site: Option<&'a str>,
    pub hints: &'a [HelpBinding],
}

impl StatusBar<'_> {
    pub fn breadcrumb(&self) -> String {
        let mut parts = Vec::new();
        if let Some(server) = self.server {
            parts.push(server);
        }
        if let Some(site) = self.site {
            parts.push(site);
        }
        if parts.is_empty() {
            format!("phorge [{}]", self.focus.label())
        } else {
            format!("{} [{}]", parts.join(" › "), self.focus.label())
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        let crumb = Paragraph::new(Span::styled(
            format!(" {}", self.breadcrumb()),
            Style::default()
                .fg(theme.colors.primary.to_color())
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(crumb, chunks[0]);

        let key_style = Style::default().fg(theme.colors.accent.to_color());
        let mut spans = Vec::new();
        for hint in self
            .hints
            .iter()
            .take(MAX_HINTS)
            .chain(std::iter::once(&HELP_HINT))
        {
            spans.push(Span::styled(hint.key, key_style));
            spans.push(Span::styled(format!(" {}  ", hint.desc), theme.muted()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Right), chunks[1]);
    }
}
