// Rendering - draw() method and layout

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use super::App;
use crate::components::StatusBar;
use crate::config::Theme;
use crate::error::{PhorgeError, Result};
use crate::input::focus::FocusArea;
use crate::panels::Panel;
use crate::session::Session;

const LIST_COLUMN_PERCENT: u16 = 30;

impl App {
    /// Main drawing method - renders the entire UI from session state
    pub(super) fn draw(&mut self) -> Result<()> {
        let session = &self.session;
        let theme = &self.theme;
        self.terminal
            .draw(|frame| draw_session(frame, session, theme))
            .map_err(|e| PhorgeError::Terminal(e.to_string()))?;
        Ok(())
    }
}

struct Regions {
    servers: Rect,
    sites: Rect,
    detail: Rect,
    status: Rect,
}

fn split(area: Rect) -> Regions {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(LIST_COLUMN_PERCENT),
            Constraint::Percentage(100 - LIST_COLUMN_PERCENT),
        ])
        .split(rows[0]);

    let lists = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(columns[0]);

    Regions {
        servers: lists[0],
        sites: lists[1],
        detail: columns[1],
        status: rows[1],
    }
}

fn draw_session(frame: &mut Frame, session: &Session, theme: &Theme) {
    let area = frame.area();
    let regions = split(area);
    let focus = session.focus();

    session
        .servers()
        .render(frame, regions.servers, focus == FocusArea::ResourceList, theme);
    session
        .sites()
        .render(frame, regions.sites, focus == FocusArea::ContextList, theme);
    session.sections().render(
        frame,
        regions.detail,
        focus == FocusArea::DetailPanel,
        theme,
        session.selected_site().is_some(),
    );

    // A toast takes over the status line until it expires.
    if let Some(toast) = session.toast() {
        toast.render(frame, regions.status, theme);
    } else {
        let hints = session.status_hints();
        StatusBar {
            focus,
            server: session.selected_server().map(|s| s.name.as_str()),
            site: session.selected_site().map(|s| s.name.as_str()),
            hints: &hints,
        }
        .render(frame, regions.status, theme);
    }

    if let Some(modal) = session.modal() {
        modal.render(frame, area, theme);
    }
}
