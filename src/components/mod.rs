//! Overlays and chrome drawn around the panels.

pub mod confirm_dialog;
pub mod help_modal;
pub mod input_dialog;
pub mod setup_screen;
pub mod status_bar;
pub mod toast;

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::config::Theme;

pub use confirm_dialog::ConfirmDialog;
pub use help_modal::HelpModal;
pub use input_dialog::InputDialog;
pub use setup_screen::{SetupEvent, SetupScreen};
pub use status_bar::StatusBar;
pub use toast::{Toast, ToastLevel};

/// Result of feeding a key to an open modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalOutcome {
    /// Still open.
    Open,
    /// Confirmed or submitted.
    Accept,
    /// Rejected, cancelled or closed.
    Dismiss,
}

/// At most one overlay is open at a time, and while it is, it receives
/// every key.
#[derive(Debug, Clone)]
pub enum Modal {
    Confirm(ConfirmDialog),
    Input(InputDialog),
    Help(HelpModal),
}

impl Modal {
    pub fn id(&self) -> &'static str {
        match self {
            Modal::Confirm(d) => d.id(),
            Modal::Input(d) => d.id(),
            Modal::Help(_) => "help",
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> ModalOutcome {
        match self {
            Modal::Confirm(d) => d.handle_key(key),
            Modal::Input(d) => d.handle_key(key),
            Modal::Help(h) => h.handle_key(key),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        match self {
            Modal::Confirm(d) => d.render(frame, area, theme),
            Modal::Input(d) => d.render(frame, area, theme),
            Modal::Help(h) => h.render(frame, area, theme),
        }
    }
}

/// A `width` x `height` rect centered in `area`, clipped to it.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}
