//! Colors for the dashboard. Not read from the config file yet; the serde
//! derives keep the shape ready for that.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub colors: Palette,
    pub chrome: Chrome,
}

/// Semantic colors used for text and resource status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub foreground: HexColor,
    pub primary: HexColor,
    pub accent: HexColor,
    pub success: HexColor,
    pub warning: HexColor,
    pub error: HexColor,
    pub muted: HexColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            foreground: HexColor::new("#d4d7dd"),
            primary: HexColor::new("#19b69b"),
            accent: HexColor::new("#f9322c"),
            success: HexColor::new("#4ade80"),
            warning: HexColor::new("#fbbf24"),
            error: HexColor::new("#f87171"),
            muted: HexColor::new("#6b7280"),
        }
    }
}

/// Panel borders, titles and the table cursor, focused and not.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Chrome {
    pub border: HexColor,
    pub border_focused: HexColor,
    pub title: HexColor,
    pub title_focused: HexColor,
    pub header: HexColor,
    pub cursor_fg: HexColor,
    pub cursor_bg: HexColor,
    pub cursor_bg_unfocused: HexColor,
}

impl Default for Chrome {
    fn default() -> Self {
        Self {
            border: HexColor::new("#374151"),
            border_focused: HexColor::new("#19b69b"),
            title: HexColor::new("#6b7280"),
            title_focused: HexColor::new("#e5e7eb"),
            header: HexColor::new("#19b69b"),
            cursor_fg: HexColor::new("#f9fafb"),
            cursor_bg: HexColor::new("#115e52"),
            cursor_bg_unfocused: HexColor::new("#1f2937"),
        }
    }
}

/// A `#rrggbb` string. Anything else renders as the terminal default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexColor(String);

impl HexColor {
    pub fn new(hex: &str) -> Self {
        Self(hex.to_string())
    }

    pub fn to_color(&self) -> Color {
        let hex = self.0.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Color::Reset;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match (channel(0), channel(2), channel(4)) {
            (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
            _ => Color::Reset,
        }
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::new("#ffffff")
    }
}

impl Theme {
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .fg(self.chrome.border_focused.to_color())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.chrome.border.to_color())
        }
    }

    pub fn title_style(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .fg(self.chrome.title_focused.to_color())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.chrome.title.to_color())
        }
    }

    /// Highlight for the cursor row; dimmed when the owning panel lacks focus.
    pub fn selection_style(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .fg(self.chrome.cursor_fg.to_color())
                .bg(self.chrome.cursor_bg.to_color())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(self.chrome.cursor_bg_unfocused.to_color())
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.chrome.header.to_color())
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.colors.muted.to_color())
    }

    /// Color for a Forge status string (`installed`, `deploying`, `failed`...).
    pub fn status_color(&self, status: &str) -> Color {
        match status {
            "installed" | "finished" | "active" | "ready" | "enabled" => self.colors.success.to_color(),
            "deploying" | "installing" | "pending" | "running" | "creating" | "updating" => {
                self.colors.warning.to_color()
            }
            "failed" | "failed-install" | "removing" | "error" => self.colors.error.to_color(),
            _ => self.colors.foreground.to_color(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#ff0000", Color::Rgb(255, 0, 0))]
    #[case("00ff00", Color::Rgb(0, 255, 0))]
    #[case("#fff", Color::Reset)]
    #[case("#gggggg", Color::Reset)]
    #[case("#ffé000", Color::Reset)]
    fn test_hex_color(#[case] hex: &str, #[case] expected: Color) {
        assert_eq!(HexColor::new(hex).to_color(), expected);
    }

    #[rstest]
    #[case("finished", "success")]
    #[case("installed", "success")]
    #[case("deploying", "warning")]
    #[case("failed", "error")]
    #[case("whatever", "foreground")]
    fn test_status_colors(#[case] status: &str, #[case] slot: &str) {
        let theme = Theme::default();
        let expected = match slot {
            "success" => &theme.colors.success,
            "warning" => &theme.colors.warning,
            "error" => &theme.colors.error,
            _ => &theme.colors.foreground,
        };
        assert_eq!(theme.status_color(status), expected.to_color());
    }

    #[test]
    fn test_unfocused_cursor_is_dimmed() {
        let theme = Theme::default();
        let focused = theme.selection_style(true);
        let unfocused = theme.selection_style(false);
        assert!(focused.add_modifier.contains(Modifier::BOLD));
        assert_eq!(unfocused.bg, Some(theme.chrome.cursor_bg_unfocused.to_color()));
        assert_eq!(unfocused.fg, None);
    }
}
