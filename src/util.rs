//! Text helpers shared by panels and the external process launcher

use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;

/// Matches CSI sequences (ESC[...m), OSC sequences (ESC]...BEL), and other control codes
static ANSI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\x1b\[[0-9;?]*[A-Za-z]",
        r"|\x1b\][^\x07]*\x07",
        r"|\x1b\][^\x1b]*\x1b\\",
        r"|\x1b[PX^_][^\x1b]*\x1b\\",
        r"|\x1b.",
        r"|[\x00-\x08\x0b\x0c\x0e-\x1f]"
    ))
    .unwrap()
});

/// Strip ANSI escape sequences and control characters from text.
///
/// Deployment output and site logs come straight from remote shells and
/// routinely carry color codes that would corrupt the ratatui buffer.
pub fn strip_ansi(text: &str) -> String {
    ANSI_REGEX.replace_all(text, "").replace('\r', "")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Render a Forge timestamp as `YYYY-MM-DD HH:MM`.
///
/// Forge returns either RFC 3339 or `YYYY-MM-DD HH:MM:SS`; anything else is
/// passed through untouched.
pub fn short_timestamp(raw: &str) -> String {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return ts.format("%Y-%m-%d %H:%M").to_string();
    }
    raw.to_string()
}

/// Truncate to `max` characters, appending an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_basic_colors() {
        assert_eq!(strip_ansi("\x1b[31mFAILED\x1b[0m"), "FAILED");
    }

    #[test]
    fn test_strip_true_color_and_carriage_returns() {
        let input = "\x1b[38;2;255;0;0mcomposer install\x1b[0m\r\ndone";
        assert_eq!(strip_ansi(input), "composer install\ndone");
    }

    #[test]
    fn test_preserves_newlines_and_tabs() {
        assert_eq!(strip_ansi("Line1\nLine2\tTabbed"), "Line1\nLine2\tTabbed");
    }

    #[test]
    fn test_expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/etc/hosts"), PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn test_expand_home_prefix() {
        let Some(home) = dirs::home_dir() else { return };
        assert_eq!(expand_home("~/.ssh/id_ed25519.pub"), home.join(".ssh/id_ed25519.pub"));
        assert_eq!(expand_home("~"), home);
    }

    #[test]
    fn test_short_timestamp_formats() {
        assert_eq!(short_timestamp("2024-03-01T10:15:30+00:00"), "2024-03-01 10:15");
        assert_eq!(short_timestamp("2024-03-01 10:15:30"), "2024-03-01 10:15");
        assert_eq!(short_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long commit message", 6), "a lon…");
        assert_eq!(truncate("abc", 0), "");
    }
}
