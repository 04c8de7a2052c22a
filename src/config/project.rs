//! Per-directory defaults: the server (and optionally site) to open when
//! phorge starts in a given project directory.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PhorgeError, Result};

pub const PROJECT_FILE: &str = ".phorge";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
}

impl ProjectDefaults {
    pub fn server(name: &str) -> Self {
        Self {
            server: Some(name.to_string()),
            site: None,
        }
    }

    pub fn site(server: &str, site: &str) -> Self {
        Self {
            server: Some(server.to_string()),
            site: Some(site.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.server.is_none() && self.site.is_none()
    }

    /// Whether `name` is the default server. Names compare case-insensitively.
    pub fn is_server(&self, name: &str) -> bool {
        self.server.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(name))
    }

    pub fn is_site(&self, server: &str, site: &str) -> bool {
        self.is_server(server) && self.site.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(site))
    }

    /// Defaults after pressing the toggle on `server`, or on `site` of it.
    /// Toggling the current default clears it; a server toggle drops any
    /// site default.
    pub fn toggled(&self, server: &str, site: Option<&str>) -> Self {
        match site {
            Some(site) if self.is_site(server, site) => Self::default(),
            Some(site) => Self::site(server, site),
            None if self.is_server(server) && self.site.is_none() => Self::default(),
            None => Self::server(server),
        }
    }

    /// Read `.phorge` from `dir`. A missing file means no defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(PROJECT_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|e| PhorgeError::ConfigParse {
            path,
            message: e.to_string(),
        })
    }

    /// Write `.phorge` into `dir`, or remove it when there is nothing to keep.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(PROJECT_FILE);
        if self.is_empty() {
            if path.exists() {
                std::fs::remove_file(&path)?;
            }
            return Ok(());
        }
        let content = toml::to_string(self).map_err(|e| PhorgeError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        tracing::info!("Saved project defaults to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_missing_file_means_no_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ProjectDefaults::load(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = ProjectDefaults::site("web-1", "shop.test");
        defaults.save(dir.path()).unwrap();

        let written = std::fs::read_to_string(dir.path().join(PROJECT_FILE)).unwrap();
        assert!(written.contains("server = \"web-1\""), "{written}");
        assert_eq!(ProjectDefaults::load(dir.path()).unwrap(), defaults);

        ProjectDefaults::default().save(dir.path()).unwrap();
        assert!(!dir.path().join(PROJECT_FILE).exists());
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROJECT_FILE), "server = [").unwrap();
        let err = ProjectDefaults::load(dir.path()).unwrap_err();
        assert!(matches!(err, PhorgeError::ConfigParse { .. }));
    }

    #[rstest]
    #[case(ProjectDefaults::default(), None, ProjectDefaults::server("web-1"))]
    #[case(ProjectDefaults::server("WEB-1"), None, ProjectDefaults::default())]
    #[case(ProjectDefaults::site("web-1", "a.test"), None, ProjectDefaults::server("web-1"))]
    #[case(ProjectDefaults::server("web-1"), Some("a.test"), ProjectDefaults::site("web-1", "a.test"))]
    #[case(ProjectDefaults::site("web-1", "a.test"), Some("A.test"), ProjectDefaults::default())]
    #[case(ProjectDefaults::site("web-2", "a.test"), Some("a.test"), ProjectDefaults::site("web-1", "a.test"))]
    fn test_toggle(#[case] current: ProjectDefaults, #[case] site: Option<&str>, #[case] expected: ProjectDefaults) {
        assert_eq!(current.toggled("web-1", site), expected);
    }
}
