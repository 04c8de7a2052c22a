mod project;
mod theme;

pub use project::{ProjectDefaults, PROJECT_FILE};
pub use theme::Theme;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::{PhorgeError, Result};

const CONFIG_DIR: &str = "phorge";
const MAIN_CONFIG_FILE: &str = "config.toml";
const API_KEY_ENV_VARS: &[&str] = &["PHORGE_API_KEY", "FORGE_API_KEY"];

pub const DEFAULT_BASE_URL: &str = "https://forge.laravel.com/api/v1";
pub const DEFAULT_SSH_USER: &str = "forge";
pub const DEFAULT_EDITOR: &str = "vim";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub forge: ForgeConfig,
    pub editor: EditorConfig,
    /// Per-server SSH user overrides, keyed by server name.
    pub server_users: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    pub api_key: String,
    pub ssh_user: String,
    pub base_url: String,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            ssh_user: DEFAULT_SSH_USER.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub command: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let command = std::env::var("EDITOR")
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
        Self { command }
    }
}

impl Config {
    /// Load the configuration once at startup.
    ///
    /// A missing file yields defaults; a malformed file or a missing API key
    /// is a startup error.
    pub fn load(path_override: Option<&Path>) -> Result<Self> {
        let path = match path_override {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides();

        if config.forge.api_key.trim().is_empty() {
            return Err(PhorgeError::MissingApiKey { path });
        }
        Ok(config)
    }

    pub fn default_path() -> Result<PathBuf> {
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join(CONFIG_DIR).join(MAIN_CONFIG_FILE))
            .ok_or_else(|| PhorgeError::Config("Could not determine config directory".to_string()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content).map_err(|e| PhorgeError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if config.forge.ssh_user.trim().is_empty() {
            config.forge.ssh_user = DEFAULT_SSH_USER.to_string();
        }
        if config.forge.base_url.trim().is_empty() {
            config.forge.base_url = DEFAULT_BASE_URL.to_string();
        }
        if config.editor.command.trim().is_empty() {
            config.editor = EditorConfig::default();
        }
        Ok(config)
    }

    /// Write the config back, creating its directory. The file holds the
    /// API key, so on Unix it is readable by the owner only.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| PhorgeError::Config(e.to_string()))?;
        write_private(path, &content)?;
        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if !self.forge.api_key.trim().is_empty() {
            return;
        }
        for var in API_KEY_ENV_VARS {
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    tracing::debug!("Using API key from {}", var);
                    self.forge.api_key = key.trim().to_string();
                    return;
                }
            }
        }
    }

    /// SSH user for a server: the per-server override, else the default user.
    pub fn ssh_user_for(&self, server_name: &str) -> &str {
        self.server_users
            .get(server_name)
            .map(String::as_str)
            .filter(|u| !u.is_empty())
            .unwrap_or(self.forge.ssh_user.as_str())
    }

    pub fn editor_command(&self) -> &str {
        &self.editor.command
    }
}

#[cfg(unix)]
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // An existing file keeps its old mode unless reset.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(content.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.forge.ssh_user, "forge");
        assert_eq!(config.forge.base_url, DEFAULT_BASE_URL);
        assert!(config.forge.api_key.is_empty());
        assert!(config.server_users.is_empty());
    }

    #[test]
    fn test_load_from_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.forge.ssh_user, "forge");
    }

    #[test]
    fn test_load_from_full_file() {
        let file = write_config(
            r#"
[forge]
api_key = "secret"
ssh_user = "deployer"

[editor]
command = "nano"

[server_users]
"web-1" = "root"
"#,
        );
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.forge.api_key, "secret");
        assert_eq!(config.forge.ssh_user, "deployer");
        assert_eq!(config.editor_command(), "nano");
        assert_eq!(config.server_users.get("web-1").map(String::as_str), Some("root"));
    }

    #[test]
    fn test_load_from_malformed_file_is_error() {
        let file = write_config("[forge\napi_key = ");
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, PhorgeError::ConfigParse { .. }));
    }

    #[test]
    fn test_blank_ssh_user_falls_back_to_default() {
        let file = write_config("[forge]\napi_key = \"k\"\nssh_user = \"\"\n");
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.forge.ssh_user, "forge");
    }

    #[test]
    fn test_ssh_user_for_override_and_fallback() {
        let mut config = Config::default();
        config.server_users.insert("db-1".to_string(), "admin".to_string());
        config.server_users.insert("empty".to_string(), String::new());
        assert_eq!(config.ssh_user_for("db-1"), "admin");
        assert_eq!(config.ssh_user_for("web-1"), "forge");
        assert_eq!(config.ssh_user_for("empty"), "forge");
    }

    #[test]
    #[serial]
    fn test_load_without_api_key_fails() {
        std::env::remove_var("PHORGE_API_KEY");
        std::env::remove_var("FORGE_API_KEY");
        let file = write_config("[forge]\nssh_user = \"forge\"\n");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, PhorgeError::MissingApiKey { .. }));
    }

    #[test]
    #[serial]
    fn test_api_key_from_environment() {
        std::env::remove_var("FORGE_API_KEY");
        std::env::set_var("PHORGE_API_KEY", "from-env");
        let file = write_config("");
        let config = Config::load(Some(file.path())).unwrap();
        std::env::remove_var("PHORGE_API_KEY");
        assert_eq!(config.forge.api_key, "from-env");
    }

    #[test]
    fn test_save_creates_directory_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phorge").join("config.toml");
        let mut config = Config::default();
        config.forge.api_key = "fresh-key".to_string();
        config.server_users.insert("db-1".to_string(), "admin".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.forge.api_key, "fresh-key");
        assert_eq!(loaded.ssh_user_for("db-1"), "admin");
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_config_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        Config::default().save_to(&path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let mut config = Config::default();
        config.forge.api_key = "abc".to_string();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.forge.api_key, "abc");
        assert_eq!(parsed.editor.command, config.editor.command);
    }
}
