use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Phorge: browse and operate Laravel Forge servers and sites from the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "phorge")]
#[command(version)]
#[command(disable_version_flag = true)]
#[command(about = "Terminal dashboard for Laravel Forge", long_about = None)]
pub struct Cli {
    /// Print version and exit
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,

    /// Path to the configuration file
    #[arg(long, value_name = "PATH", env = "PHORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_cli_defaults() {
        std::env::remove_var("PHORGE_CONFIG");
        let cli = Cli::parse_from(["phorge"]);
        assert!(cli.config.is_none());
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_short_version_flag_exits_with_version() {
        let err = Cli::try_parse_from(["phorge", "-v"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_long_version_flag_exits_with_version() {
        let err = Cli::try_parse_from(["phorge", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    #[serial]
    fn test_config_flag() {
        std::env::remove_var("PHORGE_CONFIG");
        let cli = Cli::parse_from(["phorge", "--config", "/tmp/phorge.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/phorge.toml")));
    }

    #[test]
    fn test_log_level_flag() {
        let cli = Cli::parse_from(["phorge", "--log-level", "debug"]);
        assert_eq!(cli.log_level, "debug");
    }
}
