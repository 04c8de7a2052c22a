//! File logging. The terminal belongs to the TUI, so nothing is ever written
//! to stdout or stderr once the session starts.

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "phorge.log";

pub fn log_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "phorge").map(|dirs| dirs.data_local_dir().to_path_buf())
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. The returned guard flushes the writer on
/// drop and must be held for the lifetime of `main`.
pub fn init(level: &str) -> Option<WorkerGuard> {
    let filter = env_filter(level);

    let dir = log_dir().filter(|dir| std::fs::create_dir_all(dir).is_ok());
    match dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .try_init();
            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .try_init();
            None
        }
    }
}
