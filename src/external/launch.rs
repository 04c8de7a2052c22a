use std::path::Path;
use std::process::Command;

use super::env_file::DbCredentials;

pub const SSH_PROGRAM: &str = "ssh";
pub const FILE_BROWSER_PROGRAM: &str = "termscp";
pub const DATABASE_CLIENT_PROGRAM: &str = "lazysql";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchKind {
    Shell,
    FileBrowser,
    DatabaseClient,
    Editor,
}

impl LaunchKind {
    pub fn label(self) -> &'static str {
        match self {
            LaunchKind::Shell => "SSH session",
            LaunchKind::FileBrowser => "File browser",
            LaunchKind::DatabaseClient => "Database client",
            LaunchKind::Editor => "Editor",
        }
    }
}

/// Remote text edited through the local editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Environment { server_id: u64, site_id: u64 },
    DeployScript { server_id: u64, site_id: u64 },
}

impl EditTarget {
    pub fn file_suffix(&self) -> &'static str {
        match self {
            EditTarget::Environment { .. } => ".env",
            EditTarget::DeployScript { .. } => ".sh",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EditTarget::Environment { .. } => "Environment",
            EditTarget::DeployScript { .. } => "Deploy script",
        }
    }
}

/// A terminal-owning child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    Shell {
        user: String,
        host: String,
        port: u16,
        directory: Option<String>,
    },
    FileBrowser {
        user: String,
        host: String,
        port: u16,
        path: String,
    },
    DatabaseClient {
        credentials: DbCredentials,
        local_port: u16,
    },
    Editor {
        editor: String,
        target: EditTarget,
        content: String,
    },
}

impl Launch {
    pub fn kind(&self) -> LaunchKind {
        match self {
            Launch::Shell { .. } => LaunchKind::Shell,
            Launch::FileBrowser { .. } => LaunchKind::FileBrowser,
            Launch::DatabaseClient { .. } => LaunchKind::DatabaseClient,
            Launch::Editor { .. } => LaunchKind::Editor,
        }
    }

    pub fn program(&self) -> &str {
        match self {
            Launch::Shell { .. } => SSH_PROGRAM,
            Launch::FileBrowser { .. } => FILE_BROWSER_PROGRAM,
            Launch::DatabaseClient { .. } => DATABASE_CLIENT_PROGRAM,
            Launch::Editor { editor, .. } => editor.split_whitespace().next().unwrap_or("vi"),
        }
    }

    /// Arguments for everything except the editor, whose file path is only
    /// known once the temp file exists.
    pub fn args(&self) -> Vec<String> {
        match self {
            Launch::Shell {
                user,
                host,
                port,
                directory,
            } => {
                let mut args = Vec::new();
                if *port != 22 {
                    args.push("-p".to_string());
                    args.push(port.to_string());
                }
                args.push(format!("{user}@{host}"));
                if let Some(dir) = directory {
                    args.push("-t".to_string());
                    args.push(format!("cd {dir} && exec $SHELL -l"));
                }
                args
            }
            Launch::FileBrowser { user, host, port, path } => {
                vec![format!("scp://{user}@{host}:{port}{path}")]
            }
            Launch::DatabaseClient {
                credentials,
                local_port,
            } => vec![credentials.dsn(*local_port)],
            Launch::Editor { editor, .. } => editor.split_whitespace().skip(1).map(String::from).collect(),
        }
    }

    pub fn envs(&self) -> Vec<(String, String)> {
        match self {
            Launch::DatabaseClient {
                credentials,
                local_port,
            } => vec![
                ("DB_HOST".to_string(), "127.0.0.1".to_string()),
                ("DB_PORT".to_string(), local_port.to_string()),
                ("DB_USER".to_string(), credentials.username.clone()),
                ("DB_PASSWORD".to_string(), credentials.password.clone()),
                ("DB_NAME".to_string(), credentials.database.clone()),
            ],
            _ => Vec::new(),
        }
    }

    pub fn command(&self, file: Option<&Path>) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(self.args());
        if let Some(file) = file {
            cmd.arg(file);
        }
        cmd.envs(self.envs());
        cmd
    }
}
