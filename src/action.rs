use crossterm::event::KeyEvent;

use crate::command::ApiCall;
use crate::config::ProjectDefaults;
use crate::external::{DbCredentials, EditTarget, LaunchKind, TunnelHandle, TunnelRequest};
use crate::forge::{
    BackupConfig, Certificate, Daemon, Database, DatabaseUser, Deployment, FirewallRule, ScheduledJob, Server,
    Site, SiteCommand, SshKey, Worker,
};

/// Every message the session reducer accepts: terminal input plus the
/// results of commands it dispatched earlier.
#[derive(Debug)]
pub enum Action {
    Key(KeyEvent),
    /// Bracketed paste. Only an open input prompt takes it.
    Paste(String),
    Resize(u16, u16),

    /// A read call returned data.
    Loaded(Loaded),
    /// A mutating call succeeded.
    Completed(ApiCall),
    /// Any call failed. Classification already happened in the client.
    Failed { operation: String, message: String },
    /// A step of a pending launch failed. Only this returns the external
    /// state to idle; an unrelated failure leaves the launch pending.
    LaunchFailed {
        kind: LaunchKind,
        operation: String,
        message: String,
    },

    ClearToast,
    PollDeployOutput { deployment_id: u64 },
    /// Outcome of writing the directory's default server and site.
    DefaultsSaved {
        defaults: ProjectDefaults,
        result: Result<(), String>,
    },

    /// The background port-forward is up; launch the database client.
    TunnelOpened {
        tunnel: TunnelHandle,
        credentials: DbCredentials,
    },
    /// The host loop released the terminal and the child is starting.
    ExternalStarted(LaunchKind),
    ExternalExited {
        kind: LaunchKind,
        result: Result<(), String>,
    },
    EditorFinished {
        target: EditTarget,
        original: String,
        edited: Result<String, String>,
    },
    /// First frame drawn after a child gave the terminal back.
    ExternalResumed,
}

/// Payloads of read calls, tagged with the scope they were fetched for so
/// a late result for a previous selection can be dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    Servers(Vec<Server>),
    Sites { server_id: u64, sites: Vec<Site> },
    BackupConfigs { server_id: u64, configs: Vec<BackupConfig> },
    Deployments { site_id: u64, deployments: Vec<Deployment> },
    DeploymentOutput { deployment_id: u64, output: String, finished: bool },
    DeployScript { site_id: u64, content: String },
    Environment { site_id: u64, content: String },
    DbCredentials { request: TunnelRequest, credentials: DbCredentials },
    Databases { server_id: u64, databases: Vec<Database> },
    DatabaseUsers { server_id: u64, users: Vec<DatabaseUser> },
    Certificates { site_id: u64, certificates: Vec<Certificate> },
    Workers { site_id: u64, workers: Vec<Worker> },
    Daemons { server_id: u64, daemons: Vec<Daemon> },
    FirewallRules { server_id: u64, rules: Vec<FirewallRule> },
    Jobs { server_id: u64, jobs: Vec<ScheduledJob> },
    SshKeys { server_id: u64, keys: Vec<SshKey> },
    Commands { site_id: u64, commands: Vec<SiteCommand> },
    CommandDetail { site_id: u64, command: SiteCommand },
    SiteLog { site_id: u64, content: String },
}

impl Action {
    pub fn failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Action::Failed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn launch_failed(kind: LaunchKind, operation: impl Into<String>, message: impl Into<String>) -> Self {
        Action::LaunchFailed {
            kind,
            operation: operation.into(),
            message: message.into(),
        }
    }
}
