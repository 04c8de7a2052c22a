//! Deferred work requested by the session. The session never performs I/O
//! itself; it returns commands and receives their results as [`Action`]s.

use std::time::Duration;

use crate::action::Action;
use crate::config::ProjectDefaults;
use crate::external::{DbCredentials, Launch, LaunchKind, TunnelRequest};

#[derive(Debug)]
pub enum Command {
    /// One Forge API request, run off the event loop.
    Api(ApiCall),
    /// Deliver `action` after `delay`. Toast expiry and output polling.
    After { delay: Duration, action: Action },
    /// Allocate a local port and start the background SSH tunnel.
    OpenTunnel {
        request: TunnelRequest,
        credentials: DbCredentials,
    },
    /// Hand the terminal to a child process until it exits.
    Launch(Launch),
    /// Write the working directory's `.phorge` defaults.
    SaveDefaults(ProjectDefaults),
}

/// The catalog of Forge operations the dashboard issues. Every variant
/// carries the ids it needs, captured when the command was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListServers,
    RebootServer { server_id: u64 },
    ListBackupConfigs { server_id: u64 },

    ListSites { server_id: u64 },
    UpdateAliases { server_id: u64, site_id: u64, aliases: Vec<String> },

    ListDeployments { server_id: u64, site_id: u64 },
    DeploymentOutput { server_id: u64, site_id: u64, deployment_id: u64 },
    Deploy { server_id: u64, site_id: u64 },
    ResetDeployStatus { server_id: u64, site_id: u64 },
    DeployScript { server_id: u64, site_id: u64 },
    UpdateDeployScript { server_id: u64, site_id: u64, content: String },

    Environment { server_id: u64, site_id: u64 },
    UpdateEnvironment { server_id: u64, site_id: u64, content: String },
    /// Fetch `.env` and extract DB credentials for the tunnel flow.
    DatabaseCredentials {
        server_id: u64,
        site_id: u64,
        ssh_user: String,
        ssh_host: String,
        ssh_port: u16,
    },

    ListDatabases { server_id: u64 },
    CreateDatabase { server_id: u64, name: String },
    DeleteDatabase { server_id: u64, database_id: u64 },
    ListDatabaseUsers { server_id: u64 },
    CreateDatabaseUser { server_id: u64, name: String, password: String },
    DeleteDatabaseUser { server_id: u64, user_id: u64 },

    ListCertificates { server_id: u64, site_id: u64 },
    CreateCertificate { server_id: u64, site_id: u64, domains: Vec<String> },
    ActivateCertificate { server_id: u64, site_id: u64, certificate_id: u64 },
    DeleteCertificate { server_id: u64, site_id: u64, certificate_id: u64 },

    ListWorkers { server_id: u64, site_id: u64 },
    CreateWorker { server_id: u64, site_id: u64 },
    RestartWorker { server_id: u64, site_id: u64, worker_id: u64 },
    DeleteWorker { server_id: u64, site_id: u64, worker_id: u64 },

    ListDaemons { server_id: u64 },
    CreateDaemon { server_id: u64, command: String },
    RestartDaemon { server_id: u64, daemon_id: u64 },
    DeleteDaemon { server_id: u64, daemon_id: u64 },

    ListFirewallRules { server_id: u64 },
    CreateFirewallRule { server_id: u64, name: String, port: u16 },
    DeleteFirewallRule { server_id: u64, rule_id: u64 },

    ListJobs { server_id: u64 },

    ListSshKeys { server_id: u64 },
    CreateSshKey { server_id: u64, name: String, key: String, username: String },
    DeleteSshKey { server_id: u64, key_id: u64 },

    ListCommands { server_id: u64, site_id: u64 },
    RunCommand { server_id: u64, site_id: u64, command: String },
    GetCommand { server_id: u64, site_id: u64, command_id: u64 },

    SiteLog { server_id: u64, site_id: u64 },
}

impl ApiCall {
    /// Short human label used in failure toasts and logs.
    pub fn describe(&self) -> &'static str {
        use ApiCall::*;
        match self {
            ListServers => "Load servers",
            RebootServer { .. } => "Reboot server",
            ListBackupConfigs { .. } => "Load backups",
            ListSites { .. } => "Load sites",
            UpdateAliases { .. } => "Update domains",
            ListDeployments { .. } => "Load deployments",
            DeploymentOutput { .. } => "Load deployment output",
            Deploy { .. } => "Deploy",
            ResetDeployStatus { .. } => "Reset deploy status",
            DeployScript { .. } => "Load deploy script",
            UpdateDeployScript { .. } => "Save deploy script",
            Environment { .. } => "Load environment",
            UpdateEnvironment { .. } => "Save environment",
            DatabaseCredentials { .. } => "Read database credentials",
            ListDatabases { .. } => "Load databases",
            CreateDatabase { .. } => "Create database",
            DeleteDatabase { .. } => "Delete database",
            ListDatabaseUsers { .. } => "Load database users",
            CreateDatabaseUser { .. } => "Create database user",
            DeleteDatabaseUser { .. } => "Delete database user",
            ListCertificates { .. } => "Load certificates",
            CreateCertificate { .. } => "Create certificate",
            ActivateCertificate { .. } => "Activate certificate",
            DeleteCertificate { .. } => "Delete certificate",
            ListWorkers { .. } => "Load workers",
            CreateWorker { .. } => "Create worker",
            RestartWorker { .. } => "Restart worker",
            DeleteWorker { .. } => "Delete worker",
            ListDaemons { .. } => "Load daemons",
            CreateDaemon { .. } => "Create daemon",
            RestartDaemon { .. } => "Restart daemon",
            DeleteDaemon { .. } => "Delete daemon",
            ListFirewallRules { .. } => "Load firewall rules",
            CreateFirewallRule { .. } => "Create firewall rule",
            DeleteFirewallRule { .. } => "Delete firewall rule",
            ListJobs { .. } => "Load scheduled jobs",
            ListSshKeys { .. } => "Load SSH keys",
            CreateSshKey { .. } => "Add SSH key",
            DeleteSshKey { .. } => "Delete SSH key",
            ListCommands { .. } => "Load commands",
            RunCommand { .. } => "Run command",
            GetCommand { .. } => "Load command",
            SiteLog { .. } => "Load site log",
        }
    }

    /// Toast shown when a mutating call succeeds.
    pub fn success_message(&self) -> Option<&'static str> {
        use ApiCall::*;
        let msg = match self {
            RebootServer { .. } => "Server reboot initiated",
            UpdateAliases { .. } => "Domains updated",
            Deploy { .. } => "Deployment triggered",
            ResetDeployStatus { .. } => "Deploy status reset",
            UpdateDeployScript { .. } => "Deploy script saved",
            UpdateEnvironment { .. } => "Environment saved",
            CreateDatabase { .. } => "Database created",
            DeleteDatabase { .. } => "Database deleted",
            CreateDatabaseUser { .. } => "Database user created",
            DeleteDatabaseUser { .. } => "Database user deleted",
            CreateCertificate { .. } => "Certificate requested",
            ActivateCertificate { .. } => "Certificate activated",
            DeleteCertificate { .. } => "Certificate deleted",
            CreateWorker { .. } => "Worker created",
            RestartWorker { .. } => "Worker restarted",
            DeleteWorker { .. } => "Worker deleted",
            CreateDaemon { .. } => "Daemon created",
            RestartDaemon { .. } => "Daemon restarted",
            DeleteDaemon { .. } => "Daemon deleted",
            CreateFirewallRule { .. } => "Firewall rule created",
            DeleteFirewallRule { .. } => "Firewall rule deleted",
            CreateSshKey { .. } => "SSH key added",
            DeleteSshKey { .. } => "SSH key deleted",
            RunCommand { .. } => "Command started",
            _ => return None,
        };
        Some(msg)
    }

    /// The launch this call is a step of, if any. Its failure cancels that
    /// launch instead of just raising a toast.
    pub fn launch_kind(&self) -> Option<LaunchKind> {
        match self {
            ApiCall::DatabaseCredentials { .. } => Some(LaunchKind::DatabaseClient),
            _ => None,
        }
    }

    /// The list reload that should follow a successful mutation. Dispatched
    /// only from the mutation's result handler, never alongside it.
    pub fn follow_up(&self) -> Option<ApiCall> {
        use ApiCall::*;
        let call = match self {
            UpdateAliases { server_id, .. } => ListSites { server_id: *server_id },
            Deploy { server_id, site_id } | ResetDeployStatus { server_id, site_id } => ListDeployments {
                server_id: *server_id,
                site_id: *site_id,
            },
            UpdateDeployScript { server_id, site_id, .. } => DeployScript {
                server_id: *server_id,
                site_id: *site_id,
            },
            UpdateEnvironment { server_id, site_id, .. } => Environment {
                server_id: *server_id,
                site_id: *site_id,
            },
            CreateDatabase { server_id, .. } | DeleteDatabase { server_id, .. } => ListDatabases {
                server_id: *server_id,
            },
            CreateDatabaseUser { server_id, .. } | DeleteDatabaseUser { server_id, .. } => ListDatabaseUsers {
                server_id: *server_id,
            },
            CreateCertificate { server_id, site_id, .. }
            | ActivateCertificate { server_id, site_id, .. }
            | DeleteCertificate { server_id, site_id, .. } => ListCertificates {
                server_id: *server_id,
                site_id: *site_id,
            },
            CreateWorker { server_id, site_id }
            | RestartWorker { server_id, site_id, .. }
            | DeleteWorker { server_id, site_id, .. } => ListWorkers {
                server_id: *server_id,
                site_id: *site_id,
            },
            CreateDaemon { server_id, .. } | RestartDaemon { server_id, .. } | DeleteDaemon { server_id, .. } => {
                ListDaemons { server_id: *server_id }
            }
            CreateFirewallRule { server_id, .. } | DeleteFirewallRule { server_id, .. } => ListFirewallRules {
                server_id: *server_id,
            },
            CreateSshKey { server_id, .. } | DeleteSshKey { server_id, .. } => ListSshKeys {
                server_id: *server_id,
            },
            RunCommand { server_id, site_id, .. } => ListCommands {
                server_id: *server_id,
                site_id: *site_id,
            },
            _ => return None,
        };
        Some(call)
    }
}
