//! Typed identifiers for the generic confirm and input overlays. Each one
//! carries the targets captured when the overlay opened, so resolving it
//! never has to consult the current selection again.

use crate::command::ApiCall;
use crate::forge::{Server, Site};

/// A destructive or state-changing action waiting on a yes/no answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Deploy { server_id: u64, site_id: u64, site: String },
    ResetDeploy { server_id: u64, site_id: u64 },
    RebootServer { server_id: u64, server: String },
    DeleteDatabase { server_id: u64, database_id: u64, name: String },
    DeleteDatabaseUser { server_id: u64, user_id: u64, name: String },
    ActivateCertificate { server_id: u64, site_id: u64, certificate_id: u64, domain: String },
    DeleteCertificate { server_id: u64, site_id: u64, certificate_id: u64, domain: String },
    CreateWorker { server_id: u64, site_id: u64 },
    RestartWorker { server_id: u64, site_id: u64, worker_id: u64 },
    DeleteWorker { server_id: u64, site_id: u64, worker_id: u64 },
    RestartDaemon { server_id: u64, daemon_id: u64, command: String },
    DeleteDaemon { server_id: u64, daemon_id: u64, command: String },
    DeleteFirewallRule { server_id: u64, rule_id: u64, name: String },
    RemoveDomain { server_id: u64, site_id: u64, domain: String, aliases: Vec<String> },
    DeleteSshKey { server_id: u64, key_id: u64, name: String },
}

impl PendingAction {
    /// Stable name used in logs.
    pub fn id(&self) -> &'static str {
        match self {
            PendingAction::Deploy { .. } => "deploy",
            PendingAction::ResetDeploy { .. } => "reset-deploy",
            PendingAction::RebootServer { .. } => "reboot-server",
            PendingAction::DeleteDatabase { .. } => "delete-db",
            PendingAction::DeleteDatabaseUser { .. } => "delete-dbuser",
            PendingAction::ActivateCertificate { .. } => "activate-cert",
            PendingAction::DeleteCertificate { .. } => "delete-cert",
            PendingAction::CreateWorker { .. } => "create-worker",
            PendingAction::RestartWorker { .. } => "restart-worker",
            PendingAction::DeleteWorker { .. } => "delete-worker",
            PendingAction::RestartDaemon { .. } => "restart-daemon",
            PendingAction::DeleteDaemon { .. } => "delete-daemon",
            PendingAction::DeleteFirewallRule { .. } => "delete-firewall",
            PendingAction::RemoveDomain { .. } => "remove-domain",
            PendingAction::DeleteSshKey { .. } => "delete-sshkey",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PendingAction::Deploy { .. } => "Deploy",
            PendingAction::ResetDeploy { .. } => "Reset Deploy Status",
            PendingAction::RebootServer { .. } => "Reboot Server",
            PendingAction::CreateWorker { .. } => "Create Worker",
            PendingAction::RestartWorker { .. } | PendingAction::RestartDaemon { .. } => "Restart",
            PendingAction::ActivateCertificate { .. } => "Activate Certificate",
            _ => "Delete",
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            PendingAction::Deploy { site, .. } => format!("Deploy {site} now?"),
            PendingAction::ResetDeploy { .. } => "Reset the deployment status of this site?".to_string(),
            PendingAction::RebootServer { server, .. } => format!("Reboot server {server}?"),
            PendingAction::DeleteDatabase { name, .. } => format!("Delete database {name}?"),
            PendingAction::DeleteDatabaseUser { name, .. } => format!("Delete database user {name}?"),
            PendingAction::ActivateCertificate { domain, .. } => format!("Activate certificate for {domain}?"),
            PendingAction::DeleteCertificate { domain, .. } => format!("Delete certificate for {domain}?"),
            PendingAction::CreateWorker { .. } => "Create a default queue worker (redis, default queue)?".to_string(),
            PendingAction::RestartWorker { worker_id, .. } => format!("Restart worker #{worker_id}?"),
            PendingAction::DeleteWorker { worker_id, .. } => format!("Delete worker #{worker_id}?"),
            PendingAction::RestartDaemon { command, .. } => {
                format!("Restart daemon {}?", crate::util::truncate(command, 40))
            }
            PendingAction::DeleteDaemon { command, .. } => {
                format!("Delete daemon {}?", crate::util::truncate(command, 40))
            }
            PendingAction::DeleteFirewallRule { name, .. } => format!("Delete firewall rule {name}?"),
            PendingAction::RemoveDomain { domain, .. } => format!("Remove domain alias {domain}?"),
            PendingAction::DeleteSshKey { name, .. } => format!("Delete SSH key {name}?"),
        }
    }

    /// The call to dispatch once the user confirms.
    pub fn into_call(self) -> ApiCall {
        match self {
            PendingAction::Deploy { server_id, site_id, .. } => ApiCall::Deploy { server_id, site_id },
            PendingAction::ResetDeploy { server_id, site_id } => ApiCall::ResetDeployStatus { server_id, site_id },
            PendingAction::RebootServer { server_id, .. } => ApiCall::RebootServer { server_id },
            PendingAction::DeleteDatabase {
                server_id, database_id, ..
            } => ApiCall::DeleteDatabase { server_id, database_id },
            PendingAction::DeleteDatabaseUser { server_id, user_id, .. } => {
                ApiCall::DeleteDatabaseUser { server_id, user_id }
            }
            PendingAction::ActivateCertificate {
                server_id,
                site_id,
                certificate_id,
                ..
            } => ApiCall::ActivateCertificate {
                server_id,
                site_id,
                certificate_id,
            },
            PendingAction::DeleteCertificate {
                server_id,
                site_id,
                certificate_id,
                ..
            } => ApiCall::DeleteCertificate {
                server_id,
                site_id,
                certificate_id,
            },
            PendingAction::CreateWorker { server_id, site_id } => ApiCall::CreateWorker { server_id, site_id },
            PendingAction::RestartWorker {
                server_id,
                site_id,
                worker_id,
            } => ApiCall::RestartWorker {
                server_id,
                site_id,
                worker_id,
            },
            PendingAction::DeleteWorker {
                server_id,
                site_id,
                worker_id,
            } => ApiCall::DeleteWorker {
                server_id,
                site_id,
                worker_id,
            },
            PendingAction::RestartDaemon { server_id, daemon_id, .. } => {
                ApiCall::RestartDaemon { server_id, daemon_id }
            }
            PendingAction::DeleteDaemon { server_id, daemon_id, .. } => ApiCall::DeleteDaemon { server_id, daemon_id },
            PendingAction::DeleteFirewallRule { server_id, rule_id, .. } => {
                ApiCall::DeleteFirewallRule { server_id, rule_id }
            }
            PendingAction::RemoveDomain {
                server_id,
                site_id,
                domain,
                aliases,
            } => ApiCall::UpdateAliases {
                server_id,
                site_id,
                aliases: aliases.into_iter().filter(|a| *a != domain).collect(),
            },
            PendingAction::DeleteSshKey { server_id, key_id, .. } => ApiCall::DeleteSshKey { server_id, key_id },
        }
    }
}

/// What a text-input overlay is collecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPurpose {
    CreateDatabase { server_id: u64 },
    CreateDatabaseUser { server_id: u64 },
    CreateCertificate { server_id: u64, site_id: u64 },
    CreateDaemon { server_id: u64 },
    CreateFirewallRule { server_id: u64 },
    RunCommand { server_id: u64, site_id: u64 },
    AddDomain { server_id: u64, site_id: u64, aliases: Vec<String> },
    /// First step of adding an SSH key: a key file path or raw key text.
    SshKeyPath { server_id: u64, username: String },
    /// Second step, only reached for raw key text held in the pending slot.
    SshKeyName { server_id: u64, username: String },
}

impl InputPurpose {
    pub fn id(&self) -> &'static str {
        match self {
            InputPurpose::CreateDatabase { .. } => "create-db",
            InputPurpose::CreateDatabaseUser { .. } => "create-dbuser",
            InputPurpose::CreateCertificate { .. } => "create-cert",
            InputPurpose::CreateDaemon { .. } => "create-daemon",
            InputPurpose::CreateFirewallRule { .. } => "create-firewall",
            InputPurpose::RunCommand { .. } => "run-command",
            InputPurpose::AddDomain { .. } => "add-domain",
            InputPurpose::SshKeyPath { .. } => "create-sshkey-path",
            InputPurpose::SshKeyName { .. } => "create-sshkey-name",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            InputPurpose::CreateDatabase { .. } => "Database name:",
            InputPurpose::CreateDatabaseUser { .. } => "Database user name:",
            InputPurpose::CreateCertificate { .. } => "Domains (comma separated):",
            InputPurpose::CreateDaemon { .. } => "Daemon command:",
            InputPurpose::CreateFirewallRule { .. } => "Rule (name:port):",
            InputPurpose::RunCommand { .. } => "Command to run:",
            InputPurpose::AddDomain { .. } => "Domain alias:",
            InputPurpose::SshKeyPath { .. } => "Public key path or key content:",
            InputPurpose::SshKeyName { .. } => "Key name:",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            InputPurpose::CreateDatabase { .. } => "my_database",
            InputPurpose::CreateDatabaseUser { .. } => "my_user",
            InputPurpose::CreateCertificate { .. } => "example.com, www.example.com",
            InputPurpose::CreateDaemon { .. } => "php artisan horizon",
            InputPurpose::CreateFirewallRule { .. } => "http:80",
            InputPurpose::RunCommand { .. } => "php artisan migrate --force",
            InputPurpose::AddDomain { .. } => "www.example.com",
            InputPurpose::SshKeyPath { .. } => "~/.ssh/id_ed25519.pub",
            InputPurpose::SshKeyName { .. } => "my-key",
        }
    }
}

/// Parse `name:port`, defaulting the port to 80 when it is omitted.
pub fn parse_firewall_rule(value: &str) -> Option<(String, u16)> {
    let (name, port) = match value.split_once(':') {
        Some((name, port)) => (name.trim(), port.trim()),
        None => (value.trim(), "80"),
    };
    if name.is_empty() {
        return None;
    }
    let port = port.parse().ok().filter(|p| *p > 0)?;
    Some((name.to_string(), port))
}

pub fn parse_domains(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
        .collect()
}

/// A drill-down view replacing the section's panel until dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubView {
    DeployScript,
    DeploymentOutput { deployment_id: u64 },
    DatabaseUsers,
    CommandDetail { command_id: u64 },
}

/// What the resource and context lists report as the cursor moves.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Server(Server),
    Site(Site),
}
