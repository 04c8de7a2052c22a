//! Forge API resource models. Forge returns `null` for most optional
//! attributes, so anything that may be absent is an `Option`.

use serde::{Deserialize, Serialize};

/// The account the API token belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub id: u64,
    pub name: String,
    pub ip_address: Option<String>,
    pub private_ip_address: Option<String>,
    pub region: Option<String>,
    pub php_version: Option<String>,
    pub provider: Option<String>,
    #[serde(rename = "type")]
    pub server_type: Option<String>,
    pub status: Option<String>,
    pub is_ready: bool,
    pub database_type: Option<String>,
    pub ssh_port: Option<u16>,
    pub ubuntu_version: Option<String>,
}

impl Server {
    pub fn ssh_port(&self) -> u16 {
        self.ssh_port.filter(|p| *p != 0).unwrap_or(22)
    }

    pub fn ip(&self) -> &str {
        self.ip_address.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Site {
    pub id: u64,
    pub server_id: u64,
    pub name: String,
    pub directory: Option<String>,
    pub web_directory: Option<String>,
    pub repository: Option<String>,
    pub repository_provider: Option<String>,
    pub repository_branch: Option<String>,
    pub repository_status: Option<String>,
    pub quick_deploy: bool,
    pub deployment_url: Option<String>,
    pub status: Option<String>,
    pub project_type: Option<String>,
    pub php_version: Option<String>,
    pub aliases: Vec<String>,
    pub is_secured: bool,
}

impl Site {
    pub fn directory(&self) -> Option<&str> {
        self.directory.as_deref().filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployment {
    pub id: u64,
    pub server_id: u64,
    pub site_id: u64,
    pub commit_hash: Option<String>,
    pub commit_author: Option<String>,
    pub commit_message: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub status: Option<String>,
    pub displayable_type: Option<String>,
}

impl Deployment {
    pub fn is_running(&self) -> bool {
        self.status.as_deref() == Some("deploying")
    }

    pub fn short_hash(&self) -> &str {
        let hash = self.commit_hash.as_deref().unwrap_or_default();
        hash.get(..7).unwrap_or(hash)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    pub id: u64,
    pub server_id: u64,
    pub name: String,
    pub status: Option<String>,
    pub is_synced: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseUser {
    pub id: u64,
    pub server_id: u64,
    pub name: String,
    pub status: Option<String>,
    pub databases: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certificate {
    pub id: u64,
    pub domain: Option<String>,
    #[serde(rename = "type")]
    pub cert_type: Option<String>,
    pub active: bool,
    pub status: Option<String>,
    pub existing: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Worker {
    pub id: u64,
    pub connection: Option<String>,
    pub queue: Option<String>,
    pub timeout: Option<u32>,
    pub sleep: Option<u32>,
    pub processes: Option<u32>,
    pub daemon: bool,
    pub force: bool,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Daemon {
    pub id: u64,
    pub server_id: u64,
    pub command: String,
    pub user: Option<String>,
    pub directory: Option<String>,
    pub processes: Option<u32>,
    pub startsecs: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallRule {
    pub id: u64,
    pub server_id: u64,
    pub name: String,
    /// Forge reports ports as numbers, ranges ("8000-8010") or strings.
    pub port: serde_json::Value,
    pub ip_address: Option<String>,
    #[serde(rename = "type")]
    pub rule_type: Option<String>,
    pub status: Option<String>,
}

impl FirewallRule {
    pub fn port_label(&self) -> String {
        match &self.port {
            serde_json::Value::Null => "-".to_string(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduledJob {
    pub id: u64,
    pub server_id: u64,
    pub command: String,
    pub user: Option<String>,
    pub frequency: Option<String>,
    pub cron: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub id: u64,
    pub server_id: u64,
    pub day_of_week: Option<u8>,
    pub time: Option<String>,
    pub provider: Option<String>,
    pub frequency: Option<String>,
    pub databases: Vec<serde_json::Value>,
    pub backup_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshKey {
    pub id: u64,
    pub name: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteCommand {
    pub id: u64,
    pub server_id: u64,
    pub site_id: u64,
    pub command: String,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub user_name: Option<String>,
}

/// Options for a new queue worker. Defaults match what Forge's own UI
/// pre-fills.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerOptions {
    pub connection: String,
    pub queue: String,
    pub timeout: u32,
    pub sleep: u32,
    pub processes: u32,
    pub daemon: bool,
    pub force: bool,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            connection: "redis".to_string(),
            queue: "default".to_string(),
            timeout: 60,
            sleep: 3,
            processes: 1,
            daemon: true,
            force: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaemonOptions {
    pub command: String,
    pub user: String,
    pub processes: u32,
    pub startsecs: u32,
}

impl DaemonOptions {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            user: "forge".to_string(),
            processes: 1,
            startsecs: 1,
        }
    }
}
