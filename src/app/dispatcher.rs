// Dispatcher - runs session commands off the event loop and feeds the
// results back as actions

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::action::{Action, Loaded};
use crate::command::ApiCall;
use crate::error::Result;
use crate::external::{tunnel, DbCredentials, LaunchKind, TunnelRequest};
use crate::forge::{DaemonOptions, ForgeClient, WorkerOptions};

pub type ActionSender = UnboundedSender<Action>;

fn deliver(tx: &ActionSender, action: Action) {
    if tx.send(action).is_err() {
        tracing::debug!("Action channel closed, dropping result");
    }
}

/// Run one API call in the background. Only the call's label is logged;
/// payloads can carry secrets.
pub fn spawn_call(client: &ForgeClient, call: ApiCall, tx: &ActionSender) {
    let client = client.clone();
    let tx = tx.clone();
    tracing::debug!("Dispatching: {}", call.describe());
    tokio::spawn(async move {
        let action = execute(&client, call).await;
        deliver(&tx, action);
    });
}

pub fn spawn_timer(delay: Duration, action: Action, tx: &ActionSender) {
    let tx = tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        deliver(&tx, action);
    });
}

pub fn spawn_tunnel(request: TunnelRequest, credentials: DbCredentials, tx: &ActionSender) {
    let tx = tx.clone();
    tokio::spawn(async move {
        let action = match tunnel::open(request).await {
            Ok(tunnel) => Action::TunnelOpened { tunnel, credentials },
            Err(e) => Action::launch_failed(LaunchKind::DatabaseClient, "Open SSH tunnel", e.to_string()),
        };
        deliver(&tx, action);
    });
}

/// Perform `call` and translate the outcome. Reads become [`Action::Loaded`],
/// mutations echo the call back as [`Action::Completed`]. A failed step of
/// a launch is reported as [`Action::LaunchFailed`].
pub async fn execute(client: &ForgeClient, call: ApiCall) -> Action {
    match perform(client, &call).await {
        Ok(Some(loaded)) => Action::Loaded(loaded),
        Ok(None) => Action::Completed(call),
        Err(e) => {
            tracing::warn!("{} failed: {}", call.describe(), e);
            match call.launch_kind() {
                Some(kind) => Action::launch_failed(kind, call.describe(), e.to_string()),
                None => Action::failed(call.describe(), e.to_string()),
            }
        }
    }
}

async fn perform(client: &ForgeClient, call: &ApiCall) -> Result<Option<Loaded>> {
    use ApiCall::*;

    let loaded = match *call {
        ListServers => Loaded::Servers(client.list_servers().await?),
        RebootServer { server_id } => {
            client.reboot_server(server_id).await?;
            return Ok(None);
        }
        ListBackupConfigs { server_id } => Loaded::BackupConfigs {
            server_id,
            configs: client.list_backup_configs(server_id).await?,
        },

        ListSites { server_id } => Loaded::Sites {
            server_id,
            sites: client.list_sites(server_id).await?,
        },
        UpdateAliases {
            server_id,
            site_id,
            ref aliases,
        } => {
            client.update_aliases(server_id, site_id, aliases).await?;
            return Ok(None);
        }

        ListDeployments { server_id, site_id } => Loaded::Deployments {
            site_id,
            deployments: client.list_deployments(server_id, site_id).await?,
        },
        DeploymentOutput {
            server_id,
            site_id,
            deployment_id,
        } => {
            let (deployment, output) = tokio::join!(
                client.get_deployment(server_id, site_id, deployment_id),
                client.deployment_output(server_id, site_id, deployment_id),
            );
            Loaded::DeploymentOutput {
                deployment_id,
                output: output?,
                finished: !deployment?.is_running(),
            }
        }
        Deploy { server_id, site_id } => {
            client.deploy(server_id, site_id).await?;
            return Ok(None);
        }
        ResetDeployStatus { server_id, site_id } => {
            client.reset_deployment_status(server_id, site_id).await?;
            return Ok(None);
        }
        DeployScript { server_id, site_id } => Loaded::DeployScript {
            site_id,
            content: client.deploy_script(server_id, site_id).await?,
        },
        UpdateDeployScript {
            server_id,
            site_id,
            ref content,
        } => {
            client.update_deploy_script(server_id, site_id, content).await?;
            return Ok(None);
        }

        Environment { server_id, site_id } => Loaded::Environment {
            site_id,
            content: client.environment(server_id, site_id).await?,
        },
        UpdateEnvironment {
            server_id,
            site_id,
            ref content,
        } => {
            client.update_environment(server_id, site_id, content).await?;
            return Ok(None);
        }
        DatabaseCredentials {
            server_id,
            site_id,
            ref ssh_user,
            ref ssh_host,
            ssh_port,
        } => {
            let env = client.environment(server_id, site_id).await?;
            let credentials = DbCredentials::from_env(&env)?;
            let request = TunnelRequest {
                ssh_user: ssh_user.clone(),
                ssh_host: ssh_host.clone(),
                ssh_port,
                remote_host: credentials.host.clone(),
                remote_port: credentials.port,
            };
            Loaded::DbCredentials { request, credentials }
        }

        ListDatabases { server_id } => Loaded::Databases {
            server_id,
            databases: client.list_databases(server_id).await?,
        },
        CreateDatabase { server_id, ref name } => {
            client.create_database(server_id, name).await?;
            return Ok(None);
        }
        DeleteDatabase { server_id, database_id } => {
            client.delete_database(server_id, database_id).await?;
            return Ok(None);
        }
        ListDatabaseUsers { server_id } => Loaded::DatabaseUsers {
            server_id,
            users: client.list_database_users(server_id).await?,
        },
        CreateDatabaseUser {
            server_id,
            ref name,
            ref password,
        } => {
            client.create_database_user(server_id, name, password, &[]).await?;
            return Ok(None);
        }
        DeleteDatabaseUser { server_id, user_id } => {
            client.delete_database_user(server_id, user_id).await?;
            return Ok(None);
        }

        ListCertificates { server_id, site_id } => Loaded::Certificates {
            site_id,
            certificates: client.list_certificates(server_id, site_id).await?,
        },
        CreateCertificate {
            server_id,
            site_id,
            ref domains,
        } => {
            client
                .create_letsencrypt_certificate(server_id, site_id, domains)
                .await?;
            return Ok(None);
        }
        ActivateCertificate {
            server_id,
            site_id,
            certificate_id,
        } => {
            client.activate_certificate(server_id, site_id, certificate_id).await?;
            return Ok(None);
        }
        DeleteCertificate {
            server_id,
            site_id,
            certificate_id,
        } => {
            client.delete_certificate(server_id, site_id, certificate_id).await?;
            return Ok(None);
        }

        ListWorkers { server_id, site_id } => Loaded::Workers {
            site_id,
            workers: client.list_workers(server_id, site_id).await?,
        },
        CreateWorker { server_id, site_id } => {
            client
                .create_worker(server_id, site_id, &WorkerOptions::default())
                .await?;
            return Ok(None);
        }
        RestartWorker {
            server_id,
            site_id,
            worker_id,
        } => {
            client.restart_worker(server_id, site_id, worker_id).await?;
            return Ok(None);
        }
        DeleteWorker {
            server_id,
            site_id,
            worker_id,
        } => {
            client.delete_worker(server_id, site_id, worker_id).await?;
            return Ok(None);
        }

        ListDaemons { server_id } => Loaded::Daemons {
            server_id,
            daemons: client.list_daemons(server_id).await?,
        },
        CreateDaemon { server_id, ref command } => {
            client.create_daemon(server_id, &DaemonOptions::new(command.as_str())).await?;
            return Ok(None);
        }
        RestartDaemon { server_id, daemon_id } => {
            client.restart_daemon(server_id, daemon_id).await?;
            return Ok(None);
        }
        DeleteDaemon { server_id, daemon_id } => {
            client.delete_daemon(server_id, daemon_id).await?;
            return Ok(None);
        }

        ListFirewallRules { server_id } => Loaded::FirewallRules {
            server_id,
            rules: client.list_firewall_rules(server_id).await?,
        },
        CreateFirewallRule {
            server_id,
            ref name,
            port,
        } => {
            client.create_firewall_rule(server_id, name, port).await?;
            return Ok(None);
        }
        DeleteFirewallRule { server_id, rule_id } => {
            client.delete_firewall_rule(server_id, rule_id).await?;
            return Ok(None);
        }

        ListJobs { server_id } => Loaded::Jobs {
            server_id,
            jobs: client.list_jobs(server_id).await?,
        },

        ListSshKeys { server_id } => Loaded::SshKeys {
            server_id,
            keys: client.list_ssh_keys(server_id).await?,
        },
        CreateSshKey {
            server_id,
            ref name,
            ref key,
            ref username,
        } => {
            client.create_ssh_key(server_id, name, key, username).await?;
            return Ok(None);
        }
        DeleteSshKey { server_id, key_id } => {
            client.delete_ssh_key(server_id, key_id).await?;
            return Ok(None);
        }

        ListCommands { server_id, site_id } => Loaded::Commands {
            site_id,
            commands: client.list_commands(server_id, site_id).await?,
        },
        RunCommand {
            server_id,
            site_id,
            ref command,
        } => {
            client.run_command(server_id, site_id, command).await?;
            return Ok(None);
        }
        GetCommand {
            server_id,
            site_id,
            command_id,
        } => Loaded::CommandDetail {
            site_id,
            command: client.get_command(server_id, site_id, command_id).await?,
        },

        SiteLog { server_id, site_id } => Loaded::SiteLog {
            site_id,
            content: client.site_log(server_id, site_id).await?,
        },
    };
    Ok(Some(loaded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::DbDriver;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ForgeClient {
        ForgeClient::new(server.uri(), "test-token").unwrap()
    }

    #[tokio::test]
    async fn test_list_becomes_loaded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers/1/sites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sites": [{"id": 10, "server_id": 1, "name": "a.test"}]
            })))
            .mount(&server)
            .await;

        let action = execute(&client_for(&server).await, ApiCall::ListSites { server_id: 1 }).await;
        match action {
            Action::Loaded(Loaded::Sites { server_id, sites }) => {
                assert_eq!(server_id, 1);
                assert_eq!(sites.len(), 1);
                assert_eq!(sites[0].name, "a.test");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mutation_echoes_the_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/servers/1/sites/10/deployment/deploy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let call = ApiCall::Deploy { server_id: 1, site_id: 10 };
        let action = execute(&client_for(&server).await, call.clone()).await;
        assert!(matches!(action, Action::Completed(c) if c == call));
    }

    #[tokio::test]
    async fn test_failure_is_labelled_with_the_operation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers/1/databases"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Server not found"})))
            .mount(&server)
            .await;

        let action = execute(&client_for(&server).await, ApiCall::ListDatabases { server_id: 1 }).await;
        match action {
            Action::Failed { operation, message } => {
                assert_eq!(operation, "Load databases");
                assert!(message.contains("Server not found"), "{message}");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_deployment_output_reports_finished() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers/1/sites/10/deployment-history/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "deployment": {"id": 5, "site_id": 10, "status": "finished"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/servers/1/sites/10/deployment-history/5/output"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": "Done."})))
            .mount(&server)
            .await;

        let call = ApiCall::DeploymentOutput {
            server_id: 1,
            site_id: 10,
            deployment_id: 5,
        };
        let action = execute(&client_for(&server).await, call).await;
        match action {
            Action::Loaded(Loaded::DeploymentOutput {
                deployment_id,
                output,
                finished,
            }) => {
                assert_eq!(deployment_id, 5);
                assert_eq!(output, "Done.");
                assert!(finished);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_database_credentials_build_tunnel_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers/1/sites/10/env"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "DB_CONNECTION=pgsql\nDB_HOST=10.0.0.5\nDB_DATABASE=shop\nDB_USERNAME=shop\nDB_PASSWORD=secret\n",
            ))
            .mount(&server)
            .await;

        let call = ApiCall::DatabaseCredentials {
            server_id: 1,
            site_id: 10,
            ssh_user: "forge".to_string(),
            ssh_host: "203.0.113.1".to_string(),
            ssh_port: 22,
        };
        let action = execute(&client_for(&server).await, call).await;
        match action {
            Action::Loaded(Loaded::DbCredentials { request, credentials }) => {
                assert_eq!(credentials.driver, DbDriver::Postgres);
                assert_eq!(request.ssh_host, "203.0.113.1");
                assert_eq!(request.remote_host, "10.0.0.5");
                assert_eq!(request.remote_port, 5432);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_env_without_db_host_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers/1/sites/10/env"))
            .respond_with(ResponseTemplate::new(200).set_body_string("APP_ENV=production\n"))
            .mount(&server)
            .await;

        let call = ApiCall::DatabaseCredentials {
            server_id: 1,
            site_id: 10,
            ssh_user: "forge".to_string(),
            ssh_host: "203.0.113.1".to_string(),
            ssh_port: 22,
        };
        let action = execute(&client_for(&server).await, call).await;
        assert!(
            matches!(
                &action,
                Action::LaunchFailed { kind: LaunchKind::DatabaseClient, message, .. }
                    if message == "DB_HOST not found in .env"
            ),
            "{action:?}"
        );
    }

    #[tokio::test]
    async fn test_timer_delivers_after_delay() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        spawn_timer(Duration::from_millis(10), Action::ClearToast, &tx);
        let action = rx.recv().await;
        assert!(matches!(action, Some(Action::ClearToast)));
    }
}
