use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::error::{classify, ForgeError};
use super::types::*;

pub type ForgeResult<T> = std::result::Result<T, ForgeError>;

const USER_AGENT: &str = concat!("phorge/", env!("CARGO_PKG_VERSION"));

/// Thin async wrapper over the Forge v1 REST API.
///
/// Every method is a single request; errors are classified once here so
/// callers only ever see a [`ForgeError`].
#[derive(Clone)]
pub struct ForgeClient {
    http: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for ForgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForgeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ForgeClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> ForgeResult<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ForgeError::from)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    async fn send(&self, builder: RequestBuilder) -> ForgeResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = classify(status.as_u16(), status.canonical_reason(), &body);
        tracing::debug!("Forge request failed: {}", err);
        Err(err)
    }

    /// JSON request whose payload is wrapped in a single top-level key,
    /// e.g. `{"servers": [...]}`.
    async fn json_field<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        field: &str,
    ) -> ForgeResult<T> {
        let mut builder = self.request(method, path).header("Accept", "application/json");
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        let mut value: Value = self.send(builder).await?.json().await?;
        let inner = value.get_mut(field).map(Value::take).ok_or_else(|| ForgeError::Parse {
            message: format!("response from {path} has no `{field}` field"),
        })?;
        serde_json::from_value(inner).map_err(|e| ForgeError::Parse {
            message: e.to_string(),
        })
    }

    async fn get_field<T: DeserializeOwned>(&self, path: &str, field: &str) -> ForgeResult<T> {
        self.json_field(Method::GET, path, None, field).await
    }

    async fn post_field<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        field: &str,
    ) -> ForgeResult<T> {
        let body = serde_json::to_value(body).map_err(|e| ForgeError::Parse {
            message: e.to_string(),
        })?;
        self.json_field(Method::POST, path, Some(body), field).await
    }

    /// Request whose response body is ignored.
    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> ForgeResult<()> {
        let mut builder = self.request(method, path).header("Accept", "application/json");
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        self.send(builder).await?;
        Ok(())
    }

    async fn get_text(&self, path: &str) -> ForgeResult<String> {
        let builder = self.request(Method::GET, path).header("Accept", "text/plain");
        Ok(self.send(builder).await?.text().await?)
    }

    /// The token's owner. Cheap enough to double as a key check.
    pub async fn get_user(&self) -> ForgeResult<User> {
        self.get_field("/user", "user").await
    }

    // ── Servers ────────────────────────────────────────────────────────────

    pub async fn list_servers(&self) -> ForgeResult<Vec<Server>> {
        self.get_field("/servers", "servers").await
    }

    pub async fn get_server(&self, server_id: u64) -> ForgeResult<Server> {
        self.get_field(&format!("/servers/{server_id}"), "server").await
    }

    pub async fn reboot_server(&self, server_id: u64) -> ForgeResult<()> {
        self.execute(Method::POST, &format!("/servers/{server_id}/reboot"), None)
            .await
    }

    // ── Sites ──────────────────────────────────────────────────────────────

    pub async fn list_sites(&self, server_id: u64) -> ForgeResult<Vec<Site>> {
        self.get_field(&format!("/servers/{server_id}/sites"), "sites")
            .await
    }

    pub async fn get_site(&self, server_id: u64, site_id: u64) -> ForgeResult<Site> {
        self.get_field(&format!("/servers/{server_id}/sites/{site_id}"), "site")
            .await
    }

    pub async fn update_aliases(
        &self,
        server_id: u64,
        site_id: u64,
        aliases: &[String],
    ) -> ForgeResult<Site> {
        let path = format!("/servers/{server_id}/sites/{site_id}/aliases");
        self.json_field(Method::PUT, &path, Some(json!({ "aliases": aliases })), "site")
            .await
    }

    // ── Deployments ────────────────────────────────────────────────────────

    pub async fn list_deployments(&self, server_id: u64, site_id: u64) -> ForgeResult<Vec<Deployment>> {
        let path = format!("/servers/{server_id}/sites/{site_id}/deployment-history");
        self.get_field(&path, "deployments").await
    }

    pub async fn get_deployment(
        &self,
        server_id: u64,
        site_id: u64,
        deployment_id: u64,
    ) -> ForgeResult<Deployment> {
        let path = format!("/servers/{server_id}/sites/{site_id}/deployment-history/{deployment_id}");
        self.get_field(&path, "deployment").await
    }

    pub async fn deployment_output(
        &self,
        server_id: u64,
        site_id: u64,
        deployment_id: u64,
    ) -> ForgeResult<String> {
        let path =
            format!("/servers/{server_id}/sites/{site_id}/deployment-history/{deployment_id}/output");
        self.get_field(&path, "output").await
    }

    pub async fn deploy(&self, server_id: u64, site_id: u64) -> ForgeResult<()> {
        let path = format!("/servers/{server_id}/sites/{site_id}/deployment/deploy");
        self.execute(Method::POST, &path, None).await
    }

    pub async fn reset_deployment_status(&self, server_id: u64, site_id: u64) -> ForgeResult<()> {
        let path = format!("/servers/{server_id}/sites/{site_id}/deployment/reset");
        self.execute(Method::POST, &path, None).await
    }

    pub async fn deploy_script(&self, server_id: u64, site_id: u64) -> ForgeResult<String> {
        self.get_text(&format!("/servers/{server_id}/sites/{site_id}/deployment/script"))
            .await
    }

    pub async fn update_deploy_script(&self, server_id: u64, site_id: u64, content: &str) -> ForgeResult<()> {
        let path = format!("/servers/{server_id}/sites/{site_id}/deployment/script");
        self.execute(Method::PUT, &path, Some(json!({ "content": content })))
            .await
    }

    // ── Databases ──────────────────────────────────────────────────────────

    pub async fn list_databases(&self, server_id: u64) -> ForgeResult<Vec<Database>> {
        self.get_field(&format!("/servers/{server_id}/databases"), "databases")
            .await
    }

    pub async fn create_database(&self, server_id: u64, name: &str) -> ForgeResult<Database> {
        let path = format!("/servers/{server_id}/databases");
        self.post_field(&path, &json!({ "name": name }), "database")
            .await
    }

    pub async fn delete_database(&self, server_id: u64, database_id: u64) -> ForgeResult<()> {
        let path = format!("/servers/{server_id}/databases/{database_id}");
        self.execute(Method::DELETE, &path, None).await
    }

    pub async fn list_database_users(&self, server_id: u64) -> ForgeResult<Vec<DatabaseUser>> {
        self.get_field(&format!("/servers/{server_id}/database-users"), "users")
            .await
    }

    pub async fn create_database_user(
        &self,
        server_id: u64,
        name: &str,
        password: &str,
        databases: &[u64],
    ) -> ForgeResult<DatabaseUser> {
        let path = format!("/servers/{server_id}/database-users");
        let body = json!({ "name": name, "password": password, "databases": databases });
        self.post_field(&path, &body, "user").await
    }

    pub async fn delete_database_user(&self, server_id: u64, user_id: u64) -> ForgeResult<()> {
        let path = format!("/servers/{server_id}/database-users/{user_id}");
        self.execute(Method::DELETE, &path, None).await
    }

    // ── Environment ────────────────────────────────────────────────────────

    pub async fn environment(&self, server_id: u64, site_id: u64) -> ForgeResult<String> {
        self.get_text(&format!("/servers/{server_id}/sites/{site_id}/env"))
            .await
    }

    pub async fn update_environment(&self, server_id: u64, site_id: u64, content: &str) -> ForgeResult<()> {
        let path = format!("/servers/{server_id}/sites/{site_id}/env");
        self.execute(Method::PUT, &path, Some(json!({ "content": content })))
            .await
    }

    // ── Certificates ───────────────────────────────────────────────────────

    pub async fn list_certificates(&self, server_id: u64, site_id: u64) -> ForgeResult<Vec<Certificate>> {
        let path = format!("/servers/{server_id}/sites/{site_id}/certificates");
        self.get_field(&path, "certificates").await
    }

    pub async fn create_letsencrypt_certificate(
        &self,
        server_id: u64,
        site_id: u64,
        domains: &[String],
    ) -> ForgeResult<Certificate> {
        let path = format!("/servers/{server_id}/sites/{site_id}/certificates/letsencrypt");
        self.post_field(&path, &json!({ "domains": domains }), "certificate")
            .await
    }

    pub async fn activate_certificate(&self, server_id: u64, site_id: u64, cert_id: u64) -> ForgeResult<()> {
        let path = format!("/servers/{server_id}/sites/{site_id}/certificates/{cert_id}/activate");
        self.execute(Method::POST, &path, None).await
    }

    pub async fn delete_certificate(&self, server_id: u64, site_id: u64, cert_id: u64) -> ForgeResult<()> {
        let path = format!("/servers/{server_id}/sites/{site_id}/certificates/{cert_id}");
        self.execute(Method::DELETE, &path, None).await
    }

    // ── Workers ────────────────────────────────────────────────────────────

    pub async fn list_workers(&self, server_id: u64, site_id: u64) -> ForgeResult<Vec<Worker>> {
        let path = format!("/servers/{server_id}/sites/{site_id}/workers");
        self.get_field(&path, "workers").await
    }

    pub async fn create_worker(
        &self,
        server_id: u64,
        site_id: u64,
        options: &WorkerOptions,
    ) -> ForgeResult<Worker> {
        let path = format!("/servers/{server_id}/sites/{site_id}/workers");
        self.post_field(&path, options, "worker").await
    }

    pub async fn restart_worker(&self, server_id: u64, site_id: u64, worker_id: u64) -> ForgeResult<()> {
        let path = format!("/servers/{server_id}/sites/{site_id}/workers/{worker_id}/restart");
        self.execute(Method::POST, &path, None).await
    }

    pub async fn delete_worker(&self, server_id: u64, site_id: u64, worker_id: u64) -> ForgeResult<()> {
        let path = format!("/servers/{server_id}/sites/{site_id}/workers/{worker_id}");
        self.execute(Method::DELETE, &path, None).await
    }

    // ── Daemons ────────────────────────────────────────────────────────────

    pub async fn list_daemons(&self, server_id: u64) -> ForgeResult<Vec<Daemon>> {
        self.get_field(&format!("/servers/{server_id}/daemons"), "daemons")
            .await
    }

    pub async fn create_daemon(&self, server_id: u64, options: &DaemonOptions) -> ForgeResult<Daemon> {
        let path = format!("/servers/{server_id}/daemons");
        self.post_field(&path, options, "daemon").await
    }

    pub async fn restart_daemon(&self, server_id: u64, daemon_id: u64) -> ForgeResult<()> {
        let path = format!("/servers/{server_id}/daemons/{daemon_id}/restart");
        self.execute(Method::POST, &path, None).await
    }

    pub async fn delete_daemon(&self, server_id: u64, daemon_id: u64) -> ForgeResult<()> {
        let path = format!("/servers/{server_id}/daemons/{daemon_id}");
        self.execute(Method::DELETE, &path, None).await
    }

    // ── Firewall ───────────────────────────────────────────────────────────

    pub async fn list_firewall_rules(&self, server_id: u64) -> ForgeResult<Vec<FirewallRule>> {
        self.get_field(&format!("/servers/{server_id}/firewall-rules"), "rules")
            .await
    }

    pub async fn create_firewall_rule(&self, server_id: u64, name: &str, port: u16) -> ForgeResult<FirewallRule> {
        let path = format!("/servers/{server_id}/firewall-rules");
        let body = json!({ "name": name, "port": port, "type": "allow" });
        self.post_field(&path, &body, "rule").await
    }

    pub async fn delete_firewall_rule(&self, server_id: u64, rule_id: u64) -> ForgeResult<()> {
        let path = format!("/servers/{server_id}/firewall-rules/{rule_id}");
        self.execute(Method::DELETE, &path, None).await
    }

    // ── Scheduled jobs & backups ───────────────────────────────────────────

    pub async fn list_jobs(&self, server_id: u64) -> ForgeResult<Vec<ScheduledJob>> {
        self.get_field(&format!("/servers/{server_id}/jobs"), "jobs")
            .await
    }

    pub async fn list_backup_configs(&self, server_id: u64) -> ForgeResult<Vec<BackupConfig>> {
        self.get_field(&format!("/servers/{server_id}/backup-configs"), "backups")
            .await
    }

    // ── SSH keys ───────────────────────────────────────────────────────────

    pub async fn list_ssh_keys(&self, server_id: u64) -> ForgeResult<Vec<SshKey>> {
        self.get_field(&format!("/servers/{server_id}/keys"), "keys")
            .await
    }

    pub async fn create_ssh_key(
        &self,
        server_id: u64,
        name: &str,
        key: &str,
        username: &str,
    ) -> ForgeResult<SshKey> {
        let path = format!("/servers/{server_id}/keys");
        let body = json!({ "name": name, "key": key, "username": username });
        self.post_field(&path, &body, "key").await
    }

    pub async fn delete_ssh_key(&self, server_id: u64, key_id: u64) -> ForgeResult<()> {
        let path = format!("/servers/{server_id}/keys/{key_id}");
        self.execute(Method::DELETE, &path, None).await
    }

    // ── Site commands & logs ───────────────────────────────────────────────

    pub async fn list_commands(&self, server_id: u64, site_id: u64) -> ForgeResult<Vec<SiteCommand>> {
        let path = format!("/servers/{server_id}/sites/{site_id}/commands");
        self.get_field(&path, "commands").await
    }

    pub async fn run_command(&self, server_id: u64, site_id: u64, command: &str) -> ForgeResult<SiteCommand> {
        let path = format!("/servers/{server_id}/sites/{site_id}/commands");
        self.post_field(&path, &json!({ "command": command }), "command")
            .await
    }

    pub async fn get_command(&self, server_id: u64, site_id: u64, command_id: u64) -> ForgeResult<SiteCommand> {
        let path = format!("/servers/{server_id}/sites/{site_id}/commands/{command_id}");
        self.get_field(&path, "command").await
    }

    pub async fn site_log(&self, server_id: u64, site_id: u64) -> ForgeResult<String> {
        let path = format!("/servers/{server_id}/sites/{site_id}/logs");
        self.get_field(&path, "content").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ForgeClient {
        ForgeClient::new(server.uri(), "test-token").unwrap()
    }

    #[tokio::test]
    async fn test_list_servers_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "servers": [{"id": 1, "name": "web-1", "ip_address": "10.0.0.1"}]
            })))
            .mount(&server)
            .await;

        let servers = client_for(&server).await.list_servers().await.unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].name, "web-1");
        assert_eq!(servers[0].ip(), "10.0.0.1");
    }

    #[tokio::test]
    async fn test_environment_is_fetched_as_plain_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers/1/sites/2/env"))
            .and(header("accept", "text/plain"))
            .respond_with(ResponseTemplate::new(200).set_body_string("APP_ENV=production\n"))
            .mount(&server)
            .await;

        let env = client_for(&server).await.environment(1, 2).await.unwrap();
        assert_eq!(env, "APP_ENV=production\n");
    }

    #[tokio::test]
    async fn test_create_database_posts_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/servers/3/databases"))
            .and(body_json(json!({"name": "shop"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "database": {"id": 9, "name": "shop", "status": "installing"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let db = client_for(&server).await.create_database(3, "shop").await.unwrap();
        assert_eq!(db.id, 9);
        assert_eq!(db.status.as_deref(), Some("installing"));
    }

    #[tokio::test]
    async fn test_validation_error_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/servers/3/firewall-rules"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "The given data was invalid.",
                "errors": {"port": ["The port must be an integer."]}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .create_firewall_rule(3, "web", 80)
            .await
            .unwrap_err();
        match err {
            ForgeError::Validation { fields, .. } => {
                assert_eq!(fields["port"], vec!["The port must be an integer.".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_is_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthenticated."})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.list_servers().await.unwrap_err();
        assert_eq!(
            err,
            ForgeError::Authentication {
                message: "Unauthenticated.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_wrapper_field_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers/4/jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": []})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.list_jobs(4).await.unwrap_err();
        assert!(matches!(err, ForgeError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_update_aliases_puts_full_set() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/servers/1/sites/2/aliases"))
            .and(body_json(json!({"aliases": ["www.example.com"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "site": {"id": 2, "name": "example.com", "aliases": ["www.example.com"]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let site = client_for(&server)
            .await
            .update_aliases(1, 2, &["www.example.com".to_string()])
            .await
            .unwrap();
        assert_eq!(site.aliases, vec!["www.example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_ignores_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/servers/1/keys/5"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).await.delete_ssh_key(1, 5).await.unwrap();
    }

    #[tokio::test]
    async fn test_backup_configs_are_listed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers/1/backup-configs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "backups": [{"id": 1, "provider": "s3", "frequency": "daily", "databases": [3]}]
            })))
            .mount(&server)
            .await;

        let configs = client_for(&server).await.list_backup_configs(1).await.unwrap();
        assert_eq!(configs[0].provider.as_deref(), Some("s3"));
    }

    #[tokio::test]
    async fn test_single_server_and_site_unwrap_their_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "server": {"id": 1, "name": "web-1", "is_ready": true}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/servers/1/sites/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "site": {"id": 2, "server_id": 1, "name": "example.com"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.get_server(1).await.unwrap().name, "web-1");
        assert_eq!(client.get_site(1, 2).await.unwrap().name, "example.com");
    }

    #[tokio::test]
    async fn test_get_user_rejects_bad_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {"id": 3, "name": "Taylor", "email": "taylor@example.com"}
            })))
            .mount(&server)
            .await;

        let user = client_for(&server).await.get_user().await.unwrap();
        assert_eq!(user.name, "Taylor");

        let other = ForgeClient::new(server.uri(), "wrong").unwrap();
        assert!(other.get_user().await.is_err());
    }
}
