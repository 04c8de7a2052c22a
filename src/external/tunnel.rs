//! Local port-forward to a remote database over SSH.

use std::io;
use std::net::{Ipv4Addr, TcpListener};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use thiserror::Error;

/// Fixed wait before assuming the tunnel accepts connections. `ssh -N`
/// gives no readiness signal, so this is a heuristic and can lose the race
/// on a slow link.
pub const READINESS_DELAY: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum TunnelError {
    #[error("Failed to find free port: {0}")]
    PortAllocation(#[source] io::Error),

    #[error("Failed to start SSH tunnel: {0}")]
    Spawn(#[source] io::Error),
}

/// Ask the OS for an unused local TCP port. The listener is dropped before
/// returning so the port is free for the tunnel to bind.
pub fn find_free_port() -> io::Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelRequest {
    pub ssh_user: String,
    pub ssh_host: String,
    pub ssh_port: u16,
    pub remote_host: String,
    pub remote_port: u16,
}

impl TunnelRequest {
    pub fn args(&self, local_port: u16) -> Vec<String> {
        let mut args = vec![
            "-L".to_string(),
            format!("{}:{}:{}", local_port, self.remote_host, self.remote_port),
            "-N".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            "ExitOnForwardFailure=yes".to_string(),
        ];
        if self.ssh_port != 22 {
            args.push("-p".to_string());
            args.push(self.ssh_port.to_string());
        }
        args.push(format!("{}@{}", self.ssh_user, self.ssh_host));
        args
    }
}

fn spawn_ssh(request: &TunnelRequest, local_port: u16) -> io::Result<Child> {
    Command::new("ssh")
        .args(request.args(local_port))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}

/// Owns the background `ssh -L` process. Killing is idempotent and also
/// happens on drop, so a session that quits mid-flow never leaks it.
#[derive(Debug)]
pub struct TunnelHandle {
    child: Option<Child>,
    local_port: u16,
}

impl TunnelHandle {
    pub fn new(child: Child, local_port: u16) -> Self {
        Self {
            child: Some(child),
            local_port,
        }
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    pub fn is_alive(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    pub fn shutdown(&mut self) {
        if let Some(mut child) = self.child.take() {
            let pid = child.id();
            // An already-exited child reports an error here; that is fine.
            let _ = child.kill();
            let _ = child.wait();
            tracing::info!("SSH tunnel (pid {}) on port {} stopped", pid, self.local_port);
        }
    }
}

impl Drop for TunnelHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Allocate a port and start the tunnel with injectable steps.
pub fn open_with<F, S>(request: &TunnelRequest, find_port: F, spawn: S) -> Result<TunnelHandle, TunnelError>
where
    F: FnOnce() -> io::Result<u16>,
    S: FnOnce(&TunnelRequest, u16) -> io::Result<Child>,
{
    let local_port = find_port().map_err(TunnelError::PortAllocation)?;
    let child = spawn(request, local_port).map_err(TunnelError::Spawn)?;
    tracing::info!(
        "SSH tunnel (pid {}) 127.0.0.1:{} -> {}:{} via {}",
        child.id(),
        local_port,
        request.remote_host,
        request.remote_port,
        request.ssh_host
    );
    Ok(TunnelHandle::new(child, local_port))
}

/// Start the tunnel and wait out the readiness delay.
pub async fn open(request: TunnelRequest) -> Result<TunnelHandle, TunnelError> {
    let handle = open_with(&request, find_free_port, spawn_ssh)?;
    tokio::time::sleep(READINESS_DELAY).await;
    Ok(handle)
}
