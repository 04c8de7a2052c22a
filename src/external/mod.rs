//! Child processes that take over the terminal: interactive SSH, the file
//! browser, the database client behind an SSH tunnel, and the editor.

mod env_file;
mod launch;
mod terminal;
pub mod tunnel;

pub use env_file::{parse_env, CredentialsError, DbCredentials, DbDriver};
pub use launch::{EditTarget, Launch, LaunchKind};
pub use terminal::{TerminalSuspendGuard, Tui};
pub use tunnel::{find_free_port, TunnelError, TunnelHandle, TunnelRequest};

use std::io::Write;

use crate::action::Action;

/// Lifecycle of a terminal-owning child.
///
/// `Idle -> Launching` when the session emits a launch command,
/// `-> Suspended` once the host loop has released the terminal,
/// `-> Resuming` when the child exits, `-> Idle` after the first redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExternalState {
    #[default]
    Idle,
    Launching(LaunchKind),
    Suspended(LaunchKind),
    Resuming(LaunchKind),
}

impl ExternalState {
    pub fn is_idle(self) -> bool {
        matches!(self, ExternalState::Idle)
    }
}

/// Run `launch` with the terminal suspended, blocking until the child exits,
/// and report the outcome as an action for the session.
pub fn run_foreground(terminal: &mut Tui, launch: &Launch) -> Action {
    let kind = launch.kind();
    tracing::info!("Launching {} ({})", kind.label(), launch.program());

    if let Launch::Editor { target, content, .. } = launch {
        let edited = edit_in_foreground(terminal, launch, target, content);
        return Action::EditorFinished {
            target: target.clone(),
            original: content.clone(),
            edited,
        };
    }

    let result = {
        match TerminalSuspendGuard::new(terminal) {
            Ok(_guard) => launch
                .command(None)
                .status()
                .map_err(|e| format!("Failed to start {}: {}", launch.program(), e))
                .and_then(|status| {
                    if status.success() {
                        Ok(())
                    } else {
                        Err(format!("{} exited with {}", launch.program(), status))
                    }
                }),
            Err(e) => Err(format!("Failed to suspend terminal: {e}")),
        }
    };

    match &result {
        Ok(()) => tracing::info!("{} exited", kind.label()),
        Err(e) => tracing::warn!("{} failed: {}", kind.label(), e),
    }
    Action::ExternalExited { kind, result }
}

fn edit_in_foreground(
    terminal: &mut Tui,
    launch: &Launch,
    target: &EditTarget,
    content: &str,
) -> Result<String, String> {
    let mut file = tempfile::Builder::new()
        .prefix("phorge-")
        .suffix(target.file_suffix())
        .tempfile()
        .map_err(|e| format!("Failed to create temp file: {e}"))?;
    file.write_all(content.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| format!("Failed to write temp file: {e}"))?;

    let status = {
        let _guard =
            TerminalSuspendGuard::new(terminal).map_err(|e| format!("Failed to suspend terminal: {e}"))?;
        launch
            .command(Some(file.path()))
            .status()
            .map_err(|e| format!("Failed to start editor {}: {}", launch.program(), e))?
    };
    if !status.success() {
        return Err(format!("Editor exited with {status}"));
    }

    std::fs::read_to_string(file.path()).map_err(|e| format!("Failed to read temp file: {e}"))
}
