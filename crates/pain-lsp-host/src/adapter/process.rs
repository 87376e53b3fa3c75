//! The spawned-process language server session.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::config::{LaunchMode, LaunchProfiles, ServerConfig};
use super::error::AdapterError;
use super::lifecycle::{ADAPTER_TARGET, terminate_child};
use super::messaging;
use super::state::ProcessState;
use super::transport::ProcessTransport;
use super::transport::StdioTransport;

/// A language server session backed by a spawned `pain-lsp` process.
///
/// The session speaks JSON-RPC 2.0 over the child's stdin/stdout with LSP
/// header framing. State moves from [`ProcessState::NotStarted`] through
/// [`ProcessState::Running`] to [`ProcessState::Stopped`]; requests against
/// a non-running process fail with [`AdapterError::ProcessExited`].
pub struct StdioLanguageServer {
    profiles: LaunchProfiles,
    mode: LaunchMode,
    workspace_root: Option<PathBuf>,
    state: Mutex<ProcessState>,
}

impl StdioLanguageServer {
    /// Creates a session for the given launch profiles.
    #[must_use]
    pub fn new(profiles: LaunchProfiles, workspace_root: Option<PathBuf>) -> Self {
        Self {
            profiles,
            mode: LaunchMode::Run,
            workspace_root,
            state: Mutex::new(ProcessState::NotStarted),
        }
    }

    /// Selects the launch profile the session spawns with.
    #[must_use]
    pub fn with_mode(mut self, mode: LaunchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Workspace root the session was scoped to, when one is open.
    #[must_use]
    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace_root.as_deref()
    }

    /// Launch configuration for the active mode.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        self.profiles.profile(self.mode)
    }

    /// Spawns the server process and captures its stdio pipes.
    pub(super) fn spawn_process(&self) -> Result<(Child, ProcessTransport), AdapterError> {
        let config = self.config();

        debug!(
            target: ADAPTER_TARGET,
            command = %config.command.display(),
            args = ?config.args,
            "spawning language server process"
        );

        let mut command = Command::new(&config.command);
        command
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        if let Some(dir) = &config.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|error| {
            if error.kind() == std::io::ErrorKind::NotFound {
                AdapterError::BinaryNotFound {
                    command: config.command.display().to_string(),
                    source: error,
                }
            } else {
                AdapterError::SpawnFailed {
                    message: format!("failed to start {}", config.command.display()),
                    source: error,
                }
            }
        })?;

        let stdin = child.stdin.take().ok_or_else(|| AdapterError::SpawnFailed {
            message: "failed to capture stdin".to_owned(),
            source: std::io::Error::other("no stdin"),
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AdapterError::SpawnFailed {
                message: "failed to capture stdout".to_owned(),
                source: std::io::Error::other("no stdout"),
            })?;

        let transport = StdioTransport::new(stdout, stdin);

        debug!(
            target: ADAPTER_TARGET,
            pid = child.id(),
            "language server process spawned"
        );

        Ok((child, transport))
    }

    /// Records the running child and its transport.
    pub(super) fn set_running_state(&self, child: Child, transport: ProcessTransport) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());

        *state = ProcessState::Running { child, transport };
    }

    /// Runs `f` against the live transport with the state lock held.
    pub(super) fn with_running_transport<F, T>(&self, f: F) -> Result<T, AdapterError>
    where
        F: FnOnce(&mut ProcessTransport) -> Result<T, AdapterError>,
    {
        // Recover from poisoning so shutdown still works after a panic.
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());

        let transport = match &mut *state {
            ProcessState::Running { transport, .. } => transport,
            ProcessState::NotStarted | ProcessState::Stopped => {
                return Err(AdapterError::ProcessExited);
            }
        };

        f(transport)
    }

    /// Sends a request and deserialises the response payload.
    pub(super) fn send_request<P, T>(&self, method: &str, params: P) -> Result<T, AdapterError>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        self.with_running_transport(|transport| messaging::send_request(transport, method, params))
    }

    /// Sends a notification (no response expected).
    pub(super) fn send_notification<P>(
        &self,
        method: &str,
        params: Option<P>,
    ) -> Result<(), AdapterError>
    where
        P: Serialize,
    {
        self.with_running_transport(|transport| {
            messaging::send_notification(transport, method, params)
        })
    }

    /// Requests a graceful exit and reaps the child.
    ///
    /// A failed `shutdown` request or `exit` notification is logged and does
    /// not prevent the child from being terminated.
    pub(super) fn stop_process(&self) {
        debug!(target: ADAPTER_TARGET, "initiating graceful shutdown");

        if let Err(error) = self.send_request::<_, serde_json::Value>("shutdown", ()) {
            debug!(
                target: ADAPTER_TARGET,
                error = ?error,
                "shutdown request failed"
            );
        }

        if let Err(error) = self.send_notification::<()>("exit", None) {
            debug!(
                target: ADAPTER_TARGET,
                error = ?error,
                "exit notification failed"
            );
        }

        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());

        if let ProcessState::Running { mut child, .. } =
            std::mem::replace(&mut *state, ProcessState::Stopped)
        {
            terminate_child(&mut child);
        }
    }
}

impl Drop for StdioLanguageServer {
    fn drop(&mut self) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());

        if let ProcessState::Running { mut child, .. } =
            std::mem::replace(&mut *state, ProcessState::Stopped)
        {
            if let Err(error) = child.kill() {
                warn!(
                    target: ADAPTER_TARGET,
                    error = %error,
                    "failed to kill language server process on drop"
                );
            } else {
                let _ = child.wait();
            }
        }
    }
}

impl std::fmt::Debug for StdioLanguageServer {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state.lock() {
            Ok(guard) => match &*guard {
                ProcessState::NotStarted => "not_started".to_owned(),
                ProcessState::Running { child, .. } => format!("running (pid: {})", child.id()),
                ProcessState::Stopped => "stopped".to_owned(),
            },
            Err(_) => "poisoned".to_owned(),
        };

        formatter
            .debug_struct("StdioLanguageServer")
            .field("command", &self.config().command)
            .field("mode", &self.mode)
            .field("state", &state)
            .finish()
    }
}
