//! Extension lifecycle: activation, the format command, and deactivation.
//!
//! [`Extension`] owns the single session handle for the process lifetime.
//! Activation locates the server, starts the session on a background thread
//! (fire and forget), and attaches the workspace watcher when a workspace is
//! open. Startup failures surface as non-fatal, user-visible warnings; the
//! expected no-workspace failure class is suppressed. Deactivation hands the
//! caller a pending completion signal instead of blocking.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use lsp_types::{
    DidChangeTextDocumentParams, DidChangeWatchedFilesParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, TextDocumentContentChangeEvent, TextDocumentIdentifier,
    TextDocumentItem, VersionedTextDocumentIdentifier,
};
use tracing::{debug, warn};

use pain_editor_config::Config;
use pain_format::{FormatError, FormatOutcome};
use pain_lsp_host::adapter::{LaunchProfiles, ServerConfig, StdioLanguageServer};
use pain_lsp_host::{
    Document, LanguageServer, SessionError, ToolKind, WatchError, WorkspaceWatcher, locate,
};

/// Log target for lifecycle operations.
const LIFECYCLE_TARGET: &str = "pain_editor::extension";

/// Lifecycle states of the language server session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been created yet.
    Uninitialized,
    /// The session is starting in the background.
    Starting,
    /// The handshake succeeded; the session is live.
    Running,
    /// Startup failed; the extension continues in degraded mode.
    Failed,
    /// The session has stopped.
    Stopped,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        };
        formatter.write_str(label)
    }
}

/// Sink for user-visible notifications raised by the lifecycle.
pub trait Notifier: Send + Sync {
    /// Shows a non-fatal warning to the user.
    fn warn(&self, message: &str);
}

/// Notifier that forwards to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn warn(&self, message: &str) {
        warn!(target: LIFECYCLE_TARGET, "{message}");
    }
}

type SharedServer = Arc<Mutex<Box<dyn LanguageServer>>>;
type SharedState = Arc<Mutex<SessionState>>;

/// The editor integration's lifecycle object.
///
/// Owns the configuration, the optional workspace root, and the single
/// session handle; there are never concurrent sessions.
pub struct Extension {
    config: Config,
    workspace_root: Option<PathBuf>,
    notifier: Arc<dyn Notifier>,
    session: Option<SessionHandle>,
    session_state: Option<SharedState>,
}

impl Extension {
    /// Builds an inactive extension.
    #[must_use]
    pub fn new(config: Config, workspace_root: Option<PathBuf>) -> Self {
        Self::with_notifier(config, workspace_root, Arc::new(TracingNotifier))
    }

    /// Builds an inactive extension with a custom notification sink.
    #[must_use]
    pub fn with_notifier(
        config: Config,
        workspace_root: Option<PathBuf>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            workspace_root,
            notifier,
            session: None,
            session_state: None,
        }
    }

    /// Workspace root the host has open, when any.
    #[must_use]
    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace_root.as_deref()
    }

    /// Current state of the session.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
            .as_ref()
            .map_or(SessionState::Uninitialized, |state| *lock(state))
    }

    /// Activates the extension against the resolved `pain-lsp` executable.
    ///
    /// Startup continues in the background; activation itself never fails.
    /// Repeated activation is a no-op while a session exists.
    pub fn activate(&mut self) {
        if self.session.is_some() {
            return;
        }

        let command = locate(
            ToolKind::LanguageServer,
            self.workspace_root.as_deref(),
            self.config.lsp_path(),
        );
        let profiles = LaunchProfiles::identical(ServerConfig::new(command));
        let server = StdioLanguageServer::new(profiles, self.workspace_root.clone());
        self.activate_with(Box::new(server));
    }

    /// Activates the extension with an injected session.
    ///
    /// This is the seam the tests use to drive the lifecycle without
    /// spawning processes.
    pub fn activate_with(&mut self, server: Box<dyn LanguageServer>) {
        if self.session.is_some() {
            return;
        }

        let handle = SessionHandle::start(
            server,
            self.workspace_root.clone(),
            Arc::clone(&self.notifier),
        );
        self.session_state = Some(Arc::clone(&handle.state));
        self.session = Some(handle);
    }

    /// Runs the format command against `document`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the formatter run fails; the document is
    /// never modified in that case.
    pub fn format_document(&self, document: &Document) -> Result<FormatOutcome, FormatError> {
        let compiler = locate(
            ToolKind::Formatter,
            self.workspace_root.as_deref(),
            self.config.compiler_path(),
        );
        pain_format::format_document(document, &compiler)
    }

    /// Forwards a document-open event to the running session.
    ///
    /// Events for documents outside the Pain language scope are dropped, as
    /// are events while no session is running.
    pub fn document_opened(&self, document: &Document) {
        let Some((session, uri)) = self.document_event_target(document) else {
            return;
        };
        let params = DidOpenTextDocumentParams {
            text_document: TextDocumentItem {
                uri,
                language_id: document.language_id().to_owned(),
                version: 1,
                text: document.text().to_owned(),
            },
        };
        log_forward_error(lock(&session.server).did_open(params));
    }

    /// Forwards a full-text document change to the running session.
    ///
    /// `version` is the host's document version for the new content.
    pub fn document_changed(&self, document: &Document, version: i32) {
        let Some((session, uri)) = self.document_event_target(document) else {
            return;
        };
        let params = DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier { uri, version },
            content_changes: vec![TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: document.text().to_owned(),
            }],
        };
        log_forward_error(lock(&session.server).did_change(params));
    }

    /// Forwards a document-close event to the running session.
    pub fn document_closed(&self, document: &Document) {
        let Some((session, uri)) = self.document_event_target(document) else {
            return;
        };
        let params = DidCloseTextDocumentParams {
            text_document: TextDocumentIdentifier { uri },
        };
        log_forward_error(lock(&session.server).did_close(params));
    }

    /// Deactivates the extension.
    ///
    /// Returns `None` when no session was ever created; otherwise requests
    /// the session to stop and returns the pending completion signal so the
    /// host can await shutdown before unloading.
    pub fn deactivate(&mut self) -> Option<StopSignal> {
        let session = self.session.take()?;
        Some(session.stop())
    }

    /// Applies the language scope and session-state gate shared by the
    /// document notifications.
    fn document_event_target(&self, document: &Document) -> Option<(&SessionHandle, lsp_types::Uri)> {
        if !document.is_pain() {
            return None;
        }
        let session = self.session.as_ref()?;
        if *lock(&session.state) != SessionState::Running {
            return None;
        }

        match pain_lsp_host::path_to_file_uri(document.path()) {
            Ok(uri) => Some((session, uri)),
            Err(error) => {
                debug!(
                    target: LIFECYCLE_TARGET,
                    error = %error,
                    "dropping document event with unrepresentable path"
                );
                None
            }
        }
    }
}

/// Logs a failed document notification; forwarding trouble never surfaces.
fn log_forward_error(result: Result<(), SessionError>) {
    if let Err(error) = result {
        debug!(
            target: LIFECYCLE_TARGET,
            error = %error,
            "failed to forward document event"
        );
    }
}

/// Handle to the running (or starting) session.
struct SessionHandle {
    server: SharedServer,
    state: SharedState,
    watcher: Arc<Mutex<Option<WorkspaceWatcher>>>,
    starter: Option<JoinHandle<()>>,
}

impl SessionHandle {
    fn start(
        server: Box<dyn LanguageServer>,
        workspace_root: Option<PathBuf>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let server: SharedServer = Arc::new(Mutex::new(server));
        let state: SharedState = Arc::new(Mutex::new(SessionState::Starting));
        let watcher = Arc::new(Mutex::new(None));

        let starter = thread::spawn({
            let server = Arc::clone(&server);
            let state = Arc::clone(&state);
            let watcher = Arc::clone(&watcher);
            move || start_session(&server, &state, &watcher, workspace_root, &notifier)
        });

        Self {
            server,
            state,
            watcher,
            starter: Some(starter),
        }
    }

    fn stop(mut self) -> StopSignal {
        let starter = self.starter.take();
        let server = Arc::clone(&self.server);
        let state = Arc::clone(&self.state);
        let watcher = Arc::clone(&self.watcher);

        let worker = thread::spawn(move || {
            // Let a still-running startup settle before tearing down.
            if let Some(starter) = starter {
                let _ = starter.join();
            }

            lock(&watcher).take();

            if let Err(error) = lock(&server).shutdown() {
                debug!(
                    target: LIFECYCLE_TARGET,
                    error = %error,
                    "session shutdown reported an error"
                );
            }
            *lock(&state) = SessionState::Stopped;
        });

        StopSignal {
            worker: Some(worker),
        }
    }
}

/// Pending completion signal returned by deactivation.
///
/// The signal resolves once the session reports stopped; dropping it without
/// waiting leaves shutdown to finish in the background.
#[derive(Debug)]
pub struct StopSignal {
    worker: Option<JoinHandle<()>>,
}

impl StopSignal {
    /// Blocks until the session has stopped.
    pub fn wait(mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!(target: LIFECYCLE_TARGET, "session shutdown worker panicked");
            }
        }
    }
}

fn start_session(
    server: &SharedServer,
    state: &SharedState,
    watcher: &Arc<Mutex<Option<WorkspaceWatcher>>>,
    workspace_root: Option<PathBuf>,
    notifier: &Arc<dyn Notifier>,
) {
    let result = lock(server).initialize();

    match result {
        Ok(info) => {
            *lock(state) = SessionState::Running;
            debug!(
                target: LIFECYCLE_TARGET,
                name = ?info.name,
                version = ?info.version,
                "language server session is running"
            );

            if let Some(root) = workspace_root {
                match attach_watcher(&root, server, state) {
                    Ok(attached) => {
                        *lock(watcher) = Some(attached);
                    }
                    Err(error) => {
                        notifier.warn(&format!("failed to watch workspace files: {error}"));
                    }
                }
            }
        }
        Err(error) => {
            *lock(state) = SessionState::Failed;
            report_start_failure(&error, workspace_root.is_some(), notifier.as_ref());
        }
    }
}

/// Reports a startup failure, honouring the no-workspace suppression rule.
fn report_start_failure(error: &SessionError, workspace_open: bool, notifier: &dyn Notifier) {
    if matches!(error, SessionError::MissingWorkspace) && !workspace_open {
        // Expected when no project folder is open; stay quiet.
        debug!(
            target: LIFECYCLE_TARGET,
            "suppressing expected no-workspace startup failure"
        );
        return;
    }

    notifier.warn(&format!(
        "failed to start the pain language server: {error}"
    ));
}

fn attach_watcher(
    root: &Path,
    server: &SharedServer,
    state: &SharedState,
) -> Result<WorkspaceWatcher, WatchError> {
    let server = Arc::clone(server);
    let state = Arc::clone(state);

    WorkspaceWatcher::spawn(root, move |changes| {
        if *lock(&state) != SessionState::Running {
            return;
        }
        let params = DidChangeWatchedFilesParams { changes };
        if let Err(error) = lock(&server).did_change_watched_files(params) {
            debug!(
                target: LIFECYCLE_TARGET,
                error = %error,
                "failed to forward watched file events"
            );
        }
    })
}

/// Locks a mutex, recovering from poisoning so teardown keeps working after
/// a panic.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
