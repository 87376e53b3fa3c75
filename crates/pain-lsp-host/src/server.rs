//! Abstractions over concrete language server sessions.

use std::error::Error;
use std::fmt;

use lsp_types::{
    DidChangeTextDocumentParams, DidChangeWatchedFilesParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams,
};
use thiserror::Error;

/// Identity advertised by the server during the `initialize` handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    /// Server name, when reported.
    pub name: Option<String>,
    /// Server version, when reported.
    pub version: Option<String>,
}

/// Errors reported by language server sessions.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session requires an open workspace and none is available.
    ///
    /// This class is expected during startup when no project folder is open;
    /// the lifecycle suppresses it in that case instead of surfacing it.
    #[error("no workspace is open")]
    MissingWorkspace,

    /// Any other session failure.
    #[error("{message}")]
    Failed {
        /// Human-friendly description of the failure.
        message: String,
        /// Underlying cause, when one exists.
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
}

impl SessionError {
    /// Builds a failure without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a failure that wraps an underlying source.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self::Failed {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Behaviour required from concrete language server sessions.
///
/// The stdio adapter is the production implementation; tests substitute
/// recording or failing sessions to exercise the lifecycle without spawning
/// processes.
pub trait LanguageServer: Send {
    /// Runs the server handshake and returns the advertised identity.
    fn initialize(&mut self) -> Result<ServerInfo, SessionError>;

    /// Notifies the server that a document has been opened.
    fn did_open(&mut self, params: DidOpenTextDocumentParams) -> Result<(), SessionError>;

    /// Notifies the server that a document has changed.
    fn did_change(&mut self, params: DidChangeTextDocumentParams) -> Result<(), SessionError>;

    /// Notifies the server that a document has been closed.
    fn did_close(&mut self, params: DidCloseTextDocumentParams) -> Result<(), SessionError>;

    /// Forwards watched-file events to the server.
    fn did_change_watched_files(
        &mut self,
        params: DidChangeWatchedFilesParams,
    ) -> Result<(), SessionError>;

    /// Requests a graceful shutdown of the session.
    fn shutdown(&mut self) -> Result<(), SessionError>;
}

impl fmt::Debug for dyn LanguageServer {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("LanguageServer")
    }
}
