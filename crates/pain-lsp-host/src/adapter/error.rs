//! Failure taxonomy for the process adapter.

use std::io;

use thiserror::Error;

use super::jsonrpc::JsonRpcError;

/// Errors raised during language server process management.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The server binary was not found on disk or `PATH`.
    #[error("language server binary not found: {command}")]
    BinaryNotFound {
        /// The command that was not found.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Spawning the server process failed for another reason.
    #[error("failed to spawn language server process: {message}")]
    SpawnFailed {
        /// Description of the spawn failure.
        message: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Transport-level I/O failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// JSON encoding or decoding failure.
    #[error("JSON codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The server answered a request with an error.
    #[error("server returned error: {message} (code: {code})")]
    ServerError {
        /// The JSON-RPC error code.
        code: i64,
        /// The error message from the server.
        message: String,
    },

    /// The handshake produced an unusable result.
    #[error("initialization failed: {message}")]
    InitializationFailed {
        /// Description of the handshake failure.
        message: String,
    },

    /// The process is not running.
    #[error("language server process is not running")]
    ProcessExited,

    /// No matching response arrived within the bounded read loop.
    #[error("gave up waiting for a response to request {request_id}")]
    MaxResponseIterations {
        /// The request whose response never arrived.
        request_id: i64,
    },
}

impl AdapterError {
    /// Lifts a JSON-RPC error object into the adapter taxonomy.
    #[must_use]
    pub fn from_jsonrpc(error: JsonRpcError) -> Self {
        Self::ServerError {
            code: error.code,
            message: error.message,
        }
    }
}

/// Transport-layer errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O failure during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The message headers carried no `Content-Length`.
    #[error("missing Content-Length header")]
    MissingContentLength,

    /// A header line could not be parsed.
    #[error("invalid header format")]
    InvalidHeader,
}
