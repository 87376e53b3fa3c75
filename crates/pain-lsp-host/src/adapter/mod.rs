//! Process-based adapter for the `pain-lsp` server.
//!
//! The adapter spawns the resolved server executable and speaks JSON-RPC 2.0
//! with LSP header framing over the child's stdin and stdout. Components:
//!
//! - [`ServerConfig`] and [`LaunchProfiles`]: how the server is spawned; the
//!   run and debug profiles are configured identically.
//! - [`AdapterError`] and [`TransportError`]: adapter failure taxonomy.
//! - [`JsonRpcRequest`], [`JsonRpcResponse`], [`JsonRpcMessage`]: message
//!   encoding, decoding, and classification.
//! - [`StdioTransport`]: `Content-Length` framed stdio transport.
//! - [`StdioLanguageServer`]: the [`LanguageServer`](crate::LanguageServer)
//!   implementation the lifecycle drives.

mod config;
mod error;
mod jsonrpc;
mod lifecycle;
mod messaging;
mod process;
mod state;
mod trait_impl;
mod transport;

pub use config::{LaunchMode, LaunchProfiles, ServerConfig};
pub use error::{AdapterError, TransportError};
pub use jsonrpc::{
    JsonRpcError, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    JsonRpcServerRequest,
};
pub use process::StdioLanguageServer;
pub use state::ProcessState;
pub use transport::{ProcessTransport, StdioTransport};
