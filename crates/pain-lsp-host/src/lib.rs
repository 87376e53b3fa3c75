//! Client-side hosting for the Pain language server.
//!
//! The crate locates the external `pain-lsp` and `pain-compiler` binaries,
//! owns a JSON-RPC 2.0 session with the server over stdio, and watches open
//! workspaces for changes to tracked files. Server-specific details stay
//! behind the [`LanguageServer`] trait so the lifecycle layer and its tests
//! can inject lightweight sessions without spawning real processes.

pub mod adapter;
mod document;
mod locator;
mod server;
mod watch;

pub use document::{
    Document, PAIN_LANGUAGE_ID, UriConversionError, language_id_for_path, path_to_file_uri,
};
pub use locator::{ToolKind, locate};
pub use server::{LanguageServer, ServerInfo, SessionError};
pub use watch::{WATCH_PATTERN, WatchError, WorkspaceWatcher};
