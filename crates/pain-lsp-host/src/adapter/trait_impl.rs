//! [`LanguageServer`] implementation for [`StdioLanguageServer`].

use std::path::Path;

use lsp_types::{
    DidChangeTextDocumentParams, DidChangeWatchedFilesParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, InitializeResult,
};
use serde_json::{Value, json};
use tracing::debug;

use super::lifecycle::ADAPTER_TARGET;
use super::process::StdioLanguageServer;
use crate::document::path_to_file_uri;
use crate::server::{LanguageServer, ServerInfo, SessionError};

impl LanguageServer for StdioLanguageServer {
    fn initialize(&mut self) -> Result<ServerInfo, SessionError> {
        debug!(target: ADAPTER_TARGET, "initializing language server");

        let (child, transport) = self.spawn_process().map_err(|error| {
            SessionError::with_source("failed to spawn the pain language server", error)
        })?;
        self.set_running_state(child, transport);

        let params = initialize_params(self.workspace_root())?;
        let result: InitializeResult = self
            .send_request("initialize", params)
            .map_err(|error| SessionError::with_source("initialization handshake failed", error))?;

        self.send_notification("initialized", Some(json!({})))
            .map_err(|error| {
                SessionError::with_source("failed to send initialized notification", error)
            })?;

        let info = ServerInfo {
            name: result.server_info.as_ref().map(|info| info.name.clone()),
            version: result.server_info.and_then(|info| info.version),
        };

        debug!(
            target: ADAPTER_TARGET,
            name = ?info.name,
            version = ?info.version,
            "language server initialized"
        );

        Ok(info)
    }

    fn did_open(&mut self, params: DidOpenTextDocumentParams) -> Result<(), SessionError> {
        self.send_notification("textDocument/didOpen", Some(params))
            .map_err(|error| SessionError::with_source("didOpen notification failed", error))
    }

    fn did_change(&mut self, params: DidChangeTextDocumentParams) -> Result<(), SessionError> {
        self.send_notification("textDocument/didChange", Some(params))
            .map_err(|error| SessionError::with_source("didChange notification failed", error))
    }

    fn did_close(&mut self, params: DidCloseTextDocumentParams) -> Result<(), SessionError> {
        self.send_notification("textDocument/didClose", Some(params))
            .map_err(|error| SessionError::with_source("didClose notification failed", error))
    }

    fn did_change_watched_files(
        &mut self,
        params: DidChangeWatchedFilesParams,
    ) -> Result<(), SessionError> {
        self.send_notification("workspace/didChangeWatchedFiles", Some(params))
            .map_err(|error| {
                SessionError::with_source("didChangeWatchedFiles notification failed", error)
            })
    }

    fn shutdown(&mut self) -> Result<(), SessionError> {
        self.stop_process();
        Ok(())
    }
}

/// Builds the `initialize` request parameters.
///
/// The workspace root, when present, is advertised both as the root URI and
/// as a workspace folder; without one both fields are null, matching servers
/// that support single-file mode.
fn initialize_params(workspace_root: Option<&Path>) -> Result<Value, SessionError> {
    let capabilities = json!({
        "workspace": {
            "didChangeWatchedFiles": { "dynamicRegistration": false },
        },
        "textDocument": {
            "synchronization": {},
        },
    });

    match workspace_root {
        Some(root) => {
            let uri = path_to_file_uri(root).map_err(|error| {
                SessionError::with_source("failed to derive the workspace URI", error)
            })?;
            let name = root
                .file_name()
                .map_or_else(|| "workspace".to_owned(), |name| {
                    name.to_string_lossy().into_owned()
                });
            Ok(json!({
                "processId": std::process::id(),
                "rootUri": uri.as_str(),
                "workspaceFolders": [{ "uri": uri.as_str(), "name": name }],
                "capabilities": capabilities,
            }))
        }
        None => Ok(json!({
            "processId": std::process::id(),
            "rootUri": null,
            "workspaceFolders": null,
            "capabilities": capabilities,
        })),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn params_without_workspace_are_rootless() {
        let params = initialize_params(None).expect("params should build");

        assert!(params["rootUri"].is_null());
        assert!(params["workspaceFolders"].is_null());
        assert_eq!(
            params["capabilities"]["workspace"]["didChangeWatchedFiles"]["dynamicRegistration"],
            serde_json::json!(false)
        );
    }

    #[cfg(unix)]
    #[rstest]
    fn params_with_workspace_carry_the_root() {
        let params =
            initialize_params(Some(Path::new("/ws/pain-project"))).expect("params should build");

        assert_eq!(params["rootUri"], "file:///ws/pain-project");
        assert_eq!(params["workspaceFolders"][0]["name"], "pain-project");
        assert_eq!(params["workspaceFolders"][0]["uri"], "file:///ws/pain-project");
    }
}
