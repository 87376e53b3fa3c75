//! Workspace watching for tracked Pain files.
//!
//! The watcher exists only while a workspace is open; without one the
//! synchronisation feature is omitted rather than erroring. Matching events
//! are translated to LSP [`FileEvent`]s for forwarding as
//! `workspace/didChangeWatchedFiles` notifications.

use std::path::{Path, PathBuf};

use glob::Pattern;
use lsp_types::{FileChangeType, FileEvent};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tracing::{debug, warn};

use crate::document::path_to_file_uri;

/// Log target for watcher operations.
const WATCH_TARGET: &str = "pain_lsp_host::watch";

/// Glob pattern for watched files.
///
/// As written this matches files literally named `.pain`, not files with a
/// `.pain` extension.
pub const WATCH_PATTERN: &str = "**/.pain";

/// Errors raised while setting up the workspace watcher.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The watch pattern failed to compile.
    #[error("invalid watch pattern '{pattern}': {source}")]
    Pattern {
        /// The rejected pattern.
        pattern: String,
        /// Underlying pattern error.
        #[source]
        source: glob::PatternError,
    },

    /// The filesystem watcher could not be created or attached.
    #[error("failed to watch '{}': {source}", path.display())]
    Watch {
        /// Path that could not be watched.
        path: PathBuf,
        /// Underlying watcher error.
        #[source]
        source: notify::Error,
    },
}

/// Recursive workspace watcher scoped to [`WATCH_PATTERN`].
///
/// Event delivery runs on the watcher's own background thread; dropping the
/// value detaches the watch and stops delivery.
pub struct WorkspaceWatcher {
    _watcher: RecommendedWatcher,
}

impl WorkspaceWatcher {
    /// Starts watching `root`, forwarding matching events to `on_events`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError`] when the pattern fails to compile or the
    /// operating system watch cannot be established.
    pub fn spawn<F>(root: &Path, mut on_events: F) -> Result<Self, WatchError>
    where
        F: FnMut(Vec<FileEvent>) + Send + 'static,
    {
        let pattern = Pattern::new(WATCH_PATTERN).map_err(|source| WatchError::Pattern {
            pattern: WATCH_PATTERN.to_owned(),
            source,
        })?;

        let mut watcher = notify::recommended_watcher(
            move |result: Result<notify::Event, notify::Error>| match result {
                Ok(event) => {
                    let Some(change) = change_type_for(&event.kind) else {
                        return;
                    };
                    let matching = matching_events(&pattern, &event.paths, change);
                    if !matching.is_empty() {
                        on_events(matching);
                    }
                }
                Err(error) => {
                    warn!(target: WATCH_TARGET, error = %error, "file watcher error");
                }
            },
        )
        .map_err(|source| WatchError::Watch {
            path: root.to_path_buf(),
            source,
        })?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|source| WatchError::Watch {
                path: root.to_path_buf(),
                source,
            })?;

        debug!(
            target: WATCH_TARGET,
            root = %root.display(),
            pattern = WATCH_PATTERN,
            "workspace watcher attached"
        );

        Ok(Self { _watcher: watcher })
    }
}

/// Maps a filesystem event kind to the LSP change type it reports.
fn change_type_for(kind: &EventKind) -> Option<FileChangeType> {
    match kind {
        EventKind::Create(_) => Some(FileChangeType::CREATED),
        EventKind::Modify(_) => Some(FileChangeType::CHANGED),
        EventKind::Remove(_) => Some(FileChangeType::DELETED),
        _ => None,
    }
}

/// Translates matching paths into LSP file events.
fn matching_events(pattern: &Pattern, paths: &[PathBuf], change: FileChangeType) -> Vec<FileEvent> {
    paths
        .iter()
        .filter(|path| pattern.matches_path(path))
        .filter_map(|path| match path_to_file_uri(path) {
            Ok(uri) => Some(FileEvent { uri, typ: change }),
            Err(error) => {
                warn!(target: WATCH_TARGET, error = %error, "skipping unrepresentable path");
                None
            }
        })
        .collect()
}
