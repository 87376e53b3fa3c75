//! Executable resolution for the external Pain tooling.
//!
//! Resolution order, applied identically to both binaries: explicit user
//! configuration, then workspace build artefacts (`target/debug` before
//! `target/release`), then the bare command name left to the operating
//! system's `PATH` search at spawn time.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Log target for locator operations.
const LOCATOR_TARGET: &str = "pain_lsp_host::locator";

/// External tools the editor integration launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// The `pain-lsp` language server.
    LanguageServer,
    /// The `pain-compiler` binary, which also hosts the formatter.
    Formatter,
}

impl ToolKind {
    /// Base name of the executable for this tool.
    #[must_use]
    pub fn binary_name(self) -> &'static str {
        match self {
            Self::LanguageServer => "pain-lsp",
            Self::Formatter => "pain-compiler",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::LanguageServer => "language server",
            Self::Formatter => "formatter",
        };
        formatter.write_str(label)
    }
}

/// Resolves the executable path for `tool`.
///
/// A non-empty configured override wins verbatim, with no existence check.
/// Otherwise the workspace build directories are probed, and when nothing
/// matches the bare binary name is returned for `PATH` resolution. The
/// function never fails; absence degrades to the bare-name fallback.
#[must_use]
pub fn locate(tool: ToolKind, workspace_root: Option<&Path>, configured: Option<&str>) -> PathBuf {
    if let Some(configured) = configured {
        let trimmed = configured.trim();
        if !trimmed.is_empty() {
            debug!(
                target: LOCATOR_TARGET,
                %tool,
                path = trimmed,
                "using configured executable override"
            );
            return PathBuf::from(trimmed);
        }
    }

    if let Some(root) = workspace_root {
        for candidate in build_candidates(root, tool.binary_name()) {
            if candidate.exists() {
                debug!(
                    target: LOCATOR_TARGET,
                    %tool,
                    path = %candidate.display(),
                    "found workspace build artefact"
                );
                return candidate;
            }
        }
    }

    debug!(
        target: LOCATOR_TARGET,
        %tool,
        name = tool.binary_name(),
        "falling back to PATH resolution"
    );
    PathBuf::from(tool.binary_name())
}

/// Candidate artefact locations under the workspace root, in probe order.
fn build_candidates(root: &Path, name: &str) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for profile in ["debug", "release"] {
        let base = root.join("target").join(profile);
        if cfg!(windows) {
            candidates.push(base.join(format!("{name}.exe")));
        }
        candidates.push(base.join(name));
    }
    candidates
}
