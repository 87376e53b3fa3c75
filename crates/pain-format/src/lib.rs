//! Format-on-demand for Pain documents.
//!
//! The handler materialises the document text in a reserved temporary file
//! beside the source, invokes the external compiler's formatter over it, and
//! returns the result as a single whole-document replacement edit. Formatter
//! diagnostics on stderr accompany a successful run as a warning; a failing
//! run leaves the document untouched. The temporary file is removed on every
//! exit path.

mod edit;
mod invoker;
mod temp;

pub use edit::whole_document_edit;
pub use invoker::{FormatterInvoker, FormatterOutput, ProcessFormatterInvoker};
pub use temp::{FORMAT_TEMP_FILE_NAME, TempFormatFile};

use std::io;
use std::path::{Path, PathBuf};

use lsp_types::TextEdit;
use thiserror::Error;
use tracing::{debug, warn};

use pain_lsp_host::Document;

/// Log target for format operations.
pub(crate) const FORMAT_TARGET: &str = "pain_format";

/// Outcome of a format request.
#[derive(Debug)]
pub enum FormatOutcome {
    /// The formatter succeeded; `edit` replaces the full document text.
    Applied {
        /// Whole-document replacement edit.
        edit: TextEdit,
        /// Diagnostics the formatter wrote to stderr, when any.
        warning: Option<String>,
    },
    /// The document is out of scope for the Pain formatter; nothing ran.
    NotApplicable,
}

/// Errors raised by the format command.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Writing the formatter's temporary input file failed.
    #[error("failed to write formatter input '{}': {source}", path.display())]
    TempWrite {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The compiler binary was not found on disk or `PATH`.
    #[error("formatter binary not found: {command}")]
    CompilerNotFound {
        /// The command that was not found.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Spawning the compiler failed for another reason.
    #[error("{message}")]
    Spawn {
        /// Description of the spawn failure.
        message: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The formatter exited unsuccessfully.
    #[error("formatter exited with status {status}: {stderr}")]
    Failed {
        /// Exit status, or -1 when terminated by a signal.
        status: i32,
        /// Diagnostics the formatter wrote to stderr.
        stderr: String,
    },
}

/// Formats `document` with the compiler at `compiler`.
///
/// # Errors
///
/// Returns [`FormatError`] when the temporary file cannot be written or the
/// formatter fails; the document is never modified in those cases.
pub fn format_document(document: &Document, compiler: &Path) -> Result<FormatOutcome, FormatError> {
    format_document_with(document, compiler, &ProcessFormatterInvoker)
}

/// Formats `document` through an injected invoker.
///
/// Out-of-scope documents short-circuit to [`FormatOutcome::NotApplicable`]
/// before any filesystem or process work happens.
///
/// # Errors
///
/// Returns [`FormatError`] when the temporary file cannot be written or the
/// invoker reports a failure.
pub fn format_document_with<I>(
    document: &Document,
    compiler: &Path,
    invoker: &I,
) -> Result<FormatOutcome, FormatError>
where
    I: FormatterInvoker,
{
    if !document.is_pain() {
        debug!(
            target: FORMAT_TARGET,
            language = document.language_id(),
            "ignoring format request for out-of-scope document"
        );
        return Ok(FormatOutcome::NotApplicable);
    }

    let temp = TempFormatFile::create(document.path(), document.text())?;
    let output = invoker.format(compiler, temp.path())?;

    let warning = if output.stderr.is_empty() {
        None
    } else {
        Some(output.stderr)
    };
    if let Some(warning) = &warning {
        warn!(target: FORMAT_TARGET, warning = %warning, "formatter reported warnings");
    }

    Ok(FormatOutcome::Applied {
        edit: whole_document_edit(document.text(), output.stdout),
        warning,
    })
}
