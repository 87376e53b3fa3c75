//! Scoped temporary file handed to the formatter.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{FORMAT_TARGET, FormatError};

/// Reserved file name used to hand the document text to the formatter.
///
/// The name is fixed rather than unique per invocation, so two concurrent
/// format runs over documents in the same directory race on the same file.
/// Invocations are user-triggered and effectively serialised; programmatic
/// concurrent use is not supported.
pub const FORMAT_TEMP_FILE_NAME: &str = ".pain_format_temp.pain";

/// RAII guard owning the formatter's temporary input file.
///
/// The file lives beside the source document and is removed when the guard
/// drops, on success and failure alike. Removal is attempted only when the
/// file still exists, with no retry.
#[derive(Debug)]
pub struct TempFormatFile {
    path: PathBuf,
}

impl TempFormatFile {
    /// Writes `text` to the reserved file beside `document_path`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::TempWrite`] when the file cannot be written;
    /// the format attempt is aborted in that case.
    pub fn create(document_path: &Path, text: &str) -> Result<Self, FormatError> {
        let directory = document_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let path = directory.join(FORMAT_TEMP_FILE_NAME);

        fs::write(&path, text).map_err(|source| FormatError::TempWrite {
            path: path.clone(),
            source,
        })?;

        Ok(Self { path })
    }

    /// Location of the temporary file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

impl Drop for TempFormatFile {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        if let Err(error) = fs::remove_file(&self.path) {
            debug!(
                target: FORMAT_TARGET,
                path = %self.path.display(),
                error = %error,
                "failed to remove formatter temp file"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    fn creates_the_reserved_file_beside_the_document() {
        let dir = TempDir::new().expect("temp dir");
        let document = dir.path().join("main.pain");

        let temp = TempFormatFile::create(&document, "content").expect("temp file");

        assert_eq!(temp.path(), dir.path().join(FORMAT_TEMP_FILE_NAME));
        assert_eq!(
            fs::read_to_string(temp.path()).expect("read back"),
            "content"
        );
    }

    #[rstest]
    fn removes_the_file_on_drop() {
        let dir = TempDir::new().expect("temp dir");
        let document = dir.path().join("main.pain");
        let path = {
            let temp = TempFormatFile::create(&document, "content").expect("temp file");
            temp.path().to_path_buf()
        };

        assert!(!path.exists());
    }

    #[rstest]
    fn tolerates_the_file_disappearing_early() {
        let dir = TempDir::new().expect("temp dir");
        let document = dir.path().join("main.pain");
        let temp = TempFormatFile::create(&document, "content").expect("temp file");

        fs::remove_file(temp.path()).expect("external removal");
        drop(temp);
    }

    #[rstest]
    fn unwritable_directories_abort_the_attempt() {
        let dir = TempDir::new().expect("temp dir");
        let document = dir.path().join("no-such-subdir").join("main.pain");

        let result = TempFormatFile::create(&document, "content");

        assert!(matches!(result, Err(FormatError::TempWrite { .. })));
    }
}
