//! Document snapshot and `file://` URI helpers.

use std::io;
use std::path::{Path, PathBuf};

use lsp_types::Uri;
use thiserror::Error;

/// Language identifier for Pain documents.
pub const PAIN_LANGUAGE_ID: &str = "pain";

/// Language identifier assigned to files the integration does not recognise.
const PLAIN_TEXT_LANGUAGE_ID: &str = "plaintext";

/// In-memory snapshot of the document a command operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    language_id: String,
    text: String,
}

impl Document {
    /// Builds a document from its parts.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, language_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language_id: language_id.into(),
            text: text.into(),
        }
    }

    /// Reads a document from disk, inferring the language from its extension.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self, io::Error> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(path, language_id_for_path(path), text))
    }

    /// Filesystem location of the document.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Language identifier assigned by the host.
    #[must_use]
    pub fn language_id(&self) -> &str {
        self.language_id.as_str()
    }

    /// Full document text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Whether the document is in scope for the Pain integration.
    #[must_use]
    pub fn is_pain(&self) -> bool {
        self.language_id == PAIN_LANGUAGE_ID
    }
}

/// Infers the language identifier from a file extension.
#[must_use]
pub fn language_id_for_path(path: &Path) -> &'static str {
    if path.extension().is_some_and(|extension| extension == "pain") {
        PAIN_LANGUAGE_ID
    } else {
        PLAIN_TEXT_LANGUAGE_ID
    }
}

/// Errors raised while converting filesystem paths to `file://` URIs.
#[derive(Debug, Error)]
#[error("failed to convert '{}' to a file URI", path.display())]
pub struct UriConversionError {
    /// Path that could not be converted.
    path: PathBuf,
}

/// Converts a path to an `lsp_types::Uri` using `file://` encoding.
///
/// Relative paths are resolved against the current directory first, since
/// `file://` URIs must be absolute.
///
/// # Errors
///
/// Returns [`UriConversionError`] when the path cannot be made absolute or
/// the resulting URI fails to parse.
pub fn path_to_file_uri(path: &Path) -> Result<Uri, UriConversionError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|_| UriConversionError {
                path: path.to_path_buf(),
            })?
            .join(path)
    };

    let file_url = url::Url::from_file_path(&absolute).map_err(|()| UriConversionError {
        path: absolute.clone(),
    })?;

    file_url
        .as_str()
        .parse()
        .map_err(|_| UriConversionError { path: absolute })
}
