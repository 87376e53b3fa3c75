//! Formatter subprocess invocation.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::{FORMAT_TARGET, FormatError};

/// Captured output of a successful formatter run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterOutput {
    /// The formatted source text.
    pub stdout: String,
    /// Diagnostics the formatter wrote to stderr, possibly empty.
    pub stderr: String,
}

/// Runs the formatter executable against an input file.
///
/// The production implementation spawns the real compiler; tests substitute
/// scripted invokers to exercise the command handler without a binary.
#[cfg_attr(test, mockall::automock)]
pub trait FormatterInvoker {
    /// Invokes `<compiler> format --input <input> --stdout`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the process cannot be spawned or exits
    /// unsuccessfully.
    fn format(&self, compiler: &Path, input: &Path) -> Result<FormatterOutput, FormatError>;
}

/// Invoker that spawns the compiler as a child process.
///
/// Stdout and stderr are captured in full; the exit status decides between
/// success (stderr becomes a warning) and failure (stderr becomes the error
/// detail).
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessFormatterInvoker;

impl FormatterInvoker for ProcessFormatterInvoker {
    fn format(&self, compiler: &Path, input: &Path) -> Result<FormatterOutput, FormatError> {
        debug!(
            target: FORMAT_TARGET,
            compiler = %compiler.display(),
            input = %input.display(),
            "running formatter"
        );

        let output = Command::new(compiler)
            .arg("format")
            .arg("--input")
            .arg(input)
            .arg("--stdout")
            .output()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    FormatError::CompilerNotFound {
                        command: compiler.display().to_string(),
                        source,
                    }
                } else {
                    FormatError::Spawn {
                        message: format!("failed to run {}", compiler.display()),
                        source,
                    }
                }
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(FormatError::Failed {
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        Ok(FormatterOutput { stdout, stderr })
    }
}
