//! Configuration shared by the Pain editor-integration tooling.
//!
//! Values resolve with the precedence command-line flags > `PAIN_*`
//! environment variables > TOML configuration file > built-in defaults. The
//! loader understands only the configuration flags themselves; callers with
//! richer command lines split those flags out before handing them to
//! [`Config::load_from_iter`].

mod defaults;
mod logging;

pub use defaults::{
    DEFAULT_LOG_FILTER, ENV_COMPILER_PATH, ENV_CONFIG_PATH, ENV_LOG_FILTER, ENV_LOG_FORMAT,
    ENV_LSP_PATH, default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

/// Shared configuration for the Pain editor-integration tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    lsp_path: Option<String>,
    compiler_path: Option<String>,
    log_filter: String,
    log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lsp_path: None,
            compiler_path: None,
            log_filter: defaults::default_log_filter_string(),
            log_format: defaults::default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from the supplied arguments, the process
    /// environment, and an optional TOML file.
    ///
    /// The first argument is treated as the binary name, mirroring
    /// `std::env::args_os`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the flags are malformed, when a
    /// configured file cannot be read or parsed, or when an environment
    /// variable holds an unparseable value.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = CliLayer::try_parse_from(args)?;
        let file = load_file_layer(cli.config_path.as_deref())?;
        let environment = EnvLayer::capture()?;

        Ok(Self {
            lsp_path: normalise_override(cli.lsp_path.or(environment.lsp_path).or(file.lsp_path)),
            compiler_path: normalise_override(
                cli.compiler_path
                    .or(environment.compiler_path)
                    .or(file.compiler_path),
            ),
            log_filter: cli
                .log_filter
                .or(environment.log_filter)
                .or(file.log_filter)
                .unwrap_or_else(defaults::default_log_filter_string),
            log_format: cli
                .log_format
                .or(environment.log_format)
                .or(file.log_format)
                .unwrap_or_else(defaults::default_log_format),
        })
    }

    /// Explicit override for the language server executable, when configured.
    #[must_use]
    pub fn lsp_path(&self) -> Option<&str> {
        self.lsp_path.as_deref()
    }

    /// Explicit override for the compiler executable, when configured.
    #[must_use]
    pub fn compiler_path(&self) -> Option<&str> {
        self.compiler_path.as_deref()
    }

    /// Log filter expression applied to the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for the tracing subscriber.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Sets the language server override, normalising empty values to unset.
    #[must_use]
    pub fn with_lsp_path(mut self, path: impl Into<String>) -> Self {
        self.lsp_path = normalise_override(Some(path.into()));
        self
    }

    /// Sets the compiler override, normalising empty values to unset.
    #[must_use]
    pub fn with_compiler_path(mut self, path: impl Into<String>) -> Self {
        self.compiler_path = normalise_override(Some(path.into()));
        self
    }
}

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration flags were malformed.
    #[error(transparent)]
    CliUsage(#[from] clap::Error),

    /// Reading the configured TOML file failed.
    #[error("failed to read configuration file '{}': {source}", path.display())]
    ReadFile {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Parsing the configured TOML file failed.
    #[error("failed to parse configuration file '{}': {source}", path.display())]
    ParseFile {
        /// File that could not be parsed.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// An environment variable held a value that could not be parsed.
    #[error("invalid value '{value}' for {variable}")]
    InvalidEnvValue {
        /// Variable that held the rejected value.
        variable: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Configuration flags recognised by the loader.
#[derive(Debug, Parser)]
#[command(name = "pain-editor")]
struct CliLayer {
    /// Path to a TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config_path: Option<PathBuf>,
    /// Path or command name for the `pain-lsp` executable.
    #[arg(long, value_name = "PATH")]
    lsp_path: Option<String>,
    /// Path or command name for the `pain-compiler` executable.
    #[arg(long, value_name = "PATH")]
    compiler_path: Option<String>,
    /// Log filter expression, e.g. `info` or `pain_lsp_host=debug`.
    #[arg(long, value_name = "FILTER")]
    log_filter: Option<String>,
    /// Log output format.
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

/// Values sourced from the optional TOML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileLayer {
    lsp_path: Option<String>,
    compiler_path: Option<String>,
    log_filter: Option<String>,
    log_format: Option<LogFormat>,
}

/// Values sourced from `PAIN_*` environment variables.
#[derive(Debug, Default)]
struct EnvLayer {
    lsp_path: Option<String>,
    compiler_path: Option<String>,
    log_filter: Option<String>,
    log_format: Option<LogFormat>,
}

impl EnvLayer {
    fn capture() -> Result<Self, ConfigError> {
        let log_format = match env::var(defaults::ENV_LOG_FORMAT) {
            Ok(raw) => Some(LogFormat::from_str(&raw).map_err(|_| {
                ConfigError::InvalidEnvValue {
                    variable: defaults::ENV_LOG_FORMAT,
                    value: raw,
                }
            })?),
            Err(_) => None,
        };

        Ok(Self {
            lsp_path: env::var(defaults::ENV_LSP_PATH).ok(),
            compiler_path: env::var(defaults::ENV_COMPILER_PATH).ok(),
            log_filter: env::var(defaults::ENV_LOG_FILTER).ok(),
            log_format,
        })
    }
}

fn load_file_layer(flag_path: Option<&Path>) -> Result<FileLayer, ConfigError> {
    let path = match flag_path {
        Some(path) => Some(path.to_path_buf()),
        None => env::var_os(defaults::ENV_CONFIG_PATH).map(PathBuf::from),
    };

    let Some(path) = path else {
        return Ok(FileLayer::default());
    };

    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::ReadFile {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::ParseFile { path, source })
}

fn normalise_override(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn defaults_leave_overrides_unset() {
        let config = Config::default();

        assert_eq!(config.lsp_path(), None);
        assert_eq!(config.compiler_path(), None);
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Compact);
    }

    #[rstest]
    #[case("", None)]
    #[case("   ", None)]
    #[case("pain-lsp", Some("pain-lsp"))]
    #[case("  /opt/pain/bin/pain-lsp  ", Some("/opt/pain/bin/pain-lsp"))]
    fn overrides_normalise_blank_values(#[case] raw: &str, #[case] expected: Option<&str>) {
        let config = Config::default().with_lsp_path(raw);

        assert_eq!(config.lsp_path(), expected);
    }

    #[rstest]
    fn cli_flags_populate_the_config() {
        let config = Config::load_from_iter([
            "pain-editor",
            "--lsp-path",
            "/builds/pain-lsp",
            "--log-filter",
            "debug",
            "--log-format",
            "json",
        ])
        .expect("flags should parse");

        assert_eq!(config.lsp_path(), Some("/builds/pain-lsp"));
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(config.log_format(), LogFormat::Json);
    }

    #[rstest]
    fn unknown_flags_are_rejected() {
        let result = Config::load_from_iter(["pain-editor", "--no-such-flag"]);

        assert!(matches!(result, Err(ConfigError::CliUsage(_))));
    }

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("JSON", LogFormat::Json)]
    #[case("compact", LogFormat::Compact)]
    fn log_format_parses_case_insensitively(#[case] raw: &str, #[case] expected: LogFormat) {
        let parsed = raw.parse::<LogFormat>().expect("format should parse");

        assert_eq!(parsed, expected);
    }
}
