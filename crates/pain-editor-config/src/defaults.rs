//! Built-in defaults and the environment variable names shared by the
//! configuration layers.

use crate::logging::LogFormat;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable naming an optional TOML configuration file.
pub const ENV_CONFIG_PATH: &str = "PAIN_CONFIG_PATH";

/// Environment variable overriding the language server executable.
pub const ENV_LSP_PATH: &str = "PAIN_LSP_PATH";

/// Environment variable overriding the compiler executable.
pub const ENV_COMPILER_PATH: &str = "PAIN_COMPILER_PATH";

/// Environment variable overriding the log filter expression.
pub const ENV_LOG_FILTER: &str = "PAIN_LOG_FILTER";

/// Environment variable overriding the log output format.
pub const ENV_LOG_FORMAT: &str = "PAIN_LOG_FORMAT";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
