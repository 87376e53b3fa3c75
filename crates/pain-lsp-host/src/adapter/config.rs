//! Launch configuration for the server process.

use std::path::PathBuf;

/// Describes how to spawn the language server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The executable path or bare command name.
    pub command: PathBuf,
    /// Arguments passed to the server.
    pub args: Vec<String>,
    /// Working directory for the spawned process.
    pub working_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Builds a configuration for the given executable with no arguments.
    #[must_use]
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Sets the arguments passed to the server.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Sets a custom working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// The logical launch profile a session runs under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LaunchMode {
    /// Normal operation.
    #[default]
    Run,
    /// Operation under a debugger-attached host.
    Debug,
}

/// The run and debug launch profiles for the server.
///
/// Both profiles use the stdio transport; for the Pain server they are
/// configured identically, which [`LaunchProfiles::identical`] encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchProfiles {
    /// Profile used for normal operation.
    pub run: ServerConfig,
    /// Profile used when a debugger is attached to the host.
    pub debug: ServerConfig,
}

impl LaunchProfiles {
    /// Builds a profile pair where run and debug share one configuration.
    #[must_use]
    pub fn identical(config: ServerConfig) -> Self {
        Self {
            run: config.clone(),
            debug: config,
        }
    }

    /// Returns the configuration for the requested mode.
    #[must_use]
    pub fn profile(&self, mode: LaunchMode) -> &ServerConfig {
        match mode {
            LaunchMode::Run => &self.run,
            LaunchMode::Debug => &self.debug,
        }
    }
}
