//! Command-line host for the Pain editor integration.
//!
//! The runtime loads configuration, bootstraps telemetry, and exposes the
//! integration's operations: the format-on-demand command, executable
//! resolution, and a session smoke check. IO streams are injected so tests
//! can capture output.

pub mod extension;
pub mod telemetry;

pub use extension::{Extension, Notifier, SessionState, StopSignal, TracingNotifier};

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};

use pain_editor_config::Config;
use pain_format::FormatOutcome;
use pain_lsp_host::{Document, ToolKind, locate};

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let rendered = error.render().to_string();
            if error.use_stderr() {
                let _ = write!(stderr, "{rendered}");
                return ExitCode::FAILURE;
            }
            let _ = write!(stdout, "{rendered}");
            return ExitCode::SUCCESS;
        }
    };

    let config = match Config::load_from_iter(cli.config.loader_args()) {
        Ok(config) => config,
        Err(error) => {
            let _ = writeln!(stderr, "failed to load configuration: {error}");
            return ExitCode::FAILURE;
        }
    };

    // Telemetry trouble is reported but never blocks the command itself.
    if let Err(error) = telemetry::initialise(&config) {
        let _ = writeln!(stderr, "warning: {error}");
    }

    match cli.command {
        CliCommand::Format { file, write } => {
            let extension = Extension::new(config, cli.workspace_root);
            run_format(&extension, &file, write, stdout, stderr)
        }
        CliCommand::Locate { tool } => {
            let configured = match tool {
                ToolArg::Server => config.lsp_path(),
                ToolArg::Formatter => config.compiler_path(),
            };
            let resolved = locate(tool.into(), cli.workspace_root.as_deref(), configured);
            let _ = writeln!(stdout, "{}", resolved.display());
            ExitCode::SUCCESS
        }
        CliCommand::Check => {
            let mut extension = Extension::new(config, cli.workspace_root);
            run_check(&mut extension, stdout, stderr)
        }
    }
}

fn run_format<W, E>(
    extension: &Extension,
    file: &Path,
    write_back: bool,
    stdout: &mut W,
    stderr: &mut E,
) -> ExitCode
where
    W: Write,
    E: Write,
{
    let document = match Document::from_file(file) {
        Ok(document) => document,
        Err(error) => {
            let _ = writeln!(stderr, "failed to read '{}': {error}", file.display());
            return ExitCode::FAILURE;
        }
    };

    match extension.format_document(&document) {
        // Out-of-scope documents are a silent no-op.
        Ok(FormatOutcome::NotApplicable) => ExitCode::SUCCESS,
        Ok(FormatOutcome::Applied { edit, warning }) => {
            if let Some(warning) = warning {
                let _ = writeln!(stderr, "formatting warning: {}", warning.trim_end());
            }
            if write_back {
                if let Err(error) = std::fs::write(file, &edit.new_text) {
                    let _ = writeln!(stderr, "failed to write '{}': {error}", file.display());
                    return ExitCode::FAILURE;
                }
            } else {
                let _ = stdout.write_all(edit.new_text.as_bytes());
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(stderr, "formatting failed: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run_check<W, E>(extension: &mut Extension, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    W: Write,
    E: Write,
{
    extension.activate();
    let state = wait_for_settled(extension, Duration::from_secs(15));

    if let Some(signal) = extension.deactivate() {
        signal.wait();
    }

    if state == SessionState::Running {
        let _ = writeln!(stdout, "pain-lsp session is running");
        ExitCode::SUCCESS
    } else {
        let _ = writeln!(stderr, "pain-lsp session did not start (state: {state})");
        ExitCode::FAILURE
    }
}

/// Polls the session until startup settles or `timeout` elapses.
fn wait_for_settled(extension: &Extension, timeout: Duration) -> SessionState {
    let deadline = Instant::now() + timeout;
    loop {
        let state = extension.session_state();
        if state != SessionState::Starting || Instant::now() >= deadline {
            return state;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "pain-editor",
    version,
    about = "Editor-integration host for the Pain language"
)]
struct Cli {
    /// Workspace root the host has open, when any.
    #[arg(long, global = true, value_name = "DIR")]
    workspace_root: Option<PathBuf>,
    #[command(flatten)]
    config: ConfigFlags,
    #[command(subcommand)]
    command: CliCommand,
}

/// Configuration flags forwarded to the loader.
#[derive(Debug, clap::Args)]
struct ConfigFlags {
    /// Path to a TOML configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config_path: Option<PathBuf>,
    /// Path or command name for the `pain-lsp` executable.
    #[arg(long, global = true, value_name = "PATH")]
    lsp_path: Option<String>,
    /// Path or command name for the `pain-compiler` executable.
    #[arg(long, global = true, value_name = "PATH")]
    compiler_path: Option<String>,
    /// Log filter expression.
    #[arg(long, global = true, value_name = "FILTER")]
    log_filter: Option<String>,
    /// Log output format (`json` or `compact`).
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<String>,
}

impl ConfigFlags {
    /// Rebuilds the flag list the configuration loader understands.
    fn loader_args(&self) -> Vec<OsString> {
        let mut args = vec![OsString::from("pain-editor")];
        if let Some(path) = &self.config_path {
            args.push(OsString::from("--config-path"));
            args.push(path.clone().into_os_string());
        }
        for (flag, value) in [
            ("--lsp-path", &self.lsp_path),
            ("--compiler-path", &self.compiler_path),
            ("--log-filter", &self.log_filter),
            ("--log-format", &self.log_format),
        ] {
            if let Some(value) = value {
                args.push(OsString::from(flag));
                args.push(OsString::from(value.clone()));
            }
        }
        args
    }
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Formats a Pain document with the external compiler.
    Format {
        /// Document to format.
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Rewrites the file in place instead of printing to stdout.
        #[arg(long)]
        write: bool,
    },
    /// Prints the resolved executable for one of the external tools.
    Locate {
        /// Tool to resolve.
        #[arg(value_name = "TOOL", value_enum)]
        tool: ToolArg,
    },
    /// Starts a language server session and reports how far it got.
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ToolArg {
    /// The `pain-lsp` language server.
    Server,
    /// The `pain-compiler` formatter.
    Formatter,
}

impl From<ToolArg> for ToolKind {
    fn from(tool: ToolArg) -> Self {
        match tool {
            ToolArg::Server => Self::LanguageServer,
            ToolArg::Formatter => Self::Formatter,
        }
    }
}
