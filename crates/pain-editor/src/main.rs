//! Binary entrypoint for the Pain editor-integration host.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    pain_editor::run(std::env::args_os(), &mut stdout, &mut stderr)
}
