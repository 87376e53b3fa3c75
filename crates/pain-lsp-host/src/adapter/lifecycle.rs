//! Termination handling for the server child process.

use std::process::Child;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

/// Log target for adapter operations.
pub(super) const ADAPTER_TARGET: &str = "pain_lsp_host::adapter";

/// Grace period allowed between a shutdown request and a forced kill.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

/// Terminates a child process, preferring a graceful exit.
///
/// Checks whether the process already exited; when it has not, waits for a
/// short grace period and checks again before killing it outright.
pub(super) fn terminate_child(child: &mut Child) {
    match child.try_wait() {
        Ok(Some(status)) => {
            debug!(target: ADAPTER_TARGET, ?status, "language server exited");
        }
        Ok(None) => {
            wait_then_kill(child);
        }
        Err(error) => {
            warn!(
                target: ADAPTER_TARGET,
                error = %error,
                "failed to check language server status, waiting before killing"
            );
            wait_then_kill(child);
        }
    }
}

fn wait_then_kill(child: &mut Child) {
    thread::sleep(SHUTDOWN_GRACE);
    match child.try_wait() {
        Ok(Some(status)) => {
            debug!(
                target: ADAPTER_TARGET,
                ?status,
                "language server exited during grace period"
            );
        }
        Ok(None) | Err(_) => {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
