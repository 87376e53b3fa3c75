//! Internal state of the spawned server process.

use std::process::Child;

use super::transport::ProcessTransport;

/// Lifecycle state of the server process.
pub enum ProcessState {
    /// The process has not been started.
    NotStarted,
    /// The process is running and ready for communication.
    Running {
        /// Handle to the child process.
        child: Child,
        /// Framed transport over the child's stdio.
        transport: ProcessTransport,
    },
    /// The process has been stopped.
    Stopped,
}
