//! Child-process spawning.
//!
//! External resolver tools are launched through Tokio's process API so that
//! waiting on them never blocks the runtime. Children should be created with
//! `kill_on_drop(true)`; dropping the wait future then terminates the
//! process instead of orphaning it.

pub use std::process::Stdio;
pub use tokio::process::Command;

/// Returns `true` when a spawn error means the program itself could not be
/// found or executed, as opposed to a runtime failure of the process.
pub fn is_launch_failure(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
    )
}
