//! Runtime handle access.

pub use tokio::runtime::{Builder, Handle};

/// Runs the provided future to completion on a fresh current-thread runtime.
///
/// Used only outside of an existing runtime (e.g. forwarding log entries
/// from a thread that has no Tokio context).
pub fn block_on<F>(future: F) -> std::io::Result<F::Output>
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}
