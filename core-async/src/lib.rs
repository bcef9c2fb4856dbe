//! Async runtime layer for the Reelcast core.
//!
//! Every `core-*` crate reaches Tokio through this crate so that spawning,
//! timers, channels and child processes are configured in one place.
//!
//! # Modules
//!
//! - `task`: task spawning and join handles
//! - `time`: sleeps, deadlines and timeouts (pausable in tests)
//! - `sync`: channels and locks used by the control loop
//! - `process`: child-process spawning for external resolver tools
//! - `runtime`: access to the ambient runtime handle
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(10)).await;
//!         42
//!     });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

pub mod process;
pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use tokio::select;
pub use time::{sleep, Duration, Instant};
