//! Synchronization primitives.
//!
//! The playback controller is a single task that owns its state; everything
//! else talks to it through the channels re-exported here. `watch` publishes
//! snapshots to observers and `broadcast` backs the event bus.

pub use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex};

pub use tokio_util::sync::{CancellationToken, DropGuard};
