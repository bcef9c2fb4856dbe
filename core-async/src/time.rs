//! Time-related abstractions.
//!
//! [`Instant`] is Tokio's instant rather than `std::time::Instant` so that
//! deadlines computed by the core follow `tokio::time::pause`/`advance` in
//! tests. Expiry logic must only ever compare against this clock.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration, Instant};
//!
//! async fn example() {
//!     let start = Instant::now();
//!     sleep(Duration::from_millis(5)).await;
//!     assert!(start.elapsed() >= Duration::from_millis(5));
//! }
//! ```

pub use tokio::time::{sleep, sleep_until, timeout, Instant};

pub use std::time::Duration;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn paused_clock_moves_only_when_advanced() {
        let start = Instant::now();
        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(start.elapsed(), Duration::from_secs(8));
    }
}
