//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the Reelcast core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! This crate establishes the logging conventions, the bridge configuration
//! and the event broadcasting used by `core-playback` and `core-service`.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
