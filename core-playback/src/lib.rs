//! # Playback Resolution & Control
//!
//! Turns queued media references into something a native engine can play,
//! and keeps the engine session, the queue and the user-facing error line
//! consistent while it does.
//!
//! ## Overview
//!
//! This crate handles:
//! - The pending-item queue ([`MediaQueue`])
//! - Stream resolution: an HTTP lookup first, an external tool as fallback
//!   ([`resolver`])
//! - A self-expiring error message ([`ErrorSignal`])
//! - The playback state machine ([`PlaybackController`])
//! - The boundary to the native engine ([`PlaybackEngine`], [`EngineFactory`])
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{MediaReference, PlaybackConfig, PlaybackController, ResolverChain};
//!
//! let handle = PlaybackController::builder(Arc::new(chain), factory)
//!     .event_bus(events)
//!     .spawn(&PlaybackConfig::default())?;
//!
//! handle.enqueue(MediaReference::remote("https://example.com/watch?v=abc")?).await?;
//! handle.play_next().await?;
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod error_signal;
pub mod media;
pub mod queue;
pub mod resolver;
pub mod traits;

pub use config::PlaybackConfig;
pub use controller::{
    ControllerHandle, ControllerSnapshot, PlaybackController, PlaybackControllerBuilder,
    PlaybackState, FALLBACK_NOTICE,
};
pub use error::{ErrorKind, PlaybackError, Result};
pub use error_signal::ErrorSignal;
pub use media::{MediaKind, MediaReference};
pub use queue::MediaQueue;
pub use resolver::{RemoteApiResolver, ResolverChain, SubprocessResolver};
pub use traits::{
    EngineEvent, EngineEventSink, EngineFactory, EngineOptions, MediaInfo, MediaInfoSource,
    PlaybackEngine, ResolutionOutcome, ResolutionStrategy, ResolveAttempt, StreamResolver,
};
