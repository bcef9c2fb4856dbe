//! # Core Playback Traits
//!
//! Abstractions the controller drives. These are core-layer seams, distinct
//! from `bridge-traits`: the host implements [`PlaybackEngine`] and
//! [`EngineFactory`] around its native player, while the resolvers in
//! [`crate::resolver`] implement [`StreamResolver`].
//!
//! ## Threading Model
//!
//! Native players report state changes on their own threads. The engine
//! must not call back into the controller synchronously; it reports through
//! the [`EngineEventSink`] it was handed in [`PlaybackEngine::play`], which
//! never blocks and may be called from any thread.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use core_playback::{EngineEvent, EngineEventSink, PlaybackEngine, Result};
//!
//! struct NullEngine;
//!
//! #[async_trait::async_trait]
//! impl PlaybackEngine for NullEngine {
//!     async fn play(&self, _uri: &str, events: EngineEventSink) -> Result<()> {
//!         events.emit(EngineEvent::Playing);
//!         Ok(())
//!     }
//!     async fn stop(&self) -> Result<()> { Ok(()) }
//!     async fn detach_surface(&self) -> Result<()> { Ok(()) }
//!     async fn dispose(&self) -> Result<()> { Ok(()) }
//! }
//! ```

use crate::error::{ErrorKind, Result};
use crate::media::MediaReference;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Resolution Types
// ============================================================================

/// Which resolution strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveAttempt {
    /// Remote lookup service.
    Primary,
    /// External resolver tool, after the engine failed the primary stream.
    Fallback,
}

/// Strategy that produced a resolved URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStrategy {
    Remote,
    Fallback,
}

impl ResolutionStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionStrategy::Remote => "remote",
            ResolutionStrategy::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one resolution attempt. Never an `Err`: every failure is
/// classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved {
        url: String,
        strategy: ResolutionStrategy,
    },
    Failed {
        reason: ErrorKind,
    },
}

impl ResolutionOutcome {
    pub fn failed(reason: ErrorKind) -> Self {
        ResolutionOutcome::Failed { reason }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved { .. })
    }
}

/// Turns a media reference into a playable stream URL.
///
/// Implementations must bound their own wall-clock time and must not
/// panic. Cancellation is by dropping the future; implementations holding
/// child processes kill them on drop.
#[async_trait]
pub trait StreamResolver: Send + Sync {
    async fn resolve(&self, reference: &MediaReference, attempt: ResolveAttempt)
        -> ResolutionOutcome;
}

/// Descriptive metadata about a remote item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub title: String,
    pub channel: Option<String>,
    pub duration_secs: Option<u64>,
    pub thumbnail: Option<String>,
    pub upload_date: Option<String>,
    pub description: Option<String>,
}

/// Source of [`MediaInfo`]. Failures are informational only.
#[async_trait]
pub trait MediaInfoSource: Send + Sync {
    async fn fetch_info(&self, source: &str) -> Result<MediaInfo>;
}

// ============================================================================
// Engine Types
// ============================================================================

/// Events reported by the native engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineEvent {
    /// Playback actually started rendering.
    Playing,
    /// The engine stopped.
    Stopped,
    /// The stream ended normally.
    EndReached,
    /// The engine failed the current stream.
    EncounteredError,
}

/// Non-blocking, thread-agnostic callback for engine events.
///
/// Each sink is bound to one `play` call; events from an older sink are
/// ignored by the controller once a newer stream has started.
#[derive(Clone)]
pub struct EngineEventSink {
    deliver: Arc<dyn Fn(EngineEvent) + Send + Sync>,
}

impl EngineEventSink {
    pub fn new<F>(deliver: F) -> Self
    where
        F: Fn(EngineEvent) + Send + Sync + 'static,
    {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    /// A sink that drops everything.
    pub fn discard() -> Self {
        Self::new(|_| {})
    }

    pub fn emit(&self, event: EngineEvent) {
        (self.deliver)(event)
    }
}

impl fmt::Debug for EngineEventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineEventSink").finish_non_exhaustive()
    }
}

/// Options fixed for the lifetime of one engine session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub hardware_decoding: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            hardware_decoding: true,
        }
    }
}

/// Native playback engine.
///
/// Calls return once the engine has *accepted* the command; effects are
/// observed through [`EngineEvent`]s.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Start playing `uri` (a stream URL or a local path).
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the URI outright.
    async fn play(&self, uri: &str, events: EngineEventSink) -> Result<()>;

    /// Stop the current stream. Idempotent.
    async fn stop(&self) -> Result<()>;

    /// Detach the rendering surface before disposal.
    async fn detach_surface(&self) -> Result<()>;

    /// Release all native resources. The engine is unusable afterwards.
    async fn dispose(&self) -> Result<()>;
}

/// Creates engine sessions on first use.
pub trait EngineFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns [`PlaybackError::EngineInit`](crate::PlaybackError::EngineInit)
    /// if the native engine cannot be created.
    fn create(&self, options: EngineOptions) -> Result<Box<dyn PlaybackEngine>>;
}

// ============================================================================
// Tests
// ============================================================================
