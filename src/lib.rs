//! Workspace placeholder crate.
//!
//! Host applications depend on `reelcast` and pick a feature set instead of
//! wiring `core-service` and `core-playback` individually.

#[cfg(feature = "desktop-shims")]
pub use core_playback::{
    ControllerHandle, EngineEvent, EngineEventSink, EngineFactory, EngineOptions, MediaKind,
    MediaReference, PlaybackConfig, PlaybackEngine, PlaybackState,
};
#[cfg(feature = "desktop-shims")]
pub use core_service::{CoreError, CoreService, CoreServiceBuilder};
