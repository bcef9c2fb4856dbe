//! # Event Bus System
//!
//! Broadcasts typed events from the playback core to any number of
//! observers using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **Event Types**: [`CoreEvent`] wraps per-domain enums ([`PlaybackEvent`],
//!   [`QueueEvent`])
//! - **EventBus**: central broadcast channel for publishing events
//! - **EventStream**: receiver wrapper with predicate filtering
//!
//! The controller's *current* state is published separately as a snapshot;
//! the bus carries discrete happenings (a stream started, an error was
//! raised, an item was queued) that a UI may want to animate or log.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, QueueEvent};
//!
//! let event_bus = EventBus::new(100);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Queue(QueueEvent::Cleared { removed: 3 }))
//!     .ok();
//!
//! assert!(subscriber.try_recv().is_ok());
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber was too slow and missed `n`
//!   events. Non-fatal; keep receiving.
//! - **`RecvError::Closed`**: all senders have been dropped (shutdown).

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playback lifecycle events
    Playback(PlaybackEvent),
    /// Queue mutations
    Queue(QueueEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Queue(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::FallbackStarted { .. }) => EventSeverity::Warning,
            CoreEvent::Playback(PlaybackEvent::Started { .. })
            | CoreEvent::Playback(PlaybackEvent::Completed { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Routine state changes
    Debug,
    /// User-visible milestones
    Info,
    /// Degraded but recovering
    Warning,
    /// Failure surfaced to the user
    Error,
}

/// Events emitted by the playback controller.
///
/// States, strategies and error kinds are carried by name (`"Resolving"`,
/// `"fallback"`, `"NetworkError"`) so that hosts can log or forward events
/// without depending on the playback crate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// The controller entered a new state.
    StateChanged { state: String },
    /// The engine accepted a stream.
    Started {
        title: String,
        /// `"local"`, `"remote"` or `"fallback"`
        strategy: String,
    },
    /// The primary stream failed in the engine; trying the fallback resolver.
    FallbackStarted { title: String },
    /// The engine reached the end of the stream.
    Completed { title: String },
    /// Playback was stopped by the caller.
    Stopped,
    /// An error message was raised for display.
    Error { kind: String, message: String },
    /// The displayed error was cleared (success or expiry).
    ErrorCleared,
    /// Descriptive metadata arrived for the current item.
    InfoLoaded {
        title: String,
        channel: Option<String>,
        duration_secs: Option<u64>,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::StateChanged { .. } => "Playback state changed",
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::FallbackStarted { .. } => "Fallback resolution started",
            PlaybackEvent::Completed { .. } => "Playback completed",
            PlaybackEvent::Stopped => "Playback stopped",
            PlaybackEvent::Error { .. } => "Playback error",
            PlaybackEvent::ErrorCleared => "Playback error cleared",
            PlaybackEvent::InfoLoaded { .. } => "Media info loaded",
        }
    }
}

/// Events emitted when the pending queue changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum QueueEvent {
    /// A reference was appended.
    ItemAdded {
        title: String,
        /// `"Remote"` or `"Local"`
        kind: String,
    },
    /// The queue was emptied.
    Cleared { removed: usize },
}

impl QueueEvent {
    fn description(&self) -> &str {
        match self {
            QueueEvent::ItemAdded { .. } => "Item added to queue",
            QueueEvent::Cleared { .. } => "Queue cleared",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cheap to clone; all clones publish into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// A subscriber that falls behind by more than `capacity` events
    /// receives `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let playback_only = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Playback(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn started(title: &str) -> CoreEvent {
        CoreEvent::Playback(PlaybackEvent::Started {
            title: title.to_string(),
            strategy: "remote".to_string(),
        })
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(started("a")).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        assert_eq!(bus.emit(started("clip")).unwrap(), 2);

        assert_eq!(first.recv().await.unwrap(), started("clip"));
        assert_eq!(second.recv().await.unwrap(), started("clip"));
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Queue(_)));

        bus.emit(started("skipped")).unwrap();
        bus.emit(CoreEvent::Queue(QueueEvent::Cleared { removed: 2 }))
            .unwrap();

        let event = stream.recv().await.unwrap();
        assert_eq!(event, CoreEvent::Queue(QueueEvent::Cleared { removed: 2 }));
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut receiver = bus.subscribe();

        for i in 0..5 {
            bus.emit(started(&format!("clip-{}", i))).unwrap();
        }

        assert!(matches!(receiver.recv().await, Err(RecvError::Lagged(_))));
        assert!(receiver.recv().await.is_ok());
    }

    #[test]
    fn test_event_severity() {
        let error = CoreEvent::Playback(PlaybackEvent::Error {
            kind: "NetworkError".to_string(),
            message: "offline".to_string(),
        });
        let fallback = CoreEvent::Playback(PlaybackEvent::FallbackStarted {
            title: "clip".to_string(),
        });
        let state = CoreEvent::Playback(PlaybackEvent::StateChanged {
            state: "Idle".to_string(),
        });

        assert_eq!(error.severity(), EventSeverity::Error);
        assert_eq!(fallback.severity(), EventSeverity::Warning);
        assert_eq!(started("clip").severity(), EventSeverity::Info);
        assert_eq!(state.severity(), EventSeverity::Debug);
        assert!(EventSeverity::Error > EventSeverity::Warning);
    }

    #[test]
    fn test_event_description() {
        assert_eq!(started("x").description(), "Playback started");
        assert_eq!(
            CoreEvent::Queue(QueueEvent::ItemAdded {
                title: "x".to_string(),
                kind: "Local".to_string(),
            })
            .description(),
            "Item added to queue"
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Playback(PlaybackEvent::InfoLoaded {
            title: "Talk".to_string(),
            channel: Some("Conf".to_string()),
            duration_secs: Some(61),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"Playback""#));
        assert!(json.contains(r#""event":"InfoLoaded""#));

        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[tokio::test]
    async fn test_try_recv_empty_and_filtered() {
        let bus = EventBus::default();
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| event.severity() >= EventSeverity::Error);

        assert!(stream.try_recv().is_none());

        bus.emit(started("ignored")).unwrap();
        assert!(stream.try_recv().is_none());
    }
}
