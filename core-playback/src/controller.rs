//! # Playback Controller
//!
//! A single control-loop task owns the queue, the current item, the
//! [`ErrorSignal`] and the engine session. Everything else talks to it by
//! message:
//!
//! ```text
//!  ControllerHandle ──commands──┐
//!  resolver tasks ──outcomes────┴──> mpsc inbox ────┐
//!  engine threads ──events─────────> engine channel ┴──> control loop ──> watch snapshot
//!                                                             │
//!                                                             └──> EventBus
//! ```
//!
//! Resolver outcomes and engine events are stamped with the loop's epoch
//! when the work started. The epoch advances on `play_next`, `stop`, every
//! `engine.play` and every fallback start; anything carrying an older
//! epoch is dropped.
//!
//! Engine events are posted with `try_send` on their own channel, so an
//! engine thread never blocks on the loop and a burst of commands cannot
//! crowd them out. The loop drains that channel ahead of the inbox.

use crate::config::PlaybackConfig;
use crate::error::{ErrorKind, PlaybackError, Result};
use crate::error_signal::ErrorSignal;
use crate::media::{MediaKind, MediaReference};
use crate::queue::MediaQueue;
use crate::traits::{
    EngineEvent, EngineEventSink, EngineFactory, EngineOptions, MediaInfo, MediaInfoSource,
    PlaybackEngine, ResolutionOutcome, ResolveAttempt, StreamResolver,
};
use core_async::sync::mpsc::{self, error::TrySendError};
use core_async::sync::{oneshot, watch, CancellationToken, DropGuard};
use core_async::task::JoinHandle;
use core_async::time::{sleep_until, Instant};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, QueueEvent};
use core_runtime::logging::{redact_stream_url, strip_path};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown while the fallback resolver runs.
pub const FALLBACK_NOTICE: &str = "Playback error, attempting fallback";

const ENGINE_EVENT_BUFFER: usize = 32;

// ============================================================================
// Public Types
// ============================================================================

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing selected.
    #[default]
    Idle,
    /// Waiting for the primary resolver.
    Resolving,
    /// The engine accepted a stream.
    Playing,
    /// The engine failed the primary stream; waiting for the fallback.
    Degrading,
    /// Gave up on the current item. `play_next` recovers.
    Failed,
}

impl PlaybackState {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackState::Idle => "Idle",
            PlaybackState::Resolving => "Resolving",
            PlaybackState::Playing => "Playing",
            PlaybackState::Degrading => "Degrading",
            PlaybackState::Failed => "Failed",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the controller, published after every message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub state: PlaybackState,
    pub current: Option<MediaReference>,
    /// Empty when there is no error to show.
    pub error_message: String,
    pub queue_len: usize,
}

// ============================================================================
// Messages
// ============================================================================

enum Command {
    Enqueue(MediaReference),
    PlayNext,
    Stop,
    ClearQueue,
    QueueItems(oneshot::Sender<Vec<MediaReference>>),
    SetEngineOptions(EngineOptions),
    Shutdown(oneshot::Sender<()>),
}

enum ControlMessage {
    Command(Command),
    Resolved {
        epoch: u64,
        outcome: ResolutionOutcome,
    },
    InfoLoaded {
        epoch: u64,
        info: MediaInfo,
    },
}

struct StampedEvent {
    epoch: u64,
    event: EngineEvent,
}

// ============================================================================
// Handle
// ============================================================================

/// Cloneable front end of a running controller.
///
/// Commands are queued and processed in order by the control loop; they
/// return as soon as the loop has accepted them. Observe the outcome
/// through [`snapshot`](Self::snapshot), [`subscribe`](Self::subscribe) or
/// the event bus. When the last handle is dropped the loop tears the
/// engine down and exits.
#[derive(Clone)]
pub struct ControllerHandle {
    inbox: mpsc::Sender<ControlMessage>,
    snapshot: watch::Receiver<ControllerSnapshot>,
    _alive: Arc<DropGuard>,
}

impl ControllerHandle {
    async fn send(&self, command: Command) -> Result<()> {
        self.inbox
            .send(ControlMessage::Command(command))
            .await
            .map_err(|_| PlaybackError::ControllerClosed)
    }

    /// Append to the queue.
    pub async fn enqueue(&self, reference: MediaReference) -> Result<()> {
        self.send(Command::Enqueue(reference)).await
    }

    /// Start the next queued item, or go idle if the queue is empty.
    pub async fn play_next(&self) -> Result<()> {
        self.send(Command::PlayNext).await
    }

    /// Stop playback and go idle. No-op when already idle.
    pub async fn stop(&self) -> Result<()> {
        self.send(Command::Stop).await
    }

    /// Drop all pending items. The playing item is unaffected.
    pub async fn clear_queue(&self) -> Result<()> {
        self.send(Command::ClearQueue).await
    }

    /// Copy of the pending items, front first.
    pub async fn queue_items(&self) -> Result<Vec<MediaReference>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::QueueItems(tx)).await?;
        rx.await.map_err(|_| PlaybackError::ControllerClosed)
    }

    /// Options for the next engine session. A live session is disposed and
    /// recreated on the next `play_next`.
    pub async fn set_engine_options(&self, options: EngineOptions) -> Result<()> {
        self.send(Command::SetEngineOptions(options)).await
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerSnapshot> {
        self.snapshot.clone()
    }

    /// Tear down the engine (stop, detach surface, dispose) and end the
    /// loop. Returns once teardown has finished. Succeeds if the loop is
    /// already gone.
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        if self.send(Command::Shutdown(tx)).await.is_err() {
            return Ok(());
        }
        let _ = rx.await;
        Ok(())
    }
}

impl fmt::Debug for ControllerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerHandle")
            .field("snapshot", &*self.snapshot.borrow())
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Entry point for starting a controller.
pub struct PlaybackController;

impl PlaybackController {
    pub fn builder(
        resolver: Arc<dyn StreamResolver>,
        engine_factory: Arc<dyn EngineFactory>,
    ) -> PlaybackControllerBuilder {
        PlaybackControllerBuilder {
            resolver,
            engine_factory,
            info_source: None,
            events: None,
            engine_options: EngineOptions::default(),
            enable_fallback: true,
        }
    }
}

/// Collects collaborators, then [`spawn`](Self::spawn)s the control loop.
pub struct PlaybackControllerBuilder {
    resolver: Arc<dyn StreamResolver>,
    engine_factory: Arc<dyn EngineFactory>,
    info_source: Option<Arc<dyn MediaInfoSource>>,
    events: Option<EventBus>,
    engine_options: EngineOptions,
    enable_fallback: bool,
}

impl PlaybackControllerBuilder {
    /// Metadata lookup fired alongside each primary resolution.
    pub fn info_source(mut self, source: Arc<dyn MediaInfoSource>) -> Self {
        self.info_source = Some(source);
        self
    }

    pub fn event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn engine_options(mut self, options: EngineOptions) -> Self {
        self.engine_options = options;
        self
    }

    /// When disabled, an engine error on a remote stream fails immediately.
    pub fn enable_fallback(mut self, enabled: bool) -> Self {
        self.enable_fallback = enabled;
        self
    }

    /// Spawn the control loop on the ambient runtime.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::Config`] if `config` does not validate.
    pub fn spawn(self, config: &PlaybackConfig) -> Result<ControllerHandle> {
        config.validate()?;

        let (inbox_tx, inbox_rx) = mpsc::channel(config.command_buffer);
        let (engine_tx, engine_rx) = mpsc::channel(ENGINE_EVENT_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(ControllerSnapshot::default());
        let alive = CancellationToken::new();

        let info_source = if config.fetch_video_info {
            self.info_source
        } else {
            None
        };

        let control = ControlLoop {
            resolver: self.resolver,
            info_source,
            engine_factory: self.engine_factory,
            engine: None,
            engine_options: self.engine_options,
            engine_stale: false,
            enable_fallback: self.enable_fallback,
            state: PlaybackState::Idle,
            current: None,
            fallback_spent: false,
            queue: MediaQueue::new(),
            error: ErrorSignal::new(config.error_display_duration),
            epoch: 0,
            item_epoch: 0,
            in_flight: None,
            info_task: None,
            inbox: inbox_tx.clone(),
            engine_events: engine_tx,
            snapshot: snapshot_tx,
            events: self.events.unwrap_or_default(),
        };

        core_async::spawn(control.run(inbox_rx, engine_rx, alive.clone()));
        info!(
            fallback = self.enable_fallback,
            hardware_decoding = self.engine_options.hardware_decoding,
            "Playback controller started"
        );

        Ok(ControllerHandle {
            inbox: inbox_tx,
            snapshot: snapshot_rx,
            _alive: Arc::new(alive.drop_guard()),
        })
    }
}

// ============================================================================
// Control Loop
// ============================================================================

struct ControlLoop {
    resolver: Arc<dyn StreamResolver>,
    info_source: Option<Arc<dyn MediaInfoSource>>,
    engine_factory: Arc<dyn EngineFactory>,
    engine: Option<Box<dyn PlaybackEngine>>,
    engine_options: EngineOptions,
    /// The live engine was created with options that have since changed.
    engine_stale: bool,
    enable_fallback: bool,

    state: PlaybackState,
    current: Option<MediaReference>,
    /// Set once the fallback has been tried for the current item.
    fallback_spent: bool,
    queue: MediaQueue,
    error: ErrorSignal,

    epoch: u64,
    /// Epoch at which the current item was dequeued.
    item_epoch: u64,
    in_flight: Option<JoinHandle<()>>,
    info_task: Option<JoinHandle<()>>,

    inbox: mpsc::Sender<ControlMessage>,
    engine_events: mpsc::Sender<StampedEvent>,
    snapshot: watch::Sender<ControllerSnapshot>,
    events: EventBus,
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl ControlLoop {
    async fn run(
        mut self,
        mut inbox: mpsc::Receiver<ControlMessage>,
        mut engine_events: mpsc::Receiver<StampedEvent>,
        alive: CancellationToken,
    ) {
        loop {
            let deadline = self.error.deadline();
            core_async::select! {
                biased;
                _ = alive.cancelled() => {
                    debug!("All controller handles dropped");
                    break;
                }
                // The loop owns a sender, so this channel never closes.
                Some(StampedEvent { epoch, event }) = engine_events.recv() => {
                    if epoch == self.epoch {
                        self.on_engine_event(event).await;
                    } else {
                        debug!(?event, epoch, current = self.epoch, "Dropping stale engine event");
                    }
                }
                message = inbox.recv() => {
                    let Some(message) = message else { break };
                    if let Some(ack) = self.handle(message).await {
                        self.teardown().await;
                        let _ = ack.send(());
                        return;
                    }
                }
                _ = wait_until(deadline) => {
                    if self.error.expire_if_due(Instant::now()) {
                        debug!("Error message expired");
                        self.emit(PlaybackEvent::ErrorCleared);
                    }
                }
            }
            self.publish();
        }
        self.teardown().await;
    }

    /// Returns the shutdown acknowledgement when the loop must end.
    async fn handle(&mut self, message: ControlMessage) -> Option<oneshot::Sender<()>> {
        match message {
            ControlMessage::Command(command) => return self.handle_command(command).await,
            ControlMessage::Resolved { epoch, outcome } => {
                if epoch != self.epoch {
                    debug!(epoch, current = self.epoch, "Dropping stale resolution");
                    return None;
                }
                self.in_flight = None;
                self.on_resolved(outcome).await;
            }
            ControlMessage::InfoLoaded { epoch, info } => {
                if epoch == self.item_epoch && self.current.is_some() {
                    self.emit(PlaybackEvent::InfoLoaded {
                        title: info.title,
                        channel: info.channel,
                        duration_secs: info.duration_secs,
                    });
                }
            }
        }
        None
    }

    async fn handle_command(&mut self, command: Command) -> Option<oneshot::Sender<()>> {
        match command {
            Command::Enqueue(reference) => {
                debug!(item = %reference, "Enqueued");
                self.emit_queue(QueueEvent::ItemAdded {
                    title: reference.title().to_string(),
                    kind: reference.kind().to_string(),
                });
                self.queue.enqueue(reference);
            }
            Command::PlayNext => self.play_next().await,
            Command::Stop => self.stop().await,
            Command::ClearQueue => {
                let removed = self.queue.clear();
                debug!(removed, "Queue cleared");
                self.emit_queue(QueueEvent::Cleared { removed });
            }
            Command::QueueItems(reply) => {
                let _ = reply.send(self.queue.iter().cloned().collect());
            }
            Command::SetEngineOptions(options) => {
                if options != self.engine_options {
                    debug!(hardware_decoding = options.hardware_decoding, "Engine options updated");
                    self.engine_options = options;
                    self.engine_stale = self.engine.is_some();
                }
            }
            Command::Shutdown(ack) => return Some(ack),
        }
        None
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    async fn play_next(&mut self) {
        self.cancel_in_flight();
        self.epoch += 1;

        let was_active = self.state != PlaybackState::Idle;
        if was_active {
            self.stop_engine().await;
        }
        if self.engine_stale {
            debug!("Recreating engine with new options");
            self.dispose_engine().await;
        }

        let Some(item) = self.queue.dequeue_next() else {
            debug!("Queue empty");
            self.current = None;
            self.set_state(PlaybackState::Idle);
            if was_active {
                self.emit(PlaybackEvent::Stopped);
            }
            return;
        };

        self.item_epoch = self.epoch;
        self.fallback_spent = false;
        self.current = Some(item.clone());

        match item.kind() {
            MediaKind::Local => {
                info!(file = %strip_path(item.source()), "Playing local file");
                self.start_engine(item.source().to_string(), "local").await;
            }
            MediaKind::Remote => {
                info!(source = item.source(), "Resolving remote item");
                self.set_state(PlaybackState::Resolving);
                self.spawn_resolve(item.clone(), ResolveAttempt::Primary);
                self.spawn_info(item);
            }
        }
    }

    async fn stop(&mut self) {
        if self.state == PlaybackState::Idle {
            debug!("Stop while idle ignored");
            return;
        }

        self.cancel_in_flight();
        self.epoch += 1;
        self.stop_engine().await;
        self.current = None;
        self.set_state(PlaybackState::Idle);
        self.emit(PlaybackEvent::Stopped);
    }

    async fn on_resolved(&mut self, outcome: ResolutionOutcome) {
        if !matches!(
            self.state,
            PlaybackState::Resolving | PlaybackState::Degrading
        ) {
            debug!(state = %self.state, "Resolution arrived outside of resolution");
            return;
        }

        match outcome {
            ResolutionOutcome::Resolved { url, strategy } => {
                debug!(url = %redact_stream_url(&url), %strategy, "Stream resolved");
                self.start_engine(url, strategy.as_str()).await;
            }
            ResolutionOutcome::Failed { reason } => {
                warn!(kind = %reason, state = %self.state, "Resolution failed");
                self.fail(reason);
            }
        }
    }

    async fn on_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Playing | EngineEvent::Stopped => self.clear_error(),
            EngineEvent::EndReached => {
                if self.state != PlaybackState::Playing {
                    return;
                }
                if let Some(item) = self.current.take() {
                    info!(item = %item, "Playback completed");
                    self.emit(PlaybackEvent::Completed {
                        title: item.title().to_string(),
                    });
                }
                self.clear_error();
                self.set_state(PlaybackState::Idle);
            }
            EngineEvent::EncounteredError => {
                if self.state != PlaybackState::Playing {
                    return;
                }
                self.on_engine_error();
            }
        }
    }

    fn on_engine_error(&mut self) {
        let Some(item) = self.current.clone() else {
            return;
        };

        if item.is_remote() && self.enable_fallback && !self.fallback_spent {
            warn!(item = %item, "Engine failed the stream, trying fallback resolver");
            self.fallback_spent = true;
            self.epoch += 1;
            self.set_error(ErrorKind::PlaybackEngineError, FALLBACK_NOTICE);
            self.set_state(PlaybackState::Degrading);
            self.emit(PlaybackEvent::FallbackStarted {
                title: item.title().to_string(),
            });
            self.spawn_resolve(item, ResolveAttempt::Fallback);
        } else {
            warn!(item = %item, "Engine failed the stream");
            self.fail(ErrorKind::PlaybackEngineError);
        }
    }

    async fn start_engine(&mut self, uri: String, strategy: &'static str) {
        if self.engine.is_none() {
            match self.engine_factory.create(self.engine_options) {
                Ok(engine) => {
                    info!(
                        hardware_decoding = self.engine_options.hardware_decoding,
                        "Playback engine created"
                    );
                    self.engine = Some(engine);
                }
                Err(error) => {
                    warn!(%error, "Failed to create playback engine");
                    self.fail(ErrorKind::EngineInitError);
                    return;
                }
            }
        }

        self.epoch += 1;
        let sink = self.engine_sink(self.epoch);
        let Some(engine) = self.engine.as_ref() else {
            return;
        };

        let accepted = engine.play(&uri, sink).await;
        match accepted {
            Ok(()) => {
                self.clear_error();
                self.set_state(PlaybackState::Playing);
                if let Some(item) = &self.current {
                    self.emit(PlaybackEvent::Started {
                        title: item.title().to_string(),
                        strategy: strategy.to_string(),
                    });
                }
            }
            Err(error) => {
                warn!(%error, strategy, "Engine rejected the stream");
                self.fail(ErrorKind::PlaybackEngineError);
            }
        }
    }

    async fn stop_engine(&mut self) {
        if let Some(engine) = self.engine.as_ref() {
            if let Err(error) = engine.stop().await {
                warn!(%error, "Engine stop failed");
            }
        }
    }

    /// Stop, detach, dispose. In that order.
    async fn dispose_engine(&mut self) {
        self.engine_stale = false;
        let Some(engine) = self.engine.take() else {
            return;
        };
        if let Err(error) = engine.stop().await {
            warn!(%error, "Engine stop failed during disposal");
        }
        if let Err(error) = engine.detach_surface().await {
            warn!(%error, "Engine surface detach failed during disposal");
        }
        if let Err(error) = engine.dispose().await {
            warn!(%error, "Engine dispose failed during disposal");
        }
        debug!("Playback engine disposed");
    }

    fn fail(&mut self, kind: ErrorKind) {
        self.set_error(kind, kind.user_message());
        self.set_state(PlaybackState::Failed);
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn engine_sink(&self, epoch: u64) -> EngineEventSink {
        let events = self.engine_events.clone();
        EngineEventSink::new(move |event| {
            match events.try_send(StampedEvent { epoch, event }) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(?event, epoch, "Engine event channel full, event dropped")
                }
                Err(TrySendError::Closed(_)) => {}
            }
        })
    }

    fn spawn_resolve(&mut self, item: MediaReference, attempt: ResolveAttempt) {
        self.cancel_in_flight();

        let epoch = self.epoch;
        let resolver = Arc::clone(&self.resolver);
        let inbox = self.inbox.clone();
        self.in_flight = Some(core_async::spawn(async move {
            let outcome = resolver.resolve(&item, attempt).await;
            let _ = inbox.send(ControlMessage::Resolved { epoch, outcome }).await;
        }));
    }

    fn spawn_info(&mut self, item: MediaReference) {
        let Some(source) = self.info_source.clone() else {
            return;
        };
        if let Some(task) = self.info_task.take() {
            task.abort();
        }

        let epoch = self.item_epoch;
        let inbox = self.inbox.clone();
        self.info_task = Some(core_async::spawn(async move {
            match source.fetch_info(item.source()).await {
                Ok(info) => {
                    let _ = inbox.send(ControlMessage::InfoLoaded { epoch, info }).await;
                }
                Err(error) => debug!(%error, "Media info unavailable"),
            }
        }));
    }

    fn cancel_in_flight(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state == state {
            return;
        }
        debug!(from = %self.state, to = %state, epoch = self.epoch, "State changed");
        self.state = state;
        self.emit(PlaybackEvent::StateChanged {
            state: state.to_string(),
        });
    }

    fn set_error(&mut self, kind: ErrorKind, message: &str) {
        self.error.set(message);
        self.emit(PlaybackEvent::Error {
            kind: kind.to_string(),
            message: message.to_string(),
        });
    }

    fn clear_error(&mut self) {
        if self.error.is_active() {
            self.emit(PlaybackEvent::ErrorCleared);
        }
        self.error.clear();
    }

    fn emit(&self, event: PlaybackEvent) {
        self.events.emit(CoreEvent::Playback(event)).ok();
    }

    fn emit_queue(&self, event: QueueEvent) {
        self.events.emit(CoreEvent::Queue(event)).ok();
    }

    fn publish(&self) {
        self.snapshot.send_replace(ControllerSnapshot {
            state: self.state,
            current: self.current.clone(),
            error_message: self.error.message().to_string(),
            queue_len: self.queue.len(),
        });
    }

    async fn teardown(&mut self) {
        self.cancel_in_flight();
        if let Some(task) = self.info_task.take() {
            task.abort();
        }

        self.dispose_engine().await;

        self.current = None;
        self.state = PlaybackState::Idle;
        self.publish();
        info!("Playback controller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names() {
        assert_eq!(PlaybackState::default(), PlaybackState::Idle);
        assert_eq!(PlaybackState::Degrading.to_string(), "Degrading");
    }

    #[test]
    fn empty_snapshot() {
        let snapshot = ControllerSnapshot::default();
        assert_eq!(snapshot.state, PlaybackState::Idle);
        assert!(snapshot.current.is_none());
        assert!(snapshot.error_message.is_empty());
        assert_eq!(snapshot.queue_len, 0);
    }
}
