//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, settings,
//! logging) and a native engine factory into the playback core. Desktop apps
//! typically enable the `desktop-shims` feature, which fills in
//! `bridge-desktop` defaults for any bridge the host does not inject.
//!
//! ```ignore
//! let service = CoreService::builder(engine_factory)
//!     .core_config(CoreConfig::builder().build()?)
//!     .build()
//!     .await?;
//!
//! service.enqueue_remote("https://video.example.com/watch?v=abc").await?;
//! service.controller().play_next().await?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use std::path::Path;
use std::sync::Arc;

use bridge_traits::settings::{PlayerSettings, SettingsStore};
use core_async::sync::Mutex;
use core_playback::{
    ControllerHandle, ControllerSnapshot, EngineFactory, EngineOptions, MediaReference,
    PlaybackConfig, PlaybackController, RemoteApiResolver, ResolverChain, SubprocessResolver,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream};
use core_runtime::logging::{init_logging, LoggingConfig};
use tracing::{debug, info, warn};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    controller: ControllerHandle,
    events: EventBus,
    settings_store: Arc<dyn SettingsStore>,
    settings: Arc<Mutex<PlayerSettings>>,
}

impl CoreService {
    pub fn builder(engine_factory: Arc<dyn EngineFactory>) -> CoreServiceBuilder {
        CoreServiceBuilder {
            engine_factory,
            core: None,
            playback: PlaybackConfig::default(),
            logging: None,
        }
    }

    /// Handle to the playback controller.
    pub fn controller(&self) -> &ControllerHandle {
        &self.controller
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        self.controller.snapshot()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe_events(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    /// Queue a web link for remote resolution.
    pub async fn enqueue_remote(&self, url: impl Into<String>) -> Result<()> {
        let reference = MediaReference::remote(url)?;
        self.controller.enqueue(reference).await?;
        Ok(())
    }

    /// Queue a file the engine can open directly.
    pub async fn enqueue_local(&self, path: impl AsRef<Path>) -> Result<()> {
        let reference = MediaReference::local(path)?;
        self.controller.enqueue(reference).await?;
        Ok(())
    }

    pub async fn hardware_decoding(&self) -> bool {
        self.settings.lock().await.use_hardware_decoding
    }

    /// Persist the hardware decoding preference and apply it to the next
    /// engine session.
    ///
    /// A failed save is logged and otherwise ignored.
    pub async fn set_hardware_decoding(&self, enabled: bool) -> Result<()> {
        let snapshot = {
            let mut settings = self.settings.lock().await;
            settings.use_hardware_decoding = enabled;
            settings.clone()
        };

        if let Err(error) = self.settings_store.save(&snapshot).await {
            warn!(%error, "Failed to save player settings");
        }

        self.controller
            .set_engine_options(EngineOptions {
                hardware_decoding: enabled,
            })
            .await?;
        info!(enabled, "Hardware decoding preference updated");
        Ok(())
    }

    /// Stop playback, release the engine and end the controller.
    pub async fn shutdown(&self) -> Result<()> {
        self.controller.shutdown().await?;
        info!("Core service shut down");
        Ok(())
    }
}

/// Assembles a [`CoreService`] from configuration and bridges.
pub struct CoreServiceBuilder {
    engine_factory: Arc<dyn EngineFactory>,
    core: Option<CoreConfig>,
    playback: PlaybackConfig,
    logging: Option<LoggingConfig>,
}

impl CoreServiceBuilder {
    /// Bridges and feature flags. Defaults to `CoreConfig::builder().build()`.
    pub fn core_config(mut self, config: CoreConfig) -> Self {
        self.core = Some(config);
        self
    }

    pub fn playback_config(mut self, config: PlaybackConfig) -> Self {
        self.playback = config;
        self
    }

    /// Install the global tracing subscriber during `build`.
    ///
    /// The core config's logger sink is attached unless this config
    /// already names one.
    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// Load settings and start the playback controller.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InitializationFailed`] outside of a runtime
    /// - [`CoreError::Runtime`] if the default core config cannot be built
    /// - [`CoreError::Playback`] if the playback config is invalid
    pub async fn build(self) -> Result<CoreService> {
        core_async::runtime::Handle::try_current()
            .map_err(|e| CoreError::InitializationFailed(e.to_string()))?;

        let core = match self.core {
            Some(core) => core,
            None => CoreConfig::builder().build()?,
        };
        core.validate()?;
        self.playback.validate()?;

        if let Some(mut logging) = self.logging {
            if logging.logger_sink.is_none() {
                if let Some(sink) = core.logger_sink.clone() {
                    logging = logging.with_logger_sink(sink);
                }
            }
            if let Err(error) = init_logging(logging) {
                warn!(%error, "Logging already initialized; keeping existing subscriber");
            }
        }

        let settings = match core.settings_store.load().await {
            Ok(settings) => settings,
            Err(error) => {
                warn!(%error, "Failed to load player settings, using defaults");
                PlayerSettings::default()
            }
        };
        debug!(
            hardware_decoding = settings.use_hardware_decoding,
            "Player settings loaded"
        );

        let remote = Arc::new(RemoteApiResolver::new(
            Arc::clone(&core.http_client),
            &self.playback,
        ));
        let resolver = if core.features.enable_fallback_resolver {
            ResolverChain::new(
                remote.clone(),
                Arc::new(SubprocessResolver::from_config(&self.playback)),
            )
        } else {
            ResolverChain::primary_only(remote.clone())
        };

        let events = EventBus::new(core.event_buffer_size);
        let mut controller = PlaybackController::builder(Arc::new(resolver), self.engine_factory)
            .event_bus(events.clone())
            .engine_options(EngineOptions {
                hardware_decoding: settings.use_hardware_decoding,
            })
            .enable_fallback(core.features.enable_fallback_resolver);
        if core.features.enable_video_info {
            controller = controller.info_source(remote);
        }
        let controller = controller.spawn(&self.playback)?;

        info!(
            api = %self.playback.api_base(),
            fallback = core.features.enable_fallback_resolver,
            "Core service started"
        );

        Ok(CoreService {
            controller,
            events,
            settings_store: core.settings_store,
            settings: Arc::new(Mutex::new(settings)),
        })
    }
}
