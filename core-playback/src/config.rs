//! # Playback Configuration
//!
//! Endpoints, time budgets and channel sizes for resolution and control.

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback core configuration.
///
/// Every field has a serde default, so a partial JSON/TOML document is
/// enough to override a single value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Base URL of the stream lookup service (no trailing slash needed).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// `User-Agent` sent with every lookup request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upper bound for one lookup request.
    ///
    /// Default: 30 seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// Program launched for fallback resolution.
    #[serde(default = "default_fallback_program")]
    pub fallback_program: String,

    /// Wall-clock budget for the fallback process, measured from launch.
    ///
    /// Default: 8 seconds.
    #[serde(default = "default_fallback_timeout")]
    pub fallback_timeout: Duration,

    /// How long an error message stays visible unless replaced or cleared.
    ///
    /// Default: 8 seconds.
    #[serde(default = "default_error_display_duration")]
    pub error_display_duration: Duration,

    /// Capacity of the controller's inbound message channel.
    ///
    /// Engine events that arrive while it is full are dropped with a warning.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Fetch descriptive info (`/api/info`) alongside each remote lookup.
    #[serde(default = "default_fetch_video_info")]
    pub fetch_video_info: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
            fallback_program: default_fallback_program(),
            fallback_timeout: default_fallback_timeout(),
            error_display_duration: default_error_display_duration(),
            command_buffer: default_command_buffer(),
            fetch_video_info: default_fetch_video_info(),
        }
    }
}

impl PlaybackConfig {
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_fallback_program(mut self, program: impl Into<String>) -> Self {
        self.fallback_program = program.into();
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(PlaybackError::Config("api_base_url must not be empty".into()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(PlaybackError::Config(
                "api_base_url must be an http(s) URL".into(),
            ));
        }

        if self.user_agent.trim().is_empty() {
            return Err(PlaybackError::Config("user_agent must not be empty".into()));
        }

        if self.fallback_program.trim().is_empty() {
            return Err(PlaybackError::Config(
                "fallback_program must not be empty".into(),
            ));
        }

        if self.request_timeout.is_zero() || self.fallback_timeout.is_zero() {
            return Err(PlaybackError::Config("timeouts must be > 0".into()));
        }

        if self.error_display_duration.is_zero() {
            return Err(PlaybackError::Config(
                "error_display_duration must be > 0".into(),
            ));
        }

        if self.command_buffer == 0 {
            return Err(PlaybackError::Config("command_buffer must be > 0".into()));
        }

        Ok(())
    }

    /// Base URL with any trailing slashes removed.
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim().trim_end_matches('/')
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_api_base_url() -> String {
    "https://ytdl.delphigamerz.xyz".to_string()
}

fn default_user_agent() -> String {
    concat!("Reelcast/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_fallback_program() -> String {
    "yt-dlp".to_string()
}

fn default_fallback_timeout() -> Duration {
    Duration::from_secs(8)
}

fn default_error_display_duration() -> Duration {
    Duration::from_secs(8)
}

fn default_command_buffer() -> usize {
    64
}

fn default_fetch_video_info() -> bool {
    true
}
