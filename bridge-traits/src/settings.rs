//! Player settings persistence.
//!
//! The core keeps a single user preference: whether the playback engine
//! should use hardware-accelerated decoding. Hosts decide where it lives
//! (a JSON file on desktop).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Persisted player preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayerSettings {
    /// Ask the engine for hardware-accelerated decoding.
    #[serde(default = "default_use_hardware_decoding")]
    pub use_hardware_decoding: bool,
}

fn default_use_hardware_decoding() -> bool {
    true
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            use_hardware_decoding: default_use_hardware_decoding(),
        }
    }
}

/// Settings storage trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::settings::{PlayerSettings, SettingsStore};
///
/// async fn disable_hw(store: &dyn SettingsStore) -> Result<()> {
///     let mut settings = store.load().await?;
///     settings.use_hardware_decoding = false;
///     store.save(&settings).await
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load settings. A missing store yields `PlayerSettings::default()`.
    async fn load(&self) -> Result<PlayerSettings>;

    /// Persist settings, replacing whatever was stored.
    async fn save(&self, settings: &PlayerSettings) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_hardware_decoding() {
        assert!(PlayerSettings::default().use_hardware_decoding);
    }

    #[test]
    fn missing_field_defaults_to_true() {
        let settings: PlayerSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.use_hardware_decoding);
    }

    #[test]
    fn serializes_with_pascal_case_key() {
        let json = serde_json::to_string(&PlayerSettings {
            use_hardware_decoding: false,
        })
        .unwrap();
        assert_eq!(json, r#"{"UseHardwareDecoding":false}"#);
    }
}
