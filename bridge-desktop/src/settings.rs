//! Settings Storage using a JSON file

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    settings::{PlayerSettings, SettingsStore},
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "reelcast";
const SETTINGS_FILE: &str = "settings.json";

/// File-backed settings store.
///
/// Settings live in one small JSON document. Writes go to a sibling temp
/// file which is then renamed over the target, so a crash mid-write leaves
/// the previous document intact.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    /// Store at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform configuration directory
    /// (`~/.config/reelcast/settings.json` on Linux).
    pub fn in_config_dir() -> Result<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            BridgeError::NotAvailable("No configuration directory on this platform".to_string())
        })?;
        Ok(Self::new(base.join(APP_DIR).join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| SETTINGS_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn load(&self) -> Result<PlayerSettings> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "No settings file, using defaults");
                return Ok(PlayerSettings::default());
            }
            Err(e) => return Err(BridgeError::Io(e)),
        };

        let settings: PlayerSettings = serde_json::from_slice(&raw)?;
        debug!(path = ?self.path, ?settings, "Loaded settings");
        Ok(settings)
    }

    async fn save(&self, settings: &PlayerSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(settings)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!(path = ?self.path, "Saved settings");
        Ok(())
    }
}
