//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! - `HttpClient` using `reqwest`
//! - `SettingsStore` backed by a JSON file in the user config directory
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{JsonSettingsStore, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let settings = JsonSettingsStore::in_config_dir()?;
//!
//!     // Hand both to CoreConfig::builder()
//!     Ok(())
//! }
//! ```

mod http;
mod settings;

pub use http::ReqwestHttpClient;
pub use settings::JsonSettingsStore;
