//! # Host Bridge Traits
//!
//! Contracts between the Reelcast core and the host application.
//!
//! ## Overview
//!
//! The core never talks to the network, the filesystem or the host logger
//! directly. Each capability it needs is a trait here, implemented per host
//! (`bridge-desktop` ships the desktop defaults).
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP used by the remote stream lookup
//! - [`SettingsStore`](settings::SettingsStore) - Load/save of [`PlayerSettings`](settings::PlayerSettings)
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits report failures as [`BridgeError`](error::BridgeError).
//! Implementations convert platform errors into it and keep the message
//! actionable (URL, path, status).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`; the core shares them across tasks
//! behind `Arc`.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct MyHttpClient {
//!     client: reqwest::Client,
//! }
//!
//! #[async_trait]
//! impl HttpClient for MyHttpClient {
//!     async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
//!         todo!()
//!     }
//! }
//! ```

pub mod error;
pub mod http;
pub mod logging;
pub mod settings;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use settings::{PlayerSettings, SettingsStore};
