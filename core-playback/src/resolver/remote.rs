//! Stream lookup through the remote download API.

use crate::config::PlaybackConfig;
use crate::error::{ErrorKind, PlaybackError, Result};
use crate::media::MediaReference;
use crate::traits::{
    MediaInfo, MediaInfoSource, ResolutionOutcome, ResolutionStrategy, ResolveAttempt,
    StreamResolver,
};
use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::logging::redact_stream_url;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resolves remote references with `GET {base}/api/download?url=...`.
///
/// Also serves `GET {base}/api/info?url=...` for descriptive metadata.
pub struct RemoteApiResolver {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

impl RemoteApiResolver {
    pub fn new(http_client: Arc<dyn HttpClient>, config: &PlaybackConfig) -> Self {
        Self {
            http_client,
            base_url: config.api_base().to_string(),
            user_agent: config.user_agent.clone(),
            timeout: config.request_timeout,
        }
    }

    fn endpoint(&self, path: &str, source: &str) -> String {
        format!(
            "{}/api/{}?url={}",
            self.base_url,
            path,
            urlencoding::encode(source)
        )
    }

    async fn get_json(&self, url: String) -> Result<Value> {
        let request = HttpRequest::get(url)
            .user_agent(self.user_agent.as_str())
            .header("Accept", "application/json")
            .timeout(self.timeout);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| PlaybackError::Network(e.to_string()))?;

        if !response.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(PlaybackError::Network(format!(
                "HTTP {}: {}",
                response.status,
                detail.chars().take(200).collect::<String>()
            )));
        }

        let value: Value = response
            .json()
            .map_err(|e| PlaybackError::Parse(e.to_string()))?;
        if !value.is_object() {
            return Err(PlaybackError::Parse(format!(
                "expected a JSON object, got {}",
                json_type(&value)
            )));
        }
        Ok(lowercase_keys(value))
    }

    /// Look up the direct stream URL for `source`.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::Network`] on transport failure or non-2xx status
    /// - [`PlaybackError::Parse`] on malformed JSON
    /// - [`PlaybackError::NoStreamFound`] when no URL field is usable
    pub async fn lookup(&self, source: &str) -> Result<String> {
        debug!(source, "Requesting stream from lookup service");
        let body = self.get_json(self.endpoint("download", source)).await?;

        let response: DownloadResponse =
            serde_json::from_value(body).map_err(|e| PlaybackError::Parse(e.to_string()))?;

        match response.stream_url() {
            Some(url) => {
                info!(
                    title = %response.title,
                    url = %redact_stream_url(url),
                    "Lookup service returned a stream"
                );
                Ok(url.to_string())
            }
            None => {
                debug!(
                    status = %response.status,
                    message = %response.message,
                    "Lookup response carried no stream URL"
                );
                Err(PlaybackError::NoStreamFound(source.to_string()))
            }
        }
    }
}

#[async_trait]
impl StreamResolver for RemoteApiResolver {
    async fn resolve(
        &self,
        reference: &MediaReference,
        _attempt: ResolveAttempt,
    ) -> ResolutionOutcome {
        match self.lookup(reference.source()).await {
            Ok(url) => ResolutionOutcome::Resolved {
                url,
                strategy: ResolutionStrategy::Remote,
            },
            Err(error) => {
                warn!(source = reference.source(), %error, "Remote stream lookup failed");
                ResolutionOutcome::failed(error.kind().unwrap_or(ErrorKind::NetworkError))
            }
        }
    }
}

#[async_trait]
impl MediaInfoSource for RemoteApiResolver {
    async fn fetch_info(&self, source: &str) -> Result<MediaInfo> {
        let body = self.get_json(self.endpoint("info", source)).await?;
        let info: InfoResponse =
            serde_json::from_value(body).map_err(|e| PlaybackError::Parse(e.to_string()))?;
        Ok(info.into())
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[allow(dead_code)]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DownloadResponse {
    #[serde(deserialize_with = "lenient_string")]
    title: String,
    #[serde(deserialize_with = "lenient_string")]
    url: String,
    #[serde(deserialize_with = "lenient_string")]
    video_url: String,
    #[serde(deserialize_with = "lenient_string")]
    audio_url: String,
    #[serde(deserialize_with = "lenient_streams")]
    streams: Vec<StreamEntry>,
    #[serde(deserialize_with = "lenient_string")]
    message: String,
    #[serde(deserialize_with = "lenient_string")]
    status: String,
}

impl DownloadResponse {
    /// `video_url`, then `url`, then the first stream entry.
    fn stream_url(&self) -> Option<&str> {
        non_empty(&self.video_url)
            .or_else(|| non_empty(&self.url))
            .or_else(|| self.streams.first().and_then(|entry| non_empty(&entry.url)))
    }
}

#[allow(dead_code)]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StreamEntry {
    #[serde(deserialize_with = "lenient_string")]
    format_id: String,
    #[serde(deserialize_with = "lenient_string")]
    format: String,
    #[serde(deserialize_with = "lenient_string")]
    url: String,
    #[serde(deserialize_with = "lenient_string")]
    quality: String,
    #[serde(deserialize_with = "lenient_string")]
    ext: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InfoResponse {
    #[serde(deserialize_with = "lenient_string")]
    title: String,
    #[serde(deserialize_with = "lenient_string")]
    url: String,
    #[serde(deserialize_with = "lenient_seconds")]
    duration: Option<u64>,
    #[serde(deserialize_with = "lenient_string")]
    thumbnail: String,
    #[serde(deserialize_with = "lenient_string")]
    channel: String,
    #[serde(deserialize_with = "lenient_string")]
    upload_date: String,
    #[serde(deserialize_with = "lenient_string")]
    description: String,
}

impl From<InfoResponse> for MediaInfo {
    fn from(info: InfoResponse) -> Self {
        let optional = |s: String| (!s.trim().is_empty()).then_some(s);
        MediaInfo {
            title: if info.title.trim().is_empty() {
                info.url
            } else {
                info.title
            },
            channel: optional(info.channel),
            duration_secs: info.duration,
            thumbnail: optional(info.thumbnail),
            upload_date: optional(info.upload_date),
            description: optional(info.description),
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Lowercase every object key so field matching is case-insensitive.
fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_lowercase(), lowercase_keys(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Entries keep their position; anything that is not an object becomes an
/// empty entry.
fn lenient_streams<'de, D>(deserializer: D) -> std::result::Result<Vec<StreamEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            Value::Object(_) => StreamEntry::deserialize(entry).unwrap_or_default(),
            _ => StreamEntry::default(),
        })
        .collect())
}

/// Strings stay strings, numbers are rendered, anything else is empty.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_seconds<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(seconds
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map(|s| s.round() as u64))
}
