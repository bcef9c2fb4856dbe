//! Media references: what the user queued.

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Where a reference points.
///
/// Only `Remote` references go through stream resolution; `Local` sources
/// are handed to the engine as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    /// A web page or video link that must be resolved to a stream URL.
    Remote,
    /// A file path the engine can open directly.
    Local,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Remote => "Remote",
            MediaKind::Local => "Local",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable queued item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    title: String,
    source: String,
    kind: MediaKind,
}

impl MediaReference {
    /// Build a reference. A blank `title` falls back to the source.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::InvalidReference`] if `source` is blank.
    pub fn new(title: impl Into<String>, source: impl Into<String>, kind: MediaKind) -> Result<Self> {
        let source = source.into().trim().to_string();
        if source.is_empty() {
            return Err(PlaybackError::InvalidReference(
                "source must not be empty".to_string(),
            ));
        }

        let title = title.into().trim().to_string();
        let title = if title.is_empty() { source.clone() } else { title };

        Ok(Self {
            title,
            source,
            kind,
        })
    }

    /// A remote link, titled by the link itself until info arrives.
    pub fn remote(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        Self::new(source.clone(), source, MediaKind::Remote)
    }

    /// A local file, titled by its file name.
    pub fn local(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = path.to_string_lossy().into_owned();
        let title = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(title, source, MediaKind::Local)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn is_remote(&self) -> bool {
        self.kind == MediaKind::Remote
    }
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_source() {
        assert!(matches!(
            MediaReference::new("title", "   ", MediaKind::Remote),
            Err(PlaybackError::InvalidReference(_))
        ));
        assert!(MediaReference::remote("").is_err());
    }

    #[test]
    fn remote_title_defaults_to_source() {
        let item = MediaReference::remote("https://example.com/watch?v=abc").unwrap();
        assert_eq!(item.title(), "https://example.com/watch?v=abc");
        assert_eq!(item.kind(), MediaKind::Remote);
        assert!(item.is_remote());
    }

    #[test]
    fn local_title_is_file_name() {
        let item = MediaReference::local("/home/me/Videos/talk.mkv").unwrap();
        assert_eq!(item.title(), "talk.mkv");
        assert_eq!(item.source(), "/home/me/Videos/talk.mkv");
        assert_eq!(item.kind(), MediaKind::Local);
    }

    #[test]
    fn display_includes_kind() {
        let remote = MediaReference::new("Keynote", "https://x/y", MediaKind::Remote).unwrap();
        let local = MediaReference::local("clip.mp4").unwrap();

        assert_eq!(remote.to_string(), "[Remote] Keynote");
        assert_eq!(local.to_string(), "[Local] clip.mp4");
    }

    #[test]
    fn blank_title_falls_back_to_source() {
        let item = MediaReference::new(" ", "/tmp/a.mp4", MediaKind::Local).unwrap();
        assert_eq!(item.title(), "/tmp/a.mp4");
    }
}
