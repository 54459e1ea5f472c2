//! Media attachments and the remote-id cache
//!
//! Uploading the same local file twice is wasteful: once the platform has
//! assigned an id to `(path, type)` we reuse it. The cache is shared by all
//! sessions; concurrent inserts for one key are harmless because the same
//! file always maps to an equivalent remote id.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Kind of media attached to a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Photo,
    Video,
    Animation,
    Audio,
    Document,
    Voice,
}

/// Media to show above the message text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub media_type: MediaType,
    /// Local file to upload
    pub path: Option<String>,
    /// Remote URL the platform fetches itself
    pub url: Option<String>,
    /// Platform id from an earlier upload
    pub file_id: Option<String>,
}

impl MediaAttachment {
    pub fn from_path(media_type: MediaType, path: impl Into<String>) -> Self {
        Self {
            media_type,
            path: Some(path.into()),
            url: None,
            file_id: None,
        }
    }

    pub fn from_url(media_type: MediaType, url: impl Into<String>) -> Self {
        Self {
            media_type,
            path: None,
            url: Some(url.into()),
            file_id: None,
        }
    }
}

/// Cache of remote ids keyed by `(path, media type)`
///
/// A missing path makes both operations no-ops.
#[async_trait]
pub trait MediaIdCache: Send + Sync {
    async fn get(&self, path: Option<&str>, media_type: MediaType) -> Option<String>;

    async fn put(&self, path: Option<&str>, media_type: MediaType, remote_id: String);
}

/// In-process media id cache
#[derive(Debug, Default)]
pub struct MemoryMediaIdCache {
    ids: DashMap<(String, MediaType), String>,
}

impl MemoryMediaIdCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[async_trait]
impl MediaIdCache for MemoryMediaIdCache {
    async fn get(&self, path: Option<&str>, media_type: MediaType) -> Option<String> {
        let path = path.filter(|p| !p.is_empty())?;
        self.ids
            .get(&(path.to_string(), media_type))
            .map(|entry| entry.value().clone())
    }

    async fn put(&self, path: Option<&str>, media_type: MediaType, remote_id: String) {
        let Some(path) = path.filter(|p| !p.is_empty()) else {
            return;
        };
        self.ids.insert((path.to_string(), media_type), remote_id);
    }
}
