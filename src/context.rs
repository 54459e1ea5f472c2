//! Per-session dialog context and its store
//!
//! Widget state lives here, keyed by widget id inside the session's
//! context, never on the widget itself. That keeps one widget definition
//! safe to share across any number of concurrent sessions.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::MessageId;
use crate::paginate::{Pagination, Paginator};

/// Identity under which dialog state and message ordering are tracked
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Chat ids make natural session ids
impl From<i64> for SessionId {
    fn from(chat_id: i64) -> Self {
        Self(chat_id.to_string())
    }
}

/// Pages computed for one text, tagged with that text's fingerprint
///
/// The byte length is kept next to the hash so ranges are never reused
/// for a text they don't fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPages {
    fingerprint: u64,
    text_len: usize,
    pub pagination: Pagination,
}

/// Paging state of one widget within one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub pages: Option<CachedPages>,
    /// Requested page; may exceed the last page until the next render
    pub current_page: usize,
}

impl PageState {
    /// Pages for `text`, reusing the cache while the text is unchanged
    pub fn pages_for(&mut self, text: &str, paginator: &Paginator) -> &Pagination {
        let fingerprint = fingerprint(text, paginator);
        let cached = match self.pages.take() {
            Some(cached) if cached.fingerprint == fingerprint && cached.text_len == text.len() => {
                cached
            }
            _ => {
                tracing::debug!(bytes = text.len(), "computing pages");
                CachedPages {
                    fingerprint,
                    text_len: text.len(),
                    pagination: paginator.paginate(text),
                }
            }
        };
        &self.pages.insert(cached).pagination
    }
}

fn fingerprint(text: &str, paginator: &Paginator) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    paginator.limit().hash(&mut hasher);
    paginator.cascade().hash(&mut hasher);
    hasher.finish()
}

/// Everything remembered about one session between events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: SessionId,
    /// Window state currently shown
    pub state: Option<String>,
    /// Widget state keyed by widget id
    pub widget_data: HashMap<String, PageState>,
    last_message_id: Option<MessageId>,
}

impl SessionContext {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            state: None,
            widget_data: HashMap::new(),
            last_message_id: None,
        }
    }

    pub fn widget_state(&self, widget_id: &str) -> PageState {
        self.widget_data.get(widget_id).cloned().unwrap_or_default()
    }

    pub fn set_widget_state(&mut self, widget_id: impl Into<String>, state: PageState) {
        self.widget_data.insert(widget_id.into(), state);
    }

    /// Mutable state for `widget_id`, created on first use
    pub fn widget_state_mut(&mut self, widget_id: &str) -> &mut PageState {
        self.widget_data.entry(widget_id.to_string()).or_default()
    }

    /// Id of the last message the dialog delivered in this session
    pub fn last_delivered_message_id(&self) -> Option<MessageId> {
        self.last_message_id
    }

    /// Record a delivered message; the id never moves backwards
    pub fn record_delivered(&mut self, message_id: MessageId) {
        self.last_message_id = Some(match self.last_message_id {
            Some(prev) => prev.max(message_id),
            None => message_id,
        });
    }
}

/// Storage for session contexts
///
/// Lifecycle of stored contexts is up to the implementation; the dialog only
/// loads one at the start of a pass and saves it at the end.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Load the context, or a fresh one if none is stored
    async fn load(&self, session_id: &SessionId) -> Result<SessionContext>;

    async fn save(&self, context: &SessionContext) -> Result<()>;

    async fn remove(&self, session_id: &SessionId) -> Result<()>;
}

/// In-process context store
#[derive(Debug, Default)]
pub struct MemoryContextStore {
    contexts: DashMap<SessionId, SessionContext>,
}

impl MemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[async_trait]
impl ContextStore for MemoryContextStore {
    async fn load(&self, session_id: &SessionId) -> Result<SessionContext> {
        Ok(self
            .contexts
            .get(session_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| SessionContext::new(session_id.clone())))
    }

    async fn save(&self, context: &SessionContext) -> Result<()> {
        self.contexts
            .insert(context.session_id.clone(), context.clone());
        Ok(())
    }

    async fn remove(&self, session_id: &SessionId) -> Result<()> {
        self.contexts.remove(session_id);
        Ok(())
    }
}
