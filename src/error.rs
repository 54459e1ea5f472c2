//! Error types for dialog rendering
//!
//! Everything raised by the core is synchronous and carries the session or
//! widget id it concerns, so callers can log it without extra context.

use thiserror::Error;

use crate::context::SessionId;

/// Errors raised while building or rendering a dialog
#[derive(Debug, Error)]
pub enum DialogError {
    /// The data loader failed; the render pass was aborted before any
    /// outbound action.
    #[error("failed to load data for session {session_id}: {source}")]
    DataLoadFailure {
        session_id: SessionId,
        #[source]
        source: anyhow::Error,
    },

    /// A navigation payload did not parse as `<id>:<page>`.
    #[error("malformed navigation payload: {payload:?}")]
    MalformedNavigationPayload { payload: String },

    /// A reply-capture prompt was combined with inline controls.
    #[error("widget {widget_id} requests a reply prompt alongside inline controls (session {session_id})")]
    ConflictingControlConfiguration {
        session_id: SessionId,
        widget_id: String,
    },

    /// Paginator built with a zero limit or an empty delimiter cascade.
    #[error("invalid pagination input: {reason}")]
    PaginationInputInvalid { reason: String },

    /// The session points at a window state the dialog doesn't have.
    #[error("unknown dialog state {state:?}")]
    UnknownState { state: String },

    /// The session context store failed.
    #[error("context store failed for session {session_id}: {source}")]
    Store {
        session_id: SessionId,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failure reported by the transport collaborator
#[derive(Debug, Error)]
pub enum TransportError {
    /// The platform rejected the edit (message gone, too old, unchanged)
    #[error("edit rejected: {0}")]
    EditRejected(String),

    #[error("send failed: {0}")]
    SendFailed(String),
}

pub type Result<T, E = DialogError> = std::result::Result<T, E>;
