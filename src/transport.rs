//! Outbound delivery collaborator

use async_trait::async_trait;

use crate::context::SessionId;
use crate::error::TransportError;
use crate::event::MessageId;
use crate::window::RenderDecision;

/// Result of a successful send or edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    /// Id of the message now showing the dialog
    pub message_id: MessageId,
    /// Remote id the platform assigned to uploaded media, if any
    pub media_id: Option<String>,
}

/// Performs the platform-specific send or edit
///
/// Retries, rate limiting and markup encoding are the implementation's
/// business.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(
        &self,
        session_id: &SessionId,
        decision: &RenderDecision,
    ) -> Result<Delivered, TransportError>;

    /// Delete a user message, used when the window removes stray input
    async fn delete_message(
        &self,
        session_id: &SessionId,
        message_id: MessageId,
    ) -> Result<(), TransportError>;
}
