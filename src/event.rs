//! Inbound events and per-pass render context

use serde::{Deserialize, Serialize};

use crate::context::SessionId;

/// Platform message identifier; grows monotonically within a chat
pub type MessageId = i64;

/// An inbound content message typed by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub message_id: MessageId,
    pub text: Option<String>,
}

/// A button press on an inline control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    /// Platform query id, used by the transport to acknowledge the press
    pub id: String,
    /// Callback payload attached to the pressed control
    pub data: String,
    /// Message carrying the pressed control, if the platform reports it
    pub message_id: Option<MessageId>,
}

/// The event that triggered a render pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Message(InboundMessage),
    Callback(CallbackQuery),
    /// Dialog started or switched programmatically, no inbound update
    Start,
}

impl Event {
    pub fn message(message_id: MessageId, text: impl Into<String>) -> Self {
        Event::Message(InboundMessage {
            message_id,
            text: Some(text.into()),
        })
    }

    pub fn callback(data: impl Into<String>) -> Self {
        Event::Callback(CallbackQuery {
            id: uuid::Uuid::new_v4().to_string(),
            data: data.into(),
            message_id: None,
        })
    }

    /// Id of the inbound content message, if this is one
    pub fn content_message_id(&self) -> Option<MessageId> {
        match self {
            Event::Message(msg) => Some(msg.message_id),
            _ => None,
        }
    }
}

/// Caller override for how the next render is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShowMode {
    /// Let the ordering rules decide
    #[default]
    Auto,
    /// Prefer editing the displayed message
    Edit,
    /// Always send a fresh message
    Send,
}

/// Ephemeral context for one render pass
///
/// Carries what predicates and widgets may inspect besides the data mapping.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub session_id: SessionId,
    pub event: Event,
    pub show_mode: ShowMode,
    /// Window state being rendered
    pub state: String,
}

impl RenderContext {
    pub fn new(session_id: SessionId, event: Event) -> Self {
        Self {
            session_id,
            event,
            show_mode: ShowMode::Auto,
            state: String::new(),
        }
    }

    pub fn with_show_mode(mut self, show_mode: ShowMode) -> Self {
        self.show_mode = show_mode;
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }
}
