//! Typed-message input

use std::sync::Arc;

use super::Widget;
use crate::context::SessionContext;
use crate::event::InboundMessage;
use crate::when::{Predicate, When, Whenable};

/// Called with each typed message the window receives
pub type MessageHandler = Arc<dyn Fn(&InboundMessage, &mut SessionContext) + Send + Sync>;

/// Captures text messages sent while its window is shown
pub struct MessageInput {
    id: String,
    handler: MessageHandler,
    text_only: bool,
    predicate: Predicate,
}

impl MessageInput {
    pub fn new<F>(id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&InboundMessage, &mut SessionContext) + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            handler: Arc::new(handler),
            text_only: true,
            predicate: Predicate::always(),
        }
    }

    /// Also accept messages without text (stickers, files)
    pub fn any_content(mut self) -> Self {
        self.text_only = false;
        self
    }

    pub fn when(mut self, cond: impl Into<When>) -> Self {
        self.predicate = cond.into().resolve();
        self
    }
}

impl Whenable for MessageInput {
    fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn widget_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl Widget for MessageInput {
    fn process_message(&self, message: &InboundMessage, session: &mut SessionContext) -> bool {
        if self.text_only && message.text.is_none() {
            return false;
        }
        (self.handler)(message, session);
        true
    }
}
