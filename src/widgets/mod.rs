//! Widgets: composable pieces of a window
//!
//! A widget may contribute a text fragment, keyboard rows, a reply prompt
//! or media, and may consume button presses or typed messages. Everything
//! it remembers between events goes into the session context, so a single
//! widget value is shared by all sessions.

mod input;
mod kbd;
mod media;
mod scrolling;
mod text;

pub use input::{MessageHandler, MessageInput};
pub use kbd::{Button, ClickHandler, ForceReply, ReplyPrompt, Row};
pub use media::StaticMedia;
pub use scrolling::ScrollingText;
pub use text::{format_template, Const, Format, Multi};

use crate::context::SessionContext;
use crate::data::Data;
use crate::event::{CallbackQuery, InboundMessage, RenderContext};
use crate::media::MediaAttachment;
use crate::pager::Keyboard;
use crate::when::Whenable;

/// A renderable, possibly interactive, piece of a window
///
/// Callers check [`Whenable::is_visible`] before rendering; the render
/// methods themselves don't.
pub trait Widget: Whenable + Send + Sync {
    fn render_text(
        &self,
        _data: &Data,
        _ctx: &RenderContext,
        _session: &mut SessionContext,
    ) -> Option<String> {
        None
    }

    fn render_keyboard(
        &self,
        _data: &Data,
        _ctx: &RenderContext,
        _session: &mut SessionContext,
    ) -> Keyboard {
        Vec::new()
    }

    /// Reply-capture prompt, if this widget asks for one
    fn reply_prompt(&self, _data: &Data) -> Option<ReplyPrompt> {
        None
    }

    fn render_media(&self, _data: &Data, _ctx: &RenderContext) -> Option<MediaAttachment> {
        None
    }

    /// Handle a button press; `true` means consumed
    fn process_callback(&self, _query: &CallbackQuery, _session: &mut SessionContext) -> bool {
        false
    }

    /// Handle a typed message; `true` means consumed
    fn process_message(&self, _message: &InboundMessage, _session: &mut SessionContext) -> bool {
        false
    }
}
