//! Windows: one screen of a dialog
//!
//! A render pass loads data once, lets every visible widget contribute text,
//! controls and media, then decides whether the result should replace the
//! displayed message or go out as a new one.

use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::context::SessionContext;
use crate::data::Data;
use crate::error::{DialogError, Result};
use crate::event::{CallbackQuery, Event, InboundMessage, MessageId, RenderContext, ShowMode};
use crate::media::MediaAttachment;
use crate::pager::Keyboard;
use crate::widgets::{ReplyPrompt, Widget};

/// Produces the data mapping for a render pass
#[async_trait]
pub trait DataLoader: Send + Sync {
    async fn load(&self, ctx: &RenderContext, session: &SessionContext) -> AnyResult<Data>;
}

/// Loader returning the same data every time
#[derive(Debug, Clone, Default)]
pub struct StaticData(pub Data);

#[async_trait]
impl DataLoader for StaticData {
    async fn load(&self, _ctx: &RenderContext, _session: &SessionContext) -> AnyResult<Data> {
        Ok(self.0.clone())
    }
}

/// Loader backed by a synchronous closure
pub struct FnLoader<F>(pub F);

#[async_trait]
impl<F> DataLoader for FnLoader<F>
where
    F: Fn(&RenderContext, &SessionContext) -> AnyResult<Data> + Send + Sync,
{
    async fn load(&self, ctx: &RenderContext, session: &SessionContext) -> AnyResult<Data> {
        (self.0)(ctx, session)
    }
}

/// How the rendered message reaches the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// Replace the displayed message in place
    Edit,
    SendNew,
}

/// Text markup flavor the transport should declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Html,
    Markdown,
    MarkdownV2,
}

/// Controls attached to the rendered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyMarkup {
    Inline(Keyboard),
    ForceReply(ReplyPrompt),
}

impl ReplyMarkup {
    pub fn keyboard(&self) -> Option<&Keyboard> {
        match self {
            ReplyMarkup::Inline(kbd) => Some(kbd),
            ReplyMarkup::ForceReply(_) => None,
        }
    }
}

/// Outcome of one render pass, handed to the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderDecision {
    pub mode: RenderMode,
    pub text: String,
    pub reply_markup: ReplyMarkup,
    pub media: Option<MediaAttachment>,
    pub parse_mode: Option<ParseMode>,
    pub disable_web_page_preview: Option<bool>,
}

/// What happened to a typed message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageOutcome {
    /// A widget consumed the message
    pub handled: bool,
    /// The transport should delete the user's message
    pub remove_input: bool,
}

/// Edit-vs-send rule
///
/// Edit unless the event is a typed message that isn't the latest the
/// session knows about (and stray input isn't being removed), the markup
/// needs a reply prompt, or the caller asked for a new message.
pub fn decide_mode(
    event: &Event,
    last_delivered: Option<MessageId>,
    input_removing: bool,
    force_reply: bool,
    show_mode: ShowMode,
) -> RenderMode {
    let out_of_order = match event.content_message_id() {
        Some(id) => !last_delivered.is_some_and(|last| id >= last),
        None => false,
    };

    if (out_of_order && !input_removing) || force_reply || show_mode == ShowMode::Send {
        RenderMode::SendNew
    } else {
        RenderMode::Edit
    }
}

/// One screen of a dialog, identified by its state name
pub struct Window {
    state: String,
    widgets: Vec<Arc<dyn Widget>>,
    loader: Arc<dyn DataLoader>,
    parse_mode: Option<ParseMode>,
    disable_web_page_preview: Option<bool>,
    input_removing: bool,
}

impl Window {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            widgets: Vec::new(),
            loader: Arc::new(StaticData::default()),
            parse_mode: None,
            disable_web_page_preview: None,
            input_removing: false,
        }
    }

    /// Append a widget; order decides text order, row order and which
    /// handler sees an event first
    pub fn widget(mut self, widget: impl Widget + 'static) -> Self {
        self.widgets.push(Arc::new(widget));
        self
    }

    pub fn loader(mut self, loader: impl DataLoader + 'static) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    pub fn parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = Some(parse_mode);
        self
    }

    pub fn disable_web_page_preview(mut self, disable: bool) -> Self {
        self.disable_web_page_preview = Some(disable);
        self
    }

    pub fn input_removing(mut self, enabled: bool) -> Self {
        self.input_removing = enabled;
        self
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Load data and render
    ///
    /// A loader failure aborts the pass before anything is composed.
    pub async fn render(
        &self,
        ctx: &RenderContext,
        session: &mut SessionContext,
    ) -> Result<RenderDecision> {
        debug!(state = %self.state, session_id = %ctx.session_id, "rendering window");
        let data = self
            .loader
            .load(ctx, session)
            .await
            .map_err(|source| DialogError::DataLoadFailure {
                session_id: ctx.session_id.clone(),
                source,
            })?;
        self.compose(&data, ctx, session)
    }

    /// Render from already loaded data
    pub fn compose(
        &self,
        data: &Data,
        ctx: &RenderContext,
        session: &mut SessionContext,
    ) -> Result<RenderDecision> {
        let mut texts = Vec::new();
        let mut keyboard: Keyboard = Vec::new();
        let mut prompt: Option<(String, ReplyPrompt)> = None;
        let mut media = None;

        for widget in &self.widgets {
            if !widget.is_visible(data, ctx) {
                continue;
            }
            if let Some(text) = widget.render_text(data, ctx, session) {
                texts.push(text);
            }
            keyboard.extend(widget.render_keyboard(data, ctx, session));
            if prompt.is_none() {
                prompt = widget
                    .reply_prompt(data)
                    .map(|p| (widget.widget_id().unwrap_or_default().to_string(), p));
            }
            if media.is_none() {
                media = widget.render_media(data, ctx);
            }
        }

        let reply_markup = match prompt {
            Some((widget_id, _)) if !keyboard.is_empty() => {
                return Err(DialogError::ConflictingControlConfiguration {
                    session_id: ctx.session_id.clone(),
                    widget_id,
                });
            }
            Some((_, prompt)) => ReplyMarkup::ForceReply(prompt),
            None => ReplyMarkup::Inline(keyboard),
        };

        let mode = decide_mode(
            &ctx.event,
            session.last_delivered_message_id(),
            self.input_removing,
            matches!(reply_markup, ReplyMarkup::ForceReply(_)),
            ctx.show_mode,
        );
        info!(state = %self.state, session_id = %ctx.session_id, ?mode, "window rendered");

        Ok(RenderDecision {
            mode,
            text: texts.join("\n"),
            reply_markup,
            media,
            parse_mode: self.parse_mode,
            disable_web_page_preview: self.disable_web_page_preview,
        })
    }

    /// Offer a button press to widgets in order; stops at the first taker
    pub fn process_callback(&self, query: &CallbackQuery, session: &mut SessionContext) -> bool {
        self.widgets
            .iter()
            .any(|widget| widget.process_callback(query, session))
    }

    /// Offer a typed message to widgets in order; stops at the first taker
    pub fn process_message(
        &self,
        message: &InboundMessage,
        session: &mut SessionContext,
    ) -> MessageOutcome {
        let handled = self
            .widgets
            .iter()
            .any(|widget| widget.process_message(message, session));
        MessageOutcome {
            handled,
            remove_input: self.input_removing,
        }
    }
}
