//! Keyboard widgets

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Format, Widget};
use crate::context::SessionContext;
use crate::data::Data;
use crate::event::{CallbackQuery, RenderContext};
use crate::pager::{InlineButton, Keyboard};
use crate::when::{Predicate, When, Whenable};

/// Called when a button is pressed
pub type ClickHandler = Arc<dyn Fn(&CallbackQuery, &mut SessionContext) + Send + Sync>;

/// Inline button whose callback payload is its id
pub struct Button {
    id: String,
    text: Format,
    on_click: Option<ClickHandler>,
    predicate: Predicate,
}

impl Button {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: Format::new(text),
            on_click: None,
            predicate: Predicate::always(),
        }
    }

    pub fn on_click<F>(mut self, f: F) -> Self
    where
        F: Fn(&CallbackQuery, &mut SessionContext) + Send + Sync + 'static,
    {
        self.on_click = Some(Arc::new(f));
        self
    }

    pub fn when(mut self, cond: impl Into<When>) -> Self {
        self.predicate = cond.into().resolve();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn button(&self, data: &Data) -> InlineButton {
        InlineButton::new(self.text.render(data), &self.id)
    }
}

impl Whenable for Button {
    fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn widget_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl Widget for Button {
    fn render_keyboard(&self, data: &Data, _: &RenderContext, _: &mut SessionContext) -> Keyboard {
        vec![vec![self.button(data)]]
    }

    fn process_callback(&self, query: &CallbackQuery, session: &mut SessionContext) -> bool {
        if query.data != self.id {
            return false;
        }
        if let Some(on_click) = &self.on_click {
            on_click(query, session);
        }
        true
    }
}

/// Lays out visible children side by side in one row
pub struct Row {
    children: Vec<Box<dyn Widget>>,
    predicate: Predicate,
}

impl Row {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            predicate: Predicate::always(),
        }
    }

    pub fn child(mut self, widget: impl Widget + 'static) -> Self {
        self.children.push(Box::new(widget));
        self
    }

    pub fn when(mut self, cond: impl Into<When>) -> Self {
        self.predicate = cond.into().resolve();
        self
    }
}

impl Default for Row {
    fn default() -> Self {
        Self::new()
    }
}

impl Whenable for Row {
    fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl Widget for Row {
    fn render_keyboard(
        &self,
        data: &Data,
        ctx: &RenderContext,
        session: &mut SessionContext,
    ) -> Keyboard {
        let row: Vec<InlineButton> = self
            .children
            .iter()
            .filter(|child| child.is_visible(data, ctx))
            .flat_map(|child| child.render_keyboard(data, ctx, session))
            .flatten()
            .collect();
        if row.is_empty() {
            Vec::new()
        } else {
            vec![row]
        }
    }

    fn process_callback(&self, query: &CallbackQuery, session: &mut SessionContext) -> bool {
        self.children
            .iter()
            .any(|child| child.process_callback(query, session))
    }
}

/// Reply-capture prompt shown instead of inline controls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPrompt {
    pub placeholder: Option<String>,
}

/// Asks the client to open a reply to the rendered message
pub struct ForceReply {
    id: String,
    placeholder: Option<Format>,
    predicate: Predicate,
}

impl ForceReply {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            placeholder: None,
            predicate: Predicate::always(),
        }
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(Format::new(text));
        self
    }

    pub fn when(mut self, cond: impl Into<When>) -> Self {
        self.predicate = cond.into().resolve();
        self
    }
}

impl Whenable for ForceReply {
    fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn widget_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl Widget for ForceReply {
    fn reply_prompt(&self, data: &Data) -> Option<ReplyPrompt> {
        Some(ReplyPrompt {
            placeholder: self.placeholder.as_ref().map(|p| p.render(data)),
        })
    }
}
