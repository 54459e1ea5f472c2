//! Text widgets

use tracing::debug;

use super::Widget;
use crate::context::SessionContext;
use crate::data::{display_value, Data};
use crate::event::RenderContext;
use crate::when::{Predicate, When, Whenable};

/// Substitute `{key}` placeholders from `data`
///
/// `{{` and `}}` produce literal braces. A missing key renders as nothing,
/// an unclosed `{` is kept as is.
pub fn format_template(template: &str, data: &Data) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(i) = rest.find(|c: char| c == '{' || c == '}') {
        out.push_str(&rest[..i]);
        let tail = &rest[i..];

        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
        } else if tail.starts_with('{') {
            let Some(end) = tail.find('}') else {
                out.push_str(tail);
                rest = "";
                break;
            };
            let key = tail[1..end].trim();
            match data.get(key) {
                Some(value) => out.push_str(&display_value(value)),
                None => debug!(key, "template field missing"),
            }
            rest = &tail[end + 1..];
        } else {
            out.push('}');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

/// Fixed text
#[derive(Debug, Clone)]
pub struct Const {
    text: String,
    predicate: Predicate,
}

impl Const {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            predicate: Predicate::always(),
        }
    }

    pub fn when(mut self, cond: impl Into<When>) -> Self {
        self.predicate = cond.into().resolve();
        self
    }
}

impl Whenable for Const {
    fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl Widget for Const {
    fn render_text(&self, _: &Data, _: &RenderContext, _: &mut SessionContext) -> Option<String> {
        Some(self.text.clone())
    }
}

/// Text templated from the window's data
#[derive(Debug, Clone)]
pub struct Format {
    template: String,
    predicate: Predicate,
}

impl Format {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            predicate: Predicate::always(),
        }
    }

    pub fn when(mut self, cond: impl Into<When>) -> Self {
        self.predicate = cond.into().resolve();
        self
    }

    pub fn render(&self, data: &Data) -> String {
        format_template(&self.template, data)
    }
}

impl Whenable for Format {
    fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl Widget for Format {
    fn render_text(
        &self,
        data: &Data,
        _: &RenderContext,
        _: &mut SessionContext,
    ) -> Option<String> {
        Some(self.render(data))
    }
}

/// Visible children's texts joined by a separator
pub struct Multi {
    children: Vec<Box<dyn Widget>>,
    sep: String,
    predicate: Predicate,
}

impl Multi {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            sep: "\n".to_string(),
            predicate: Predicate::always(),
        }
    }

    pub fn child(mut self, widget: impl Widget + 'static) -> Self {
        self.children.push(Box::new(widget));
        self
    }

    pub fn sep(mut self, sep: impl Into<String>) -> Self {
        self.sep = sep.into();
        self
    }

    pub fn when(mut self, cond: impl Into<When>) -> Self {
        self.predicate = cond.into().resolve();
        self
    }
}

impl Default for Multi {
    fn default() -> Self {
        Self::new()
    }
}

impl Whenable for Multi {
    fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl Widget for Multi {
    fn render_text(
        &self,
        data: &Data,
        ctx: &RenderContext,
        session: &mut SessionContext,
    ) -> Option<String> {
        let parts: Vec<String> = self
            .children
            .iter()
            .filter(|child| child.is_visible(data, ctx))
            .filter_map(|child| child.render_text(data, ctx, session))
            .collect();
        Some(parts.join(&self.sep))
    }
}
