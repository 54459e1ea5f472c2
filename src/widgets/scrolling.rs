//! Scrolling text: long text shown one page at a time with a pager row
//!
//! Pages are cached in the session's widget state and recomputed only
//! when the rendered text changes. A navigation press stores the requested
//! page as is; it gets clamped to the last page when rendering, so text
//! that shrank between renders still shows its final page.

use tracing::{debug, warn};

use super::{Format, Widget};
use crate::config::DialogConfig;
use crate::context::SessionContext;
use crate::data::Data;
use crate::error::Result;
use crate::event::{CallbackQuery, RenderContext};
use crate::pager::{build_pager, Keyboard, NavigationPayload, PagerConfig};
use crate::paginate::{Paginator, MESSAGE_LENGTH_LIMIT};
use crate::when::{Predicate, When, Whenable};

pub struct ScrollingText {
    id: String,
    text: Format,
    paginator: Paginator,
    pager: PagerConfig,
    predicate: Predicate,
}

impl ScrollingText {
    /// Fails when `limit` is zero
    pub fn new(
        id: impl Into<String>,
        template: impl Into<String>,
        limit: usize,
        split_by: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            text: Format::new(template),
            paginator: Paginator::new(limit, split_by)?,
            pager: PagerConfig::default(),
            predicate: Predicate::always(),
        })
    }

    /// Message-sized pages split at newlines
    pub fn with_defaults(id: impl Into<String>, template: impl Into<String>) -> Result<Self> {
        Self::new(id, template, MESSAGE_LENGTH_LIMIT, None)
    }

    pub fn from_config(
        id: impl Into<String>,
        template: impl Into<String>,
        config: &DialogConfig,
    ) -> Result<Self> {
        Ok(Self::new(id, template, config.page_limit, Some(config.split_by.as_str()))?
            .pager(config.pager_config()))
    }

    pub fn pager(mut self, pager: PagerConfig) -> Self {
        self.pager = pager;
        self
    }

    pub fn when(mut self, cond: impl Into<When>) -> Self {
        self.predicate = cond.into().resolve();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current page (clamped) and last page for this render
    fn page_bounds(&self, text: &str, session: &mut SessionContext) -> (usize, usize) {
        let state = session.widget_state_mut(&self.id);
        let requested = state.current_page;
        let last = state.pages_for(text, &self.paginator).last_page();
        (requested.min(last), last)
    }
}

impl Whenable for ScrollingText {
    fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn widget_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl Widget for ScrollingText {
    fn render_text(
        &self,
        data: &Data,
        _ctx: &RenderContext,
        session: &mut SessionContext,
    ) -> Option<String> {
        let text = self.text.render(data);
        let state = session.widget_state_mut(&self.id);
        let requested = state.current_page;
        let page = state.pages_for(&text, &self.paginator).page_text(&text, requested);
        Some(page.to_string())
    }

    fn render_keyboard(
        &self,
        data: &Data,
        _ctx: &RenderContext,
        session: &mut SessionContext,
    ) -> Keyboard {
        let text = self.text.render(data);
        let (current, last) = self.page_bounds(&text, session);
        let row = build_pager(&self.id, current, last, &self.pager);
        if row.is_empty() {
            Vec::new()
        } else {
            vec![row]
        }
    }

    fn process_callback(&self, query: &CallbackQuery, session: &mut SessionContext) -> bool {
        match NavigationPayload::for_widget(&query.data, &self.id) {
            Ok(Some(page)) => {
                debug!(
                    widget_id = %self.id,
                    session_id = %session.session_id,
                    page,
                    "page requested"
                );
                session.widget_state_mut(&self.id).current_page = page;
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(widget_id = %self.id, session_id = %session.session_id, "{e}");
                false
            }
        }
    }
}
