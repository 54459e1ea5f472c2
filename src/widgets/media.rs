//! Media widget

use super::{Format, Widget};
use crate::data::Data;
use crate::event::RenderContext;
use crate::media::{MediaAttachment, MediaType};
use crate::when::{Predicate, When, Whenable};

/// Media from a local path or a URL, both templated from data
pub struct StaticMedia {
    media_type: MediaType,
    path: Option<Format>,
    url: Option<Format>,
    predicate: Predicate,
}

impl StaticMedia {
    pub fn path(media_type: MediaType, path: impl Into<String>) -> Self {
        Self {
            media_type,
            path: Some(Format::new(path)),
            url: None,
            predicate: Predicate::always(),
        }
    }

    pub fn url(media_type: MediaType, url: impl Into<String>) -> Self {
        Self {
            media_type,
            path: None,
            url: Some(Format::new(url)),
            predicate: Predicate::always(),
        }
    }

    pub fn when(mut self, cond: impl Into<When>) -> Self {
        self.predicate = cond.into().resolve();
        self
    }
}

impl Whenable for StaticMedia {
    fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl Widget for StaticMedia {
    fn render_media(&self, data: &Data, _ctx: &RenderContext) -> Option<MediaAttachment> {
        Some(MediaAttachment {
            media_type: self.media_type,
            path: self.path.as_ref().map(|p| p.render(data)),
            url: self.url.as_ref().map(|u| u.render(data)),
            file_id: None,
        })
    }
}
