//! Pager controls and navigation payloads
//!
//! A paged widget shows a row of up to five inline buttons:
//! first, previous, current, next, last. Each button carries a callback
//! payload `<widget_id>:<page>` that routes the press back to its widget.

use serde::{Deserialize, Serialize};

use crate::error::{DialogError, Result};

/// One inline control with a callback payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Rows of inline controls
pub type Keyboard = Vec<Vec<InlineButton>>;

/// Pager appearance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerConfig {
    pub prev_label: String,
    pub next_label: String,
    pub show_first: bool,
    pub show_current: bool,
    pub show_last: bool,
    /// Fewest pages for which controls appear at all
    pub min_pages: usize,
}

impl PagerConfig {
    /// Toggle the three page-number buttons together
    pub fn with_page_buttons(mut self, show: bool) -> Self {
        self.show_first = show;
        self.show_current = show;
        self.show_last = show;
        self
    }

    pub fn with_labels(mut self, prev: impl Into<String>, next: impl Into<String>) -> Self {
        self.prev_label = prev.into();
        self.next_label = next.into();
        self
    }

    pub fn with_min_pages(mut self, min_pages: usize) -> Self {
        self.min_pages = min_pages;
        self
    }
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            prev_label: "<".to_string(),
            next_label: ">".to_string(),
            show_first: true,
            show_current: true,
            show_last: true,
            min_pages: 2,
        }
    }
}

/// Build the pager row for `current` out of `0..=last`
///
/// Returns an empty row when there are fewer than `config.min_pages`
/// pages. `current` is expected to be clamped already.
pub fn build_pager(
    widget_id: &str,
    current: usize,
    last: usize,
    config: &PagerConfig,
) -> Vec<InlineButton> {
    if last + 1 < config.min_pages.max(2) {
        return Vec::new();
    }

    let prev = current.saturating_sub(1);
    let next = (current + 1).min(last);
    let payload = |page: usize| NavigationPayload::new(widget_id, page).to_string();

    let mut row = Vec::with_capacity(5);
    if config.show_first {
        row.push(InlineButton::new("1", payload(0)));
    }
    if current != 0 {
        row.push(InlineButton::new(&config.prev_label, payload(prev)));
    }
    if config.show_current {
        row.push(InlineButton::new((current + 1).to_string(), payload(current)));
    }
    if current != last {
        row.push(InlineButton::new(&config.next_label, payload(next)));
    }
    if config.show_last {
        row.push(InlineButton::new((last + 1).to_string(), payload(last)));
    }
    row
}

/// Parsed `<widget_id>:<page>` callback payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPayload {
    pub widget_id: String,
    pub page: usize,
}

impl NavigationPayload {
    pub fn new(widget_id: impl Into<String>, page: usize) -> Self {
        Self {
            widget_id: widget_id.into(),
            page,
        }
    }

    /// Parse a payload; the id may itself contain colons
    pub fn parse(payload: &str) -> Result<Self> {
        let malformed = || DialogError::MalformedNavigationPayload {
            payload: payload.to_string(),
        };
        let (id, page) = payload.rsplit_once(':').ok_or_else(malformed)?;
        if id.is_empty() {
            return Err(malformed());
        }
        let page = page.parse::<usize>().map_err(|_| malformed())?;
        Ok(Self::new(id, page))
    }

    /// Page requested for `widget_id`, if the payload addresses it
    ///
    /// `Ok(None)` means the payload belongs to someone else; a matching
    /// prefix with a bad page number is an error.
    pub fn for_widget(payload: &str, widget_id: &str) -> Result<Option<usize>> {
        let addressed = payload
            .strip_prefix(widget_id)
            .is_some_and(|rest| rest.starts_with(':'));
        if !addressed {
            return Ok(None);
        }
        let nav = Self::parse(payload)?;
        Ok((nav.widget_id == widget_id).then_some(nav.page))
    }
}

impl std::fmt::Display for NavigationPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.widget_id, self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(row: &[InlineButton]) -> Vec<&str> {
        row.iter().map(|b| b.text.as_str()).collect()
    }

    fn payloads(row: &[InlineButton]) -> Vec<&str> {
        row.iter().map(|b| b.callback_data.as_str()).collect()
    }

    #[test]
    fn test_single_page_has_no_controls() {
        assert!(build_pager("p", 0, 0, &PagerConfig::default()).is_empty());
    }

    #[test]
    fn test_first_page() {
        let row = build_pager("p", 0, 4, &PagerConfig::default());
        assert_eq!(labels(&row), vec!["1", "1", ">", "5"]);
        assert_eq!(payloads(&row), vec!["p:0", "p:0", "p:1", "p:4"]);
    }

    #[test]
    fn test_middle_page() {
        let row = build_pager("p", 2, 4, &PagerConfig::default());
        assert_eq!(labels(&row), vec!["1", "<", "3", ">", "5"]);
        assert_eq!(payloads(&row), vec!["p:0", "p:1", "p:2", "p:3", "p:4"]);
    }

    #[test]
    fn test_last_page() {
        let row = build_pager("p", 4, 4, &PagerConfig::default());
        assert_eq!(labels(&row), vec!["1", "<", "5", "5"]);
        assert_eq!(payloads(&row), vec!["p:0", "p:3", "p:4", "p:4"]);
    }

    #[test]
    fn test_page_buttons_suppressed() {
        let config = PagerConfig::default().with_page_buttons(false);
        let row = build_pager("p", 1, 3, &config);
        assert_eq!(labels(&row), vec!["<", ">"]);
    }

    #[test]
    fn test_individual_suppression_and_labels() {
        let config = PagerConfig {
            show_current: false,
            ..PagerConfig::default().with_labels("prev", "next")
        };
        let row = build_pager("p", 1, 3, &config);
        assert_eq!(labels(&row), vec!["1", "prev", "next", "4"]);
    }

    #[test]
    fn test_min_pages_threshold() {
        let config = PagerConfig::default().with_min_pages(3);
        assert!(build_pager("p", 0, 1, &config).is_empty());
        assert!(!build_pager("p", 0, 2, &config).is_empty());
        assert!(!build_pager("p", 0, 1, &PagerConfig::default()).is_empty());
    }

    #[test]
    fn test_parse_payload() {
        let nav = NavigationPayload::parse("pager:2").unwrap();
        assert_eq!(nav, NavigationPayload::new("pager", 2));
        assert_eq!(nav.to_string(), "pager:2");
        assert_eq!(NavigationPayload::parse("a:b:7").unwrap().widget_id, "a:b");
    }

    #[test]
    fn test_parse_malformed() {
        for bad in ["pager", "pager:", "pager:x", ":3", "pager:-1"] {
            assert!(
                matches!(
                    NavigationPayload::parse(bad),
                    Err(DialogError::MalformedNavigationPayload { .. })
                ),
                "{bad} should be malformed"
            );
        }
    }

    #[test]
    fn test_for_widget() {
        assert_eq!(NavigationPayload::for_widget("pager:2", "pager").unwrap(), Some(2));
        assert_eq!(NavigationPayload::for_widget("other:2", "pager").unwrap(), None);
        assert_eq!(NavigationPayload::for_widget("pagerx:2", "pager").unwrap(), None);
        assert!(NavigationPayload::for_widget("pager:two", "pager").is_err());
        assert!(NavigationPayload::for_widget("pager:", "pager").is_err());
    }

    #[test]
    fn test_for_widget_with_colon_in_id() {
        assert_eq!(NavigationPayload::for_widget("a:b:7", "a:b").unwrap(), Some(7));
        // Addressed to the nested widget "pager:1", not to "pager"
        assert_eq!(NavigationPayload::for_widget("pager:1:2", "pager").unwrap(), None);
    }
}
