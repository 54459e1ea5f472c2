//! Text pagination
//!
//! Splits long text into pages no longer than a limit, preferring to cut at
//! the configured delimiter and falling back through a cascade of weaker
//! ones (newline, space, then a hard cut anywhere).
//!
//! Lengths and the limit are counted in characters; the resulting
//! [`PageRange`]s hold byte offsets so pages can be sliced out of the
//! source string directly.

use serde::{Deserialize, Serialize};

use crate::error::{DialogError, Result};

/// Largest text a single chat message may carry
pub const MESSAGE_LENGTH_LIMIT: usize = 4096;

/// Delimiters tried after the caller's own, in order. The empty string
/// means "cut anywhere".
pub const DEFAULT_CASCADE: [&str; 3] = ["\n", " ", ""];

/// Half-open byte range of one page within the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Ordered pages covering a text; never empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pages: Vec<PageRange>,
}

impl Pagination {
    pub fn pages(&self) -> &[PageRange] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Always false; kept alongside `len` for the usual pairing
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Index of the last page (0 for single-page text)
    pub fn last_page(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    pub fn get(&self, page: usize) -> Option<PageRange> {
        self.pages.get(page).copied()
    }

    /// Text of `page`, clamped to the last page
    pub fn page_text<'a>(&self, text: &'a str, page: usize) -> &'a str {
        match self.get(page.min(self.last_page())) {
            Some(range) => range.slice(text),
            None => "",
        }
    }
}

/// Splits text into pages; validated at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    limit: usize,
    cascade: Vec<String>,
}

impl Paginator {
    /// Paginator splitting preferably at `split_by` (newline when absent)
    ///
    /// The cascade becomes `split_by` followed by whichever of the defaults
    /// it isn't.
    pub fn new(limit: usize, split_by: Option<&str>) -> Result<Self> {
        let primary = split_by.unwrap_or("\n");
        let mut cascade = vec![primary.to_string()];
        cascade.extend(
            DEFAULT_CASCADE
                .iter()
                .filter(|d| **d != primary)
                .map(|d| d.to_string()),
        );
        Self::with_cascade(limit, cascade)
    }

    /// Paginator with an explicit cascade
    ///
    /// Without a trailing `""` entry, a token longer than the limit ends up
    /// on one oversized page.
    pub fn with_cascade(limit: usize, cascade: Vec<String>) -> Result<Self> {
        if limit == 0 {
            return Err(DialogError::PaginationInputInvalid {
                reason: "page limit must be positive".to_string(),
            });
        }
        if cascade.is_empty() {
            return Err(DialogError::PaginationInputInvalid {
                reason: "delimiter cascade is empty".to_string(),
            });
        }
        Ok(Self { limit, cascade })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn cascade(&self) -> &[String] {
        &self.cascade
    }

    /// Compute the pages of `text`
    ///
    /// Deterministic for a given text, limit and cascade. Empty text yields
    /// one empty page.
    pub fn paginate(&self, text: &str) -> Pagination {
        // bounds[i] is the byte offset of char i; bounds[n] == text.len()
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(b, _)| b)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = bounds.len() - 1;

        let mut pages = Vec::new();
        if total == 0 {
            pages.push(PageRange::new(0, 0));
            return Pagination { pages };
        }

        let mut pos = 0;
        for delim in &self.cascade {
            let mut candidates = split_points(text, &bounds, pos, delim);

            while let Some(cut) = candidates.iter().rev().copied().find(|&c| c <= self.limit) {
                pages.push(PageRange::new(bounds[pos], bounds[pos + cut]));
                pos += cut;
                candidates = candidates
                    .into_iter()
                    .filter(|&c| c > cut)
                    .map(|c| c - cut)
                    .collect();
            }

            // The remainder itself is a candidate, so a short tail is taken
            // by the loop above
            if pos == total {
                break;
            }
        }

        // Cascade ran out without a hard cut: the rest is one oversized page
        if pos < total {
            pages.push(PageRange::new(bounds[pos], text.len()));
        }

        Pagination { pages }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            limit: MESSAGE_LENGTH_LIMIT,
            cascade: DEFAULT_CASCADE.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Candidate cut offsets (in chars, relative to `pos`) for one delimiter,
/// ascending and all positive, ending with the remainder's length.
fn split_points(text: &str, bounds: &[usize], pos: usize, delim: &str) -> Vec<usize> {
    let remaining = bounds.len() - 1 - pos;
    let mut points: Vec<usize> = if delim.is_empty() {
        (1..remaining).collect()
    } else {
        let base = bounds[pos];
        text[base..]
            .match_indices(delim)
            .filter_map(|(b, _)| bounds.binary_search(&(base + b)).ok())
            .map(|char_idx| char_idx - pos)
            .filter(|&c| c > 0)
            .collect()
    };
    points.push(remaining);
    points
}
