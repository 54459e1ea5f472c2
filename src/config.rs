//! Dialog configuration

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::pager::PagerConfig;
use crate::paginate::MESSAGE_LENGTH_LIMIT;

/// Defaults for paged widgets and windows, loaded from `dialog.toml`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DialogConfig {
    /// Maximum characters per page
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,
    /// Preferred split point for pages
    #[serde(default = "default_split_by")]
    pub split_by: String,
    #[serde(default = "default_prev_label")]
    pub prev_label: String,
    #[serde(default = "default_next_label")]
    pub next_label: String,
    /// Show first/current/last page number buttons
    #[serde(default = "default_true")]
    pub show_page_buttons: bool,
    /// Fewest pages for which a pager appears
    #[serde(default = "default_min_pages")]
    pub min_pages: usize,
    /// Delete user messages typed into windows
    #[serde(default)]
    pub input_removing: bool,
}

fn default_page_limit() -> usize {
    MESSAGE_LENGTH_LIMIT
}

fn default_split_by() -> String {
    "\n".to_string()
}

fn default_prev_label() -> String {
    "<".to_string()
}

fn default_next_label() -> String {
    ">".to_string()
}

fn default_true() -> bool {
    true
}

fn default_min_pages() -> usize {
    2
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            split_by: default_split_by(),
            prev_label: default_prev_label(),
            next_label: default_next_label(),
            show_page_buttons: true,
            min_pages: default_min_pages(),
            input_removing: false,
        }
    }
}

impl DialogConfig {
    /// Load config from a TOML file; a missing file means defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("dialog config not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let config: DialogConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        tracing::info!(
            page_limit = config.page_limit,
            "loaded dialog config from {}",
            path.display()
        );

        Ok(config)
    }

    pub fn pager_config(&self) -> PagerConfig {
        PagerConfig::default()
            .with_labels(&self.prev_label, &self.next_label)
            .with_page_buttons(self.show_page_buttons)
            .with_min_pages(self.min_pages)
    }
}
