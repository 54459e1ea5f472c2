//! Config file location
//!
//! Follows the XDG Base Directory Specification with an env var override.
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CHATDIALOG_CONFIG` | Dialog config file | `~/.config/chatdialog/dialog.toml` |

use std::path::PathBuf;

use tracing::info;

/// Get the XDG config directory for chatdialog
///
/// Priority: `XDG_CONFIG_HOME` > `~/.config`
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("chatdialog");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config/chatdialog");
    }

    PathBuf::from(".")
}

/// Get the dialog config path
///
/// Priority: `CHATDIALOG_CONFIG` env var > `config_dir()/dialog.toml`
pub fn config_path() -> PathBuf {
    std::env::var("CHATDIALOG_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| config_dir().join("dialog.toml"))
}

/// Log resolved paths for discoverability
pub fn log_paths() {
    info!("config directory: {}", config_dir().display());
    info!("dialog config: {}", config_path().display());
}
