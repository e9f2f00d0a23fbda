//! Clipboard boundary for configuration export/import
//!
//! The only external surface besides the filesystem. Failures here are
//! surfaced to the user as notifications, never propagated as crashes.

use anyhow::{Context, Result};
use arboard::Clipboard;

/// Write `text` to the system clipboard
pub fn copy_text(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("opening system clipboard")?;
    clipboard
        .set_text(text.to_string())
        .context("writing to clipboard")
}

/// Read the current clipboard contents as text
pub fn read_text() -> Result<String> {
    let mut clipboard = Clipboard::new().context("opening system clipboard")?;
    clipboard.get_text().context("reading from clipboard")
}
