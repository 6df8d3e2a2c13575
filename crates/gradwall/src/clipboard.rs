use anyhow::{Context, Result};
use arboard::Clipboard;

/// Places `content` on the system clipboard.
pub fn copy_text(content: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("clipboard unavailable")?;
    clipboard
        .set_text(content)
        .context("failed to copy CSS to clipboard")
}
