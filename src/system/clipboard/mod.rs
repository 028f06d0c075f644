//! Clipboard writing utilities

#[cfg(target_os = "linux")]
mod linux;

use std::time::Duration;

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
#[error("Clipboard error: {0}")]
pub struct ClipboardError(#[from] arboard::Error);

/// Write-only destination for the final batch text.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The OS clipboard, via `arboard`.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
    /// How long to keep serving the selection on Linux after writing.
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    hold: Duration,
}

impl SystemClipboard {
    pub fn new(hold: Duration) -> Result<Self, ClipboardError> {
        let inner = arboard::Clipboard::new()?;
        Ok(Self { inner, hold })
    }
}

impl ClipboardSink for SystemClipboard {
    /// - On Linux: writes the explicit Clipboard buffer (not PRIMARY) and keeps
    ///   ownership for up to `hold`, since X11/Wayland contents vanish with the owner.
    /// - Elsewhere: `arboard::Clipboard::set_text()`.
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        #[cfg(target_os = "linux")]
        {
            linux::set_clipboard_text_linux(&mut self.inner, text, self.hold)?;
        }

        #[cfg(not(target_os = "linux"))]
        {
            self.inner.set_text(text)?;
        }

        // Length only; clipboard content stays out of the logs.
        debug!(len = text.len(), "Wrote text to clipboard");
        Ok(())
    }
}

/// Keeps the last written text in memory. Used when the OS clipboard is turned off.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// The sink for a batch run: the OS clipboard, or memory when `enabled` is off.
///
/// With `enabled` off the OS clipboard is never opened, so no display is needed.
pub fn open_clipboard(
    enabled: bool,
    hold: Duration,
) -> Result<Box<dyn ClipboardSink>, ClipboardError> {
    if enabled {
        Ok(Box::new(SystemClipboard::new(hold)?))
    } else {
        debug!("OS clipboard disabled, keeping the result in memory");
        Ok(Box::new(MemoryClipboard::default()))
    }
}
