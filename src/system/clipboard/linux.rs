//! Linux-specific clipboard implementation

use std::time::{Duration, Instant};

use arboard::{Clipboard, LinuxClipboardKind, SetExtLinux};
use tracing::{debug, info};

/// Writes `text` to the Clipboard buffer (the one Ctrl+V reads).
///
/// The writing process owns the selection, so with a non-zero `hold` this
/// blocks until another application takes the contents over or `hold` elapses.
pub(super) fn set_clipboard_text_linux(
    clipboard: &mut Clipboard,
    text: &str,
    hold: Duration,
) -> Result<(), arboard::Error> {
    if hold.is_zero() {
        debug!("Writing clipboard without holding ownership");
        return clipboard
            .set()
            .clipboard(LinuxClipboardKind::Clipboard)
            .text(text.to_owned());
    }

    info!(
        hold_ms = hold.as_millis(),
        "Writing clipboard and holding ownership"
    );
    clipboard
        .set()
        .clipboard(LinuxClipboardKind::Clipboard)
        .wait_until(Instant::now() + hold)
        .text(text.to_owned())
}
