//! Post-processing of recognized text before it reaches the clipboard.

use tracing::debug;

/// Drops every line that is empty or whitespace-only and rejoins the rest with `\n`.
///
/// Surviving lines keep their original content (no trimming) and relative order.
/// `"A\n\n  \nB\n"` becomes `"A\nB"`.
pub fn remove_empty_lines(text: &str) -> String {
    let kept = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>();

    debug!(
        input_bytes = text.len(),
        kept_lines = kept.len(),
        "Removed empty lines"
    );

    kept.join("\n")
}
