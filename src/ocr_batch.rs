//! Batch OCR over a folder: every entry is decoded, grayscaled, recognized,
//! and the combined text (blank lines removed) goes to the console and clipboard.
//!
//! Processing is strictly sequential; output blocks follow the directory
//! enumeration order.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::system::{
    extract_text_from_image, remove_empty_lines, ClipboardError, ClipboardSink, OcrError,
    TextRecognizer,
};

/// Extensions accepted by [`EntryFilter::ImagesOnly`] (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp", "ico", "pnm", "pbm", "pgm", "ppm",
    "tga", "qoi",
];

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Failed to list {path}: {source}")]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}: {source}")]
    Entry {
        path: PathBuf,
        #[source]
        source: OcrError,
    },
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error("Failed to write to console: {0}")]
    Console(#[source] io::Error),
}

/// What to do when one entry cannot be decoded or recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole batch on the first failure; nothing reaches the clipboard.
    #[default]
    FailFast,
    /// Skip the entry, record it, and keep going.
    BestEffort,
}

impl FailurePolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "fail_fast" => Some(Self::FailFast),
            "best_effort" => Some(Self::BestEffort),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailFast => "fail_fast",
            Self::BestEffort => "best_effort",
        }
    }
}

/// Which directory entries are handed to the OCR step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryFilter {
    /// Every entry, subfolders and non-images included.
    #[default]
    All,
    /// Regular files with a known image extension.
    ImagesOnly,
}

impl EntryFilter {
    pub fn accepts(&self, path: &Path) -> bool {
        match self {
            Self::All => true,
            Self::ImagesOnly => path.is_file() && has_image_extension(path),
        }
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub policy: FailurePolicy,
    pub filter: EntryFilter,
}

/// One entry that failed under [`FailurePolicy::BestEffort`].
#[derive(Debug)]
pub struct EntryFailure {
    pub path: PathBuf,
    pub error: OcrError,
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Final text, blank lines removed. This is what was copied.
    pub text: String,
    pub processed: Vec<PathBuf>,
    pub failures: Vec<EntryFailure>,
}

/// Immediate children of `folder`, in the order the filesystem enumerates them.
///
/// Paths are absolute when `folder` is; no sorting and no type filtering.
pub fn list_entries(folder: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let list_err = |source: io::Error| BatchError::ListDirectory {
        path: folder.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(folder).map_err(list_err)? {
        entries.push(entry.map_err(list_err)?.path());
    }

    debug!(folder = %folder.display(), count = entries.len(), "Listed folder");
    Ok(entries)
}

/// Runs OCR over every entry of `folder`.
///
/// For each accepted entry, in listing order: decode, grayscale, recognize,
/// append the text plus `\n`, then write `"<path> extracted."` to `console`.
/// Afterwards blank lines are removed, the result goes to `clipboard` and is
/// written to `console`.
///
/// # Errors
///
/// - [`BatchError::ListDirectory`] if the folder cannot be read.
/// - [`BatchError::Entry`] for the first failing entry under [`FailurePolicy::FailFast`].
/// - [`BatchError::Clipboard`] / [`BatchError::Console`] if an output sink fails.
pub fn run_ocr_batch<R, C, W>(
    folder: &Path,
    engine: &R,
    clipboard: &mut C,
    console: &mut W,
    options: BatchOptions,
) -> Result<BatchReport, BatchError>
where
    R: TextRecognizer + ?Sized,
    C: ClipboardSink + ?Sized,
    W: Write + ?Sized,
{
    info!(
        folder = %folder.display(),
        policy = options.policy.as_str(),
        filter = ?options.filter,
        "Starting OCR batch"
    );

    let mut all_text = String::new();
    let mut report = BatchReport::default();

    for path in list_entries(folder)? {
        if !options.filter.accepts(&path) {
            debug!(path = %path.display(), "Skipping entry");
            continue;
        }

        match extract_text_from_image(engine, &path) {
            Ok(text) => {
                all_text.push_str(&text);
                all_text.push('\n');
                writeln!(console, "{} extracted.", path.display()).map_err(BatchError::Console)?;
                report.processed.push(path);
            }
            Err(error) => match options.policy {
                FailurePolicy::FailFast => {
                    return Err(BatchError::Entry {
                        path,
                        source: error,
                    });
                }
                FailurePolicy::BestEffort => {
                    warn!(path = %path.display(), error = %error, "Skipping entry after failure");
                    writeln!(console, "{} failed: {}", path.display(), error)
                        .map_err(BatchError::Console)?;
                    report.failures.push(EntryFailure { path, error });
                }
            },
        }
    }

    report.text = remove_empty_lines(&all_text);

    clipboard.set_text(&report.text)?;
    writeln!(console, "{}", report.text).map_err(BatchError::Console)?;

    info!(
        processed = report.processed.len(),
        failed = report.failures.len(),
        chars = report.text.len(),
        "OCR batch finished"
    );
    Ok(report)
}
