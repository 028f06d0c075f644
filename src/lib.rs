//! Folder utilities: scaffold a boilerplate web project, or OCR every image
//! in a folder straight to the clipboard.

pub mod config;
pub mod ocr_batch;
pub mod paths;
pub mod scaffold;
pub mod system;

use tracing_subscriber::EnvFilter;

pub use config::{LogLevel, Settings};
pub use ocr_batch::{
    list_entries, run_ocr_batch, BatchError, BatchOptions, BatchReport, EntryFilter,
    FailurePolicy,
};
pub use scaffold::{create_web_files, unique_path, FileSet, ScaffoldError};

/// Installs the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise `level` applies.
pub fn init_tracing(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}
