//! System interactions (clipboard, OCR engine, text post-processing)

pub mod clipboard;
pub mod ocr;
pub mod text_cleanup;

pub use clipboard::{
    open_clipboard, ClipboardError, ClipboardSink, MemoryClipboard, SystemClipboard,
};
pub use ocr::{
    extract_text_from_image, load_grayscale, OcrError, TesseractEngine, TextRecognizer,
};
pub use text_cleanup::remove_empty_lines;
