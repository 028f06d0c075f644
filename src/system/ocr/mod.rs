//! OCR (Optical Character Recognition) functionality

mod tesseract;

pub use tesseract::TesseractEngine;

use std::io;
use std::path::{Path, PathBuf};

use image::GrayImage;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to decode {path} as an image: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("OCR engine `{command}` could not be started: {source}")]
    EngineUnavailable {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("Text recognition failed: {0}")]
    Recognition(String),
    #[error("Image conversion failed: {0}")]
    ImageConversion(String),
    #[error("No cache directory available on this platform")]
    NoCacheDir,
}

impl OcrError {
    /// True for errors caused by the input entry rather than the engine.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Anything that turns a grayscale image into text.
pub trait TextRecognizer {
    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError>;
}

/// Opens `path` as an image and reduces it to 8-bit luma.
pub fn load_grayscale(path: &Path) -> Result<GrayImage, OcrError> {
    let img = image::open(path).map_err(|source| OcrError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "Decoded image"
    );
    Ok(img.to_luma8())
}

/// Loads `path`, converts it to grayscale and runs it through `engine`.
pub fn extract_text_from_image<R>(engine: &R, path: &Path) -> Result<String, OcrError>
where
    R: TextRecognizer + ?Sized,
{
    let gray = load_grayscale(path)?;
    engine.recognize(&gray)
}
