//! Tesseract OCR backend: runs the `tesseract` executable on a scratch PNG.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::GrayImage;
use tracing::{debug, error, info, warn};

use super::{OcrError, TextRecognizer};
use crate::paths;

/// Recognizer that shells out to a Tesseract executable.
///
/// The executable path is injected by the caller; nothing here assumes an
/// install location.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: String,
    language: Option<String>,
    scratch_dir: PathBuf,
}

impl TesseractEngine {
    /// Create an engine writing its scratch images to the user cache directory.
    pub fn new(command: impl Into<String>, language: Option<String>) -> Result<Self, OcrError> {
        let scratch_dir = paths::get_cache_dir().ok_or(OcrError::NoCacheDir)?;
        Ok(Self::with_scratch_dir(command, language, scratch_dir))
    }

    pub fn with_scratch_dir(
        command: impl Into<String>,
        language: Option<String>,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            command: command.into(),
            language: language.filter(|l| !l.is_empty()),
            scratch_dir,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Runs `<command> --version` to confirm the engine can be started.
    pub fn check_available(&self) -> Result<(), OcrError> {
        let output = Command::new(&self.command)
            .arg("--version")
            .output()
            .map_err(|source| OcrError::EngineUnavailable {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "`{} --version` failed: {}",
                self.command,
                stderr.trim()
            )));
        }

        let banner = String::from_utf8_lossy(&output.stdout);
        debug!(
            command = %self.command,
            version = %banner.lines().next().unwrap_or_default(),
            "OCR engine available"
        );
        Ok(())
    }

    fn write_scratch_image(&self, image: &GrayImage) -> Result<PathBuf, OcrError> {
        fs::create_dir_all(&self.scratch_dir).map_err(|e| {
            OcrError::ImageConversion(format!("Failed to create cache directory: {}", e))
        })?;

        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| OcrError::ImageConversion(format!("Failed to get timestamp: {}", e)))?
            .as_nanos();
        let image_path = self
            .scratch_dir
            .join(format!("ocr-{}-{}.png", std::process::id(), timestamp));

        image
            .save(&image_path)
            .map_err(|e| OcrError::ImageConversion(format!("Failed to write image file: {}", e)))?;

        debug!(path = %image_path.display(), "Wrote grayscale image to cache file");
        Ok(image_path)
    }

    fn run(&self, image_path: &Path) -> Result<String, OcrError> {
        let mut cmd = Command::new(&self.command);
        cmd.arg(image_path).arg("stdout");
        if let Some(lang) = &self.language {
            cmd.arg("-l").arg(lang);
        }

        debug!(
            command = %self.command,
            image = %image_path.display(),
            language = ?self.language,
            "Executing OCR engine"
        );

        let output = cmd.output().map_err(|source| {
            error!(error = %source, command = %self.command, "Failed to execute OCR engine");
            OcrError::EngineUnavailable {
                command: self.command.clone(),
                source,
            }
        })?;

        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                code = exit_code,
                stderr = %stderr.trim(),
                "Text extraction failed"
            );
            return Err(OcrError::Recognition(format!(
                "{} exited with code {}: {}",
                self.command,
                exit_code,
                stderr.trim()
            )));
        }

        Ok(strip_page_end(&String::from_utf8_lossy(&output.stdout)).to_string())
    }
}

/// Drops the trailing newlines and page form feeds Tesseract appends.
///
/// Spaces at the end of the last line are kept.
fn strip_page_end(text: &str) -> &str {
    text.trim_end_matches(['\n', '\r', '\u{c}'])
}

impl TextRecognizer for TesseractEngine {
    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError> {
        let image_path = self.write_scratch_image(image)?;
        let result = self.run(&image_path);

        if let Err(e) = fs::remove_file(&image_path) {
            warn!(error = %e, path = %image_path.display(), "Failed to remove cache image file");
        } else {
            debug!(path = %image_path.display(), "Cleaned up cache image file");
        }

        let text = result?;
        info!(chars = text.len(), "OCR completed");
        debug!(text = %text.chars().take(100).collect::<String>(), "Extracted text preview");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use tempfile::TempDir;

    fn blank() -> GrayImage {
        GrayImage::from_pixel(4, 4, Luma([255]))
    }

    #[test]
    fn test_missing_engine_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let engine = TesseractEngine::with_scratch_dir(
            "foldertools-no-such-ocr-engine",
            None,
            tmp.path().to_path_buf(),
        );

        let err = engine.recognize(&blank()).unwrap_err();
        assert!(matches!(err, OcrError::EngineUnavailable { .. }));
        assert!(matches!(
            engine.check_available().unwrap_err(),
            OcrError::EngineUnavailable { .. }
        ));
    }

    #[test]
    fn test_page_end_stripped_but_trailing_spaces_kept() {
        assert_eq!(strip_page_end("Total:  \n\u{c}"), "Total:  ");
        assert_eq!(strip_page_end("a\r\n\n"), "a");
        assert_eq!(strip_page_end("\u{c}"), "");
    }

    #[test]
    fn test_empty_language_is_ignored() {
        let engine =
            TesseractEngine::with_scratch_dir("tesseract", Some(String::new()), PathBuf::new());
        assert!(engine.language.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_stdout_becomes_text_and_scratch_is_removed() {
        // `echo <image> stdout -l eng` stands in for a real engine.
        let tmp = TempDir::new().unwrap();
        let engine = TesseractEngine::with_scratch_dir(
            "echo",
            Some("eng".to_string()),
            tmp.path().join("scratch"),
        );

        let text = engine.recognize(&blank()).unwrap();
        assert!(text.ends_with(".png stdout -l eng"), "got {text:?}");
        assert_eq!(fs::read_dir(tmp.path().join("scratch")).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_failure_is_recognition_error() {
        let tmp = TempDir::new().unwrap();
        let engine = TesseractEngine::with_scratch_dir("false", None, tmp.path().to_path_buf());

        let err = engine.recognize(&blank()).unwrap_err();
        assert!(matches!(err, OcrError::Recognition(_)));
    }
}
