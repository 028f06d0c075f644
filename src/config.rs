//! Persistent configuration handling for foldertools.
//!
//! Persists configuration in a JSON file:
//! `~/.config/foldertools/config.json`.
//!
//! Resolution order for every setting: command-line flag (see
//! [`Settings::apply_ocr_overrides`]), then environment, then the config file,
//! then the built-in default.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::ocr_batch::{BatchOptions, EntryFilter, FailurePolicy};

const APP_CONFIG_DIR_NAME: &str = "foldertools";
const CONFIG_FILE_NAME: &str = "config.json";

pub const ENV_TESSERACT_CMD: &str = "FOLDERTOOLS_TESSERACT_CMD";
pub const ENV_OCR_LANG: &str = "FOLDERTOOLS_OCR_LANG";

pub const DEFAULT_TESSERACT_CMD: &str = "tesseract";
pub const DEFAULT_CLIPBOARD_HOLD_MS: u64 = 2000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No config directory available on this platform")]
    NoConfigDir,
    #[error("Unknown config key: {0}")]
    UnknownKey(String),
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Some(Self::Error),
            "WARN" | "WARNING" => Some(Self::Warn),
            "INFO" => Some(Self::Info),
            "DEBUG" => Some(Self::Debug),
            "TRACE" => Some(Self::Trace),
            _ => None,
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub tesseract_cmd: Option<String>,
    #[serde(default)]
    pub ocr_language: Option<String>,
    #[serde(default)]
    pub failure_policy: Option<String>,
    #[serde(default)]
    pub images_only: Option<bool>,
    #[serde(default)]
    pub clipboard_hold_ms: Option<u64>,
}

/// How to reach the OCR engine. Resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OcrSettings {
    pub tesseract_cmd: String,
    pub language: Option<String>,
}

/// Effective settings after merging environment, file and defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub log_level: LogLevel,
    pub ocr: OcrSettings,
    pub failure_policy: FailurePolicy,
    pub entry_filter: EntryFilter,
    pub clipboard_hold_ms: u64,
    /// Only ever turned off from the command line.
    pub copy_to_clipboard: bool,
}

/// Flags given to `foldertools ocr`. `None`/`false` leaves the setting alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrOverrides {
    pub tesseract_cmd: Option<String>,
    pub language: Option<String>,
    pub best_effort: bool,
    pub images_only: bool,
    pub no_clipboard: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(RawConfig::default(), |_| None)
    }
}

impl Settings {
    /// Merges `raw` with environment lookups from `env`.
    ///
    /// Unknown or empty values fall back to defaults.
    pub fn resolve<F>(raw: RawConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        let tesseract_cmd = non_empty(env(ENV_TESSERACT_CMD))
            .or_else(|| non_empty(raw.tesseract_cmd))
            .unwrap_or_else(|| DEFAULT_TESSERACT_CMD.to_string());
        let language = non_empty(env(ENV_OCR_LANG)).or_else(|| non_empty(raw.ocr_language));

        let entry_filter = if raw.images_only.unwrap_or(false) {
            EntryFilter::ImagesOnly
        } else {
            EntryFilter::All
        };

        Self {
            log_level: raw
                .log_level
                .as_deref()
                .and_then(LogLevel::from_str)
                .unwrap_or_default(),
            ocr: OcrSettings {
                tesseract_cmd,
                language,
            },
            failure_policy: raw
                .failure_policy
                .as_deref()
                .and_then(FailurePolicy::from_str)
                .unwrap_or_default(),
            entry_filter,
            clipboard_hold_ms: raw.clipboard_hold_ms.unwrap_or(DEFAULT_CLIPBOARD_HOLD_MS),
            copy_to_clipboard: true,
        }
    }

    /// Applies command-line flags on top of the resolved settings.
    pub fn apply_ocr_overrides(&mut self, overrides: OcrOverrides) {
        if let Some(cmd) = overrides.tesseract_cmd.filter(|c| !c.trim().is_empty()) {
            self.ocr.tesseract_cmd = cmd;
        }
        if let Some(lang) = overrides.language.filter(|l| !l.trim().is_empty()) {
            self.ocr.language = Some(lang);
        }
        if overrides.best_effort {
            self.failure_policy = FailurePolicy::BestEffort;
        }
        if overrides.images_only {
            self.entry_filter = EntryFilter::ImagesOnly;
        }
        if overrides.no_clipboard {
            self.copy_to_clipboard = false;
        }
        debug!(settings = ?self, "Command-line overrides applied");
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            policy: self.failure_policy,
            filter: self.entry_filter,
        }
    }

    pub fn clipboard_hold(&self) -> Duration {
        Duration::from_millis(self.clipboard_hold_ms)
    }
}

pub fn config_path() -> Option<PathBuf> {
    let path = config_dir()?
        .join(APP_CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME);
    Some(path)
}

fn ensure_config_dir_exists(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Reads the config file at `path`; a missing file yields defaults.
pub fn load_raw_config_from(path: &Path) -> Result<RawConfig, ConfigError> {
    if !path.exists() {
        debug!(?path, "Config file does not exist, using defaults");
        return Ok(RawConfig::default());
    }

    let data = fs::read_to_string(path)?;
    let cfg = serde_json::from_str(&data)?;
    debug!(?path, "Config loaded");
    Ok(cfg)
}

pub fn save_raw_config_to(path: &Path, mut cfg: RawConfig) -> Result<(), ConfigError> {
    ensure_config_dir_exists(path)?;
    cfg.log_level = cfg.log_level.filter(|s| !s.is_empty());
    cfg.tesseract_cmd = cfg.tesseract_cmd.filter(|s| !s.is_empty());
    cfg.ocr_language = cfg.ocr_language.filter(|s| !s.is_empty());
    cfg.failure_policy = cfg.failure_policy.filter(|s| !s.is_empty());

    let data = serde_json::to_string_pretty(&cfg)?;
    fs::write(path, data)?;
    debug!(?path, "Config saved");
    Ok(())
}

pub fn load_raw_config() -> Result<RawConfig, ConfigError> {
    let Some(path) = config_path() else {
        debug!("No config_dir available, using defaults only");
        return Ok(RawConfig::default());
    };
    load_raw_config_from(&path)
}

pub fn save_raw_config(cfg: RawConfig) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_raw_config_to(&path, cfg)
}

/// Loads the effective settings. A broken config file never aborts a run.
///
/// Runs before logging is initialized, so problems go to stderr directly.
pub fn load_settings() -> Settings {
    let raw = match load_raw_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("Config: failed to load config, using defaults: {err:?}");
            RawConfig::default()
        }
    };
    Settings::resolve(raw, |key| std::env::var(key).ok())
}

/// Validates and stores one `key = value` pair into `cfg`.
pub fn set_value(cfg: &mut RawConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };

    match key {
        "log_level" => {
            let level = LogLevel::from_str(value).ok_or_else(invalid)?;
            cfg.log_level = Some(level.as_filter().to_string());
        }
        "tesseract_cmd" => cfg.tesseract_cmd = Some(value.to_string()),
        "ocr_language" => cfg.ocr_language = Some(value.to_string()),
        "failure_policy" => {
            let policy = FailurePolicy::from_str(value).ok_or_else(invalid)?;
            cfg.failure_policy = Some(policy.as_str().to_string());
        }
        "images_only" => cfg.images_only = Some(value.parse().map_err(|_| invalid())?),
        "clipboard_hold_ms" => cfg.clipboard_hold_ms = Some(value.parse().map_err(|_| invalid())?),
        _ => return Err(ConfigError::UnknownKey(key.to_string())),
    }

    debug!(key, value, "Config value set");
    Ok(())
}
