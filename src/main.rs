use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{error, info, warn};

use foldertools::config::{self, ConfigError, LogLevel, OcrOverrides, Settings};
use foldertools::system::{open_clipboard, ClipboardError, ClipboardSink, OcrError, TesseractEngine};
use foldertools::{BatchError, ScaffoldError};

/// Folder utilities: web file scaffolding and batch OCR to the clipboard
#[derive(Parser)]
#[command(name = "foldertools", version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace). `RUST_LOG` takes precedence.
    #[arg(long, global = true, value_parser = parse_log_level)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create index.html, style.css and script.js in FOLDER without overwriting anything
    Web {
        folder: PathBuf,
    },
    /// Recognize text in every image of FOLDER, print it and copy it to the clipboard
    Ocr {
        folder: PathBuf,

        /// Tesseract executable (overrides FOLDERTOOLS_TESSERACT_CMD and the config file)
        #[arg(long)]
        tesseract_cmd: Option<String>,

        /// Tesseract language, e.g. `eng` or `eng+deu`
        #[arg(long)]
        lang: Option<String>,

        /// Skip entries that fail and report them at the end instead of aborting
        #[arg(long)]
        best_effort: bool,

        /// Only process regular files with an image extension
        #[arg(long)]
        images_only: bool,

        /// Print the result without touching the clipboard
        #[arg(long)]
        no_clipboard: bool,
    },
    /// Inspect or change the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings as JSON
    Show,
    /// Print the settings file location
    Path,
    /// Store KEY = VALUE in the settings file
    Set { key: String, value: String },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Scaffold(#[from] ScaffoldError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error(transparent)]
    Ocr(#[from] OcrError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    LogLevel::from_str(s).ok_or_else(|| format!("unknown log level `{s}`"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = config::load_settings();

    foldertools::init_tracing(cli.log_level.unwrap_or(settings.log_level));

    match run(cli.command, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, mut settings: Settings) -> Result<(), CliError> {
    match command {
        Commands::Web { folder } => {
            let files = foldertools::create_web_files(&folder)?;
            for path in files.paths() {
                println!("{}", path.display());
            }
        }
        Commands::Ocr {
            folder,
            tesseract_cmd,
            lang,
            best_effort,
            images_only,
            no_clipboard,
        } => {
            settings.apply_ocr_overrides(OcrOverrides {
                tesseract_cmd,
                language: lang,
                best_effort,
                images_only,
                no_clipboard,
            });

            let mut clipboard =
                open_clipboard(settings.copy_to_clipboard, settings.clipboard_hold())?;
            ocr_command(&folder, &settings, clipboard.as_mut())?;
        }
        Commands::Config { action } => config_command(action, &settings)?,
    }
    Ok(())
}

fn ocr_command(
    folder: &Path,
    settings: &Settings,
    clipboard: &mut dyn ClipboardSink,
) -> Result<(), CliError> {
    let engine = TesseractEngine::new(
        settings.ocr.tesseract_cmd.clone(),
        settings.ocr.language.clone(),
    )?;
    engine.check_available()?;
    info!(command = engine.command(), "Using OCR engine");

    let stdout = io::stdout();
    let mut console = stdout.lock();
    let report = foldertools::run_ocr_batch(
        folder,
        &engine,
        clipboard,
        &mut console,
        settings.batch_options(),
    )?;

    if !report.failures.is_empty() {
        warn!(failed = report.failures.len(), "Some entries were skipped");
        eprintln!("{} entries failed:", report.failures.len());
        for failure in &report.failures {
            eprintln!("  {failure}");
        }
    }
    Ok(())
}

fn config_command(action: ConfigAction, settings: &Settings) -> Result<(), CliError> {
    match action {
        ConfigAction::Show => println!("{}", serde_json::to_string_pretty(settings)?),
        ConfigAction::Path => {
            let path = config::config_path().ok_or(ConfigError::NoConfigDir)?;
            println!("{}", path.display());
        }
        ConfigAction::Set { key, value } => {
            let mut raw = config::load_raw_config()?;
            config::set_value(&mut raw, &key, &value)?;
            config::save_raw_config(raw)?;
            info!(key = %key, "Config updated");
        }
    }
    Ok(())
}
