use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// File prefix for log files; the appender adds a date suffix.
pub const LOG_PREFIX: &str = "optimizer.log";

/// `<home>/.nuke`, or the current directory if home is unknown.
pub fn default_log_dir() -> Utf8PathBuf {
    dirs_next::home_dir()
        .and_then(|home| Utf8PathBuf::from_path_buf(home).ok())
        .map(|home| home.join(".nuke"))
        .unwrap_or_else(|| Utf8PathBuf::from("."))
}

fn env_filter(default_level: &str) -> EnvFilter {
    // RUST_LOG wins when set
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Level name for a `-v` count: warn, info, debug, then trace.
pub fn verbosity_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Setup logging with a daily rotating file and optional console output.
///
/// # Arguments
/// * `log_dir` - Directory for log files (created if missing)
/// * `debug_mode` - If true, use debug level; otherwise use info level
/// * `console_output` - If true, also log to stderr with ANSI colors
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
///
/// # Errors
/// Fails if the directory cannot be created or a global subscriber is
/// already installed.
pub fn setup_logging(
    log_dir: &Utf8Path,
    debug_mode: bool,
    console_output: bool,
) -> Result<WorkerGuard> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }

    let file_appender = rolling::daily(log_dir, LOG_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let console_layer = console_output.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter(if debug_mode { "debug" } else { "info" }))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::info!(
        "Logging initialized: dir={}, debug={}, console={}",
        log_dir,
        debug_mode,
        console_output
    );

    Ok(guard)
}

/// Console-only logging for command-line use.
pub fn setup_console_logging(verbosity: u8) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(verbosity_level(verbosity)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .context("A global tracing subscriber is already installed")?;
    Ok(())
}

/// Like [`setup_logging`], but safe to call repeatedly.
///
/// Entry points that run without the editor (menu commands, hotkeys) call
/// this before doing work. If logging is already configured, or the log
/// directory cannot be created, it returns `None` and the caller carries on.
pub fn ensure_logging(log_dir: &Utf8Path, debug_mode: bool) -> Option<WorkerGuard> {
    match setup_logging(log_dir, debug_mode, false) {
        Ok(guard) => Some(guard),
        Err(e) => {
            tracing::debug!("File logging not (re)configured: {:#}", e);
            None
        }
    }
}
