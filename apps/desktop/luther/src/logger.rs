//! Logging for the Luther desktop launcher.
//!
//! Colored stdout plus a plain `luther.log` file in the app log directory.
//! Server output arrives under the `server` target and is tagged as such.

use crate::error::LutherError;

use common::ErrorLocation;

use std::fmt::Arguments;
use std::io::stdout;
use std::panic::Location;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use fern::{Dispatch, FormatCallback};
use humantime::format_rfc3339_millis;
use log::{LevelFilter, Record, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();

static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

const LOG_FILE_NAME: &str = "luther.log";

const SERVER_TARGET: &str = "server";

const LOGGER_ALREADY_INITIALIZED_MESSAGE: &str = "Logger already initialized";

#[cfg(debug_assertions)]
const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Chatty dependencies are held at `Warn` regardless of [`LOG_LEVEL`].
const QUIET_MODULES: [&str; 4] = ["hyper", "reqwest", "tao", "wry"];

/// Initialize the logger with dual output (stdout + file).
///
/// Safe to call more than once: later calls log a warning and return `Ok`.
///
/// # Errors
///
/// Returns [`LutherError::Luther`] if the log file cannot be created or a
/// global logger is already installed by someone else.
pub fn initialize(log_dir: &Path) -> Result<(), LutherError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("{LOGGER_ALREADY_INITIALIZED_MESSAGE}");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(log_dir);
        if result.is_ok() {
            info!(
                "Logger initialized with level {LOG_LEVEL:?}, writing to {}",
                log_dir.join(LOG_FILE_NAME).display()
            );
        }
    });

    result
}

/// `[<time> - <level>] <message> [<origin>]`, where origin is `server` for
/// child output and `file:line` otherwise.
fn write_line(out: FormatCallback, level: Arguments, message: &Arguments, record: &Record) {
    let date = format_rfc3339_millis(SystemTime::now());

    if record.target() == SERVER_TARGET {
        out.finish(format_args!("[{date} - {level}] {message} [{SERVER_TARGET}]"));
    } else {
        out.finish(format_args!(
            "[{date} - {level}] {message} [{file}:{line}]",
            file = record.file().unwrap_or("unknown"),
            line = record.line().unwrap_or(0),
        ));
    }
}

#[track_caller]
fn initialize_internal(log_dir: &Path) -> Result<(), LutherError> {
    let log_file_path = log_dir.join(LOG_FILE_NAME);

    let color_configuration = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let base_dispatch = QUIET_MODULES
        .iter()
        .fold(Dispatch::new().level(LOG_LEVEL), |dispatch, module| {
            dispatch.level_for(*module, LevelFilter::Warn)
        });

    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            let level = color_configuration.color(record.level());
            write_line(out, format_args!("{level}"), message, record);
        })
        .chain(stdout());

    let log_file = fern::log_file(&log_file_path).map_err(|e| LutherError::Luther {
        message: format!("Failed to create log file {}: {e}", log_file_path.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let file_dispatch = Dispatch::new()
        .format(|out, message, record| {
            let level = record.level();
            write_line(out, format_args!("{level}"), message, record);
        })
        .chain(log_file);

    base_dispatch
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| LutherError::Luther {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(())
}
