#![deny(missing_docs)]
//! lvlog: leveled, caller-annotated logging for long-running services.
//!
//! Every line goes to the console and, once [`setup`] has run, to a log file
//! opened once for the life of the process:
//!
//! ```text
//! [ERROR][handler.rs:87] 2024/03/09 17:04:05 connection reset by 10.0.0.7
//! ```
//!
//! Features:
//! - Five severities, `DEBUG` to `FATAL`, filtered by one threshold (default `ERROR`).
//! - The prefix names the file and line of the logging call.
//! - Console and file receive the same line in one serialized write, so lines
//!   from concurrent threads never interleave.
//! - Write failures are returned to the caller instead of being swallowed.
//! - Acts as a backend for the `log` crate through [`apply`].
//!
//! Usage example
//! ========
//!
//! ```no_run
//! # // no_run because this creates a log file.
//! use lvlog::{Config, Level};
//!
//! lvlog::setup(&Config::new("logs", "godis").time_format("%Y-%m-%d"));
//! lvlog::global().set_level(Level::Info);
//!
//! lvlog::info!("accepted connection from {}", "10.0.0.7:51234").ok();
//! lvlog::debug!("not shown at level INFO").ok();
//! ```
//!
//! `lvlog::setup` opens `logs/godis-<date>.log` and exits the process if that
//! fails. [`Logger::setup`] is the same thing returning an [`InitError`].
//!
//! The macros write to the process-wide logger returned by [`global`]. They
//! also accept `logger: <expr>,` to target any other [`Logger`]:
//!
//! ```
//! use lvlog::{Level, Logger};
//!
//! let logger = Logger::new().level(Level::Debug);
//! lvlog::warn!(logger: logger, "queue depth {}", 512).ok();
//! ```
//!
//! Each macro returns `Result<(), LogError>` except [`fatal!`], which logs and
//! then exits the process.

use std::{
    fs::{File, OpenOptions},
    io,
    path::Path,
    process,
    sync::OnceLock,
};

pub use crate::{
    config::{open_or_create, Config},
    errors::{InitError, LogError},
    level::{should_emit, Level, ParseLevelError},
    logger::{Logger, DEFAULT_TIMESTAMP_FORMAT},
    prefix::{format_prefix, CallSite},
};

mod config;
mod errors;
mod level;
mod logger;
mod prefix;
mod sink;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// The process-wide logger.
///
/// Created on first use with threshold [`Level::Error`], writing to stdout,
/// unless [`init`] installed a different one first.
pub fn global() -> &'static Logger {
    GLOBAL.get_or_init(Logger::new)
}

/// Installs `logger` as the process-wide logger.
///
/// Fails with [`InitError::GlobalAlreadySet`] if [`global`] was already used
/// or `init` already called.
pub fn init(logger: Logger) -> Result<&'static Logger, InitError> {
    GLOBAL.set(logger).map_err(|_| InitError::GlobalAlreadySet)?;
    Ok(global())
}

/// Sets up file logging for the process-wide logger.
///
/// Exits the process with status 1 and a message on stderr if the log file
/// cannot be created: without it there is nowhere to report anything else.
///
/// See [`Logger::setup`].
pub fn setup(config: &Config) {
    if let Err(error) = global().setup(config) {
        eprintln!("logging setup failed: {}", error);
        process::exit(1);
    }
}

/// Makes the process-wide logger the `log` crate's global logger, so that
/// `log::info!` and friends go through it.
///
/// `log::Level::Trace` records are treated as debug. Filtering is left to
/// the logger's threshold.
///
/// # Errors
///
/// Fails if another `log` backend was already installed.
pub fn apply() -> Result<(), InitError> {
    log::set_logger(global())?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Convenience method for opening a log file with common options.
///
/// Equivalent to:
///
/// ```no_run
/// std::fs::OpenOptions::new()
///     .write(true)
///     .create(true)
///     .append(true)
///     .open("filename")
/// # ;
/// ```
#[inline]
pub fn log_file<P: AsRef<Path>>(path: P) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .append(true)
        .open(path)
}

/// Logs at [`Level::Debug`].
///
/// ```
/// lvlog::debug!("cache miss for {:?}", "user:42").ok();
/// ```
#[macro_export]
macro_rules! debug {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.debug(::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().debug(::std::format_args!($($arg)+))
    };
}

/// Logs at [`Level::Info`].
#[macro_export]
macro_rules! info {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.info(::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().info(::std::format_args!($($arg)+))
    };
}

/// Logs at [`Level::Warning`].
#[macro_export]
macro_rules! warn {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.warn(::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().warn(::std::format_args!($($arg)+))
    };
}

/// Logs at [`Level::Error`].
#[macro_export]
macro_rules! error {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.error(::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().error(::std::format_args!($($arg)+))
    };
}

/// Logs at [`Level::Fatal`] and exits the process with status 1.
#[macro_export]
macro_rules! fatal {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.fatal(::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().fatal(::std::format_args!($($arg)+))
    };
}
