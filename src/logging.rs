//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! The level comes from `--log-level` (or `ANSIBLE_PARALLEL_LOG`) and
//! defaults to `warn`, so the live display on stderr stays readable. With
//! `--log-file`, logs are appended to that file instead.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;
use crate::error::{Error, Result};

/// Install the global subscriber. Call once at startup.
pub fn init_logging(level: Option<LogLevel>, file: Option<&Path>) -> Result<()> {
    let level = level.map(level_from_log_level).unwrap_or(Level::WARN);
    let builder = fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false);

    match file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| Error::LogFile {
                    path: path.display().to_string(),
                    source,
                })?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

fn level_from_log_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}
