//! Logger initialization.
//!
//! Plain (colored) and JSON line formats on top of `env_logger`.

use std::io::Write;

use colored::{ColoredString, Colorize};
use env_logger::fmt::Formatter;
use log::{Level, LevelFilter, Record};

use crate::config::{LogFormat, LogLevel};
use crate::error_handling::InitializationError;

/// Dependencies capped below the requested level; HTML parsing is very chatty.
const QUIET_MODULES: &[(&str, LevelFilter)] = &[
    ("html5ever", LevelFilter::Error),
    ("selectors", LevelFilter::Warn),
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
];

/// Initializes the logger with the specified level and format.
///
/// `RUST_LOG` is read first, then `level` overrides the global and crate-level
/// filters while the modules in `QUIET_MODULES` stay capped.
///
/// Only the first call in a process installs a logger; later calls return
/// `InitializationError::LoggerError`.
///
/// # Examples
///
/// ```bash
/// # Per-module filtering via RUST_LOG
/// RUST_LOG=opencrawl=debug,reqwest=info cargo test
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, cap) in QUIET_MODULES {
        builder.filter_module(module, (*cap).min(level));
    }
    builder.filter_module("opencrawl", level);

    match format {
        LogFormat::Json => builder.format(write_json_line),
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(write_plain_line)
        }
    };

    builder.try_init().map_err(InitializationError::from)
}

/// Initializes the logger from the config-level option types.
pub fn init_logger(level: LogLevel, format: LogFormat) -> Result<(), InitializationError> {
    init_logger_with(level.into(), format)
}

fn write_json_line(buf: &mut Formatter, record: &Record<'_>) -> std::io::Result<()> {
    let line = serde_json::json!({
        "ts": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    });
    writeln!(buf, "{line}")
}

fn write_plain_line(buf: &mut Formatter, record: &Record<'_>) -> std::io::Result<()> {
    writeln!(
        buf,
        "{} {:<5} {} {}",
        chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
        level_label(record.level()),
        record.target().cyan(),
        record.args()
    )
}

fn level_label(level: Level) -> ColoredString {
    let label = level.as_str();
    match level {
        Level::Error => label.red().bold(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Debug => label.blue(),
        Level::Trace => label.purple(),
    }
}
