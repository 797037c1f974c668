use crate::error::{Result as ServerErrorResult, ServerError};

use su_config::{Config, LogLevel};
use su_core::ServiceLogger;

use std::fmt::Arguments;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::Record;

const DEFAULT_LOG_FILE: &str = "su-service.log";

/// Where the service writes its log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Interactive debug mode
    Stdout { colored: bool },
    /// Production mode, appended to the file
    File(PathBuf),
}

impl LogTarget {
    /// Debug runs log to the console; everything else goes to
    /// `<config dir>/<logging.dir>/<logging.file>`, created on demand.
    pub fn for_run(config: &Config, debug: bool) -> ServerErrorResult<Self> {
        if debug {
            return Ok(LogTarget::Stdout {
                colored: config.logging.colored,
            });
        }

        let log_dir = config.log_dir()?;
        std::fs::create_dir_all(&log_dir).map_err(|e| {
            ServerError::io(
                format!("Failed to create log directory {}", log_dir.display()),
                e,
            )
        })?;

        let file = config.logging.file.as_deref().unwrap_or(DEFAULT_LOG_FILE);
        Ok(LogTarget::File(log_dir.join(file)))
    }
}

/// Build the service logger with fern.
///
/// The dispatch is turned into a standalone `log::Log` and wrapped in a
/// [`ServiceLogger`]; nothing is installed as the global logger. Failure here
/// is fatal for the service.
#[track_caller]
pub fn build(log_level: LogLevel, target: LogTarget) -> ServerErrorResult<ServiceLogger> {
    let level_filter = log_level.0;

    let output = match &target {
        LogTarget::File(log_path) => {
            // File output (no colors, plain format)
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)
                .map_err(|e| {
                    ServerError::logger(format!(
                        "Failed to open log file {}: {e}",
                        log_path.display()
                    ))
                })?;

            Dispatch::new().format(plain).chain(file)
        }
        LogTarget::Stdout { colored: true } => {
            let colors = ColoredLevelConfig::new()
                .trace(Color::Magenta)
                .debug(Color::Blue)
                .info(Color::Green)
                .warn(Color::Yellow)
                .error(Color::Red);

            Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!(
                        "[{date} - {level}] {message} [{file}:{line}]",
                        date = humantime::format_rfc3339(SystemTime::now()),
                        level = colors.color(record.level()),
                        message = message,
                        file = record.file().unwrap_or("unknown"),
                        line = record.line().unwrap_or(0),
                    ))
                })
                .chain(std::io::stdout())
        }
        LogTarget::Stdout { colored: false } => {
            Dispatch::new().format(plain).chain(std::io::stdout())
        }
    };

    let (max_level, log) = Dispatch::new().level(level_filter).chain(output).into_log();
    let logger = ServiceLogger::new(max_level, Arc::from(log));

    match target {
        LogTarget::File(path) => logger.info(format!(
            "Logger initialized: level={level_filter:?}, file={}",
            path.display()
        )),
        LogTarget::Stdout { .. } => {
            logger.info(format!("Logger initialized: level={level_filter:?}, stdout"))
        }
    }

    Ok(logger)
}

fn plain(out: FormatCallback, message: &Arguments, record: &Record) {
    out.finish(format_args!(
        "[{date} - {level}] {message} [{file}:{line}]",
        date = humantime::format_rfc3339(SystemTime::now()),
        level = record.level(),
        message = message,
        file = record.file().unwrap_or("unknown"),
        line = record.line().unwrap_or(0),
    ))
}
