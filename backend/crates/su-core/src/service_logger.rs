use std::fmt::{self, Display};
use std::panic::Location;
use std::sync::Arc;

use log::{Level, LevelFilter, Log, Metadata, Record};

const LOG_TARGET: &str = "su";

/// Logger handed to each service component at construction.
///
/// Wraps a `log::Log` implementation (normally the fern dispatch built by the
/// service entry point) without installing it as the process-wide logger, so
/// its lifetime is the lifetime of the service run that created it.
#[derive(Clone)]
pub struct ServiceLogger {
    inner: Arc<dyn Log>,
    level: LevelFilter,
}

impl ServiceLogger {
    pub fn new(level: LevelFilter, inner: Arc<dyn Log>) -> Self {
        Self { inner, level }
    }

    /// Logger that drops every record.
    pub fn discard() -> Self {
        Self::new(LevelFilter::Off, Arc::new(DiscardLog))
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    #[track_caller]
    pub fn error(&self, message: impl Display) {
        self.emit(Level::Error, &message, Location::caller());
    }

    #[track_caller]
    pub fn warn(&self, message: impl Display) {
        self.emit(Level::Warn, &message, Location::caller());
    }

    #[track_caller]
    pub fn info(&self, message: impl Display) {
        self.emit(Level::Info, &message, Location::caller());
    }

    #[track_caller]
    pub fn debug(&self, message: impl Display) {
        self.emit(Level::Debug, &message, Location::caller());
    }

    pub fn flush(&self) {
        self.inner.flush();
    }

    fn emit(&self, level: Level, message: &dyn Display, location: &'static Location<'static>) {
        if level > self.level {
            return;
        }

        let metadata = Metadata::builder().level(level).target(LOG_TARGET).build();
        if !self.inner.enabled(&metadata) {
            return;
        }

        self.inner.log(
            &Record::builder()
                .metadata(metadata)
                .args(format_args!("{message}"))
                .file(Some(location.file()))
                .line(Some(location.line()))
                .build(),
        );
    }
}

impl fmt::Debug for ServiceLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceLogger")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

struct DiscardLog;

impl Log for DiscardLog {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        false
    }

    fn log(&self, _record: &Record) {}

    fn flush(&self) {}
}
