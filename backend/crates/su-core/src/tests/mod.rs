mod deferred;

use crate::ServiceLogger;

use std::sync::{Arc, Mutex};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// In-memory `log::Log` used to assert on what components report.
#[derive(Default)]
pub(crate) struct CapturedLog {
    lines: Mutex<Vec<(Level, String)>>,
}

impl CapturedLog {
    pub(crate) fn logger(level: LevelFilter) -> (ServiceLogger, Arc<CapturedLog>) {
        let captured = Arc::new(CapturedLog::default());
        (ServiceLogger::new(level, captured.clone()), captured)
    }

    pub(crate) fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, level: Level) -> usize {
        self.lines().iter().filter(|(l, _)| *l == level).count()
    }
}

impl Log for CapturedLog {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let line = format!(
            "{} [{}:{}]",
            record.args(),
            record.file().unwrap_or("?"),
            record.line().unwrap_or(0)
        );
        self.lines.lock().unwrap().push((record.level(), line));
    }

    fn flush(&self) {}
}
