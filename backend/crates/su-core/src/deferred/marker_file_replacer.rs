use crate::deferred::{DeferredReplace, register_chain};
use crate::{CoreError, CoreResult, PendingMarker, ServiceLogger, pending_marker_path};

use std::path::Path;
use std::sync::Mutex;

/// Portable replacer: records the chain in a marker file next to the
/// executable and carries it out the next time the service starts.
pub struct MarkerFileReplacer {
    log: ServiceLogger,
    write_lock: Mutex<()>,
}

/// Outcome of applying a pending marker at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingApplyReport {
    pub applied: usize,
    pub failed: usize,
    /// A rename onto the executable path succeeded
    pub replaced: bool,
}

impl MarkerFileReplacer {
    pub fn new(log: ServiceLogger) -> Self {
        Self {
            log,
            write_lock: Mutex::new(()),
        }
    }

    /// Carry out the operations a previous run registered for `original`,
    /// then remove the marker.
    ///
    /// Operations run in registration order and failures are logged one by
    /// one. A lost staging file only fails its rename, the current
    /// executable stays in place.
    pub fn apply_pending(&self, original: &Path) -> CoreResult<PendingApplyReport> {
        let marker_path = pending_marker_path(original);
        let mut report = PendingApplyReport::default();

        if !marker_path.exists() {
            return Ok(report);
        }

        let marker = match PendingMarker::load(&marker_path) {
            Ok(marker) => marker,
            Err(e) => {
                // A marker that cannot be parsed would block every start.
                let _ = std::fs::remove_file(&marker_path);
                return Err(e);
            }
        };

        self.log.info(format!(
            "Applying {} pending operation(s) from {}",
            marker.entries.len(),
            marker_path.display()
        ));

        for entry in &marker.entries {
            let operation = &entry.operation;

            match operation.apply() {
                Ok(()) => {
                    report.applied += 1;
                    if operation.destination() == Some(original) {
                        report.replaced = true;
                    }
                    self.log.info(format!("Applied {operation}"));
                }
                Err(e) => {
                    report.failed += 1;
                    self.log.error(format!("Failed to apply {operation}: {e}"));
                }
            }
        }

        std::fs::remove_file(&marker_path).map_err(|e| CoreError::io(&marker_path, e))?;

        Ok(report)
    }
}

impl DeferredReplace for MarkerFileReplacer {
    fn schedule(&self, original: &Path, staged: &Path) -> CoreResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let marker_path = pending_marker_path(original);
        let mut marker = match PendingMarker::load(&marker_path) {
            Ok(marker) => marker,
            Err(e) => {
                self.log
                    .warn(format!("Discarding unreadable pending marker: {e}"));
                PendingMarker::default()
            }
        };

        let superseded = marker.forget_replacement(original, staged);
        if superseded > 0 {
            self.log.info(format!(
                "Superseded {superseded} operation(s) from an earlier update"
            ));
        }

        register_chain(&self.log, original, staged, |operation| {
            marker.push(operation.clone());
            marker.save(&marker_path).inspect_err(|_| {
                marker.entries.pop();
            })
        })
    }

    fn name(&self) -> &'static str {
        "marker"
    }
}
