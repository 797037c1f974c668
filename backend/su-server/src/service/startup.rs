use su_core::{MarkerFileReplacer, ServiceLogger, pending_marker_path};

use std::path::Path;

/// Apply a replacement the marker-file backend left for `executable`.
///
/// Returns true when the executable on disk was swapped, in which case the
/// running image is stale. Failures are logged; startup continues with
/// whatever binary is in place.
pub fn apply_pending_update(executable: &Path, log: &ServiceLogger) -> bool {
    if !pending_marker_path(executable).exists() {
        return false;
    }

    match MarkerFileReplacer::new(log.clone()).apply_pending(executable) {
        Ok(report) => {
            log.info(format!(
                "Pending update: {} applied, {} failed",
                report.applied, report.failed
            ));
            report.replaced
        }
        Err(e) => {
            log.error(format!("Pending update not applied: {e}"));
            false
        }
    }
}
