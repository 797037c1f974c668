#[cfg(windows)]
pub(crate) mod boot_move_replacer;
pub(crate) mod deferred_operation;
pub(crate) mod marker_file_replacer;
pub(crate) mod pending_marker;

use crate::{CoreError, CoreResult, DeferredOperation, MarkerFileReplacer, ServiceLogger};

use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

use error_location::ErrorLocation;
use su_config::ReplacerKind;

/// Schedules the replacement of the running executable.
///
/// Nothing is touched immediately: the swap happens after the process has
/// exited, at the next boot (or next start for the marker fallback).
pub trait DeferredReplace: Send + Sync {
    /// Register the chain that moves `staged` over `original`.
    ///
    /// Every step is attempted even when an earlier one fails; failures are
    /// logged one by one and never retried.
    fn schedule(&self, original: &Path, staged: &Path) -> CoreResult<()>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

/// Build the replacer selected in config.
pub fn replacer_for(
    kind: ReplacerKind,
    log: ServiceLogger,
) -> CoreResult<Arc<dyn DeferredReplace>> {
    match kind {
        ReplacerKind::Marker => Ok(Arc::new(MarkerFileReplacer::new(log))),
        #[cfg(windows)]
        ReplacerKind::Auto | ReplacerKind::Native => {
            Ok(Arc::new(crate::BootMoveReplacer::new(log)))
        }
        #[cfg(not(windows))]
        ReplacerKind::Auto => Ok(Arc::new(MarkerFileReplacer::new(log))),
        #[cfg(not(windows))]
        ReplacerKind::Native => Err(CoreError::unsupported(
            "boot-time file operations need Windows, set update.replacer = \"marker\"",
        )),
    }
}

/// Register the replacement chain one operation at a time.
#[track_caller]
pub(crate) fn register_chain<F>(
    log: &ServiceLogger,
    original: &Path,
    staged: &Path,
    mut register: F,
) -> CoreResult<()>
where
    F: FnMut(&DeferredOperation) -> CoreResult<()>,
{
    let location = Location::caller();
    let chain = DeferredOperation::replacement_chain(original, staged);
    let mut failed = 0;

    for (step, operation) in chain.iter().enumerate() {
        match register(operation) {
            Ok(()) => log.info(format!("Deferred step {}: {operation}", step + 1)),
            Err(e) => {
                failed += 1;
                log.error(format!(
                    "Deferred step {} ({operation}) not registered: {e}",
                    step + 1
                ));
            }
        }
    }

    if failed == 0 {
        Ok(())
    } else {
        Err(CoreError::DeferredSchedule {
            original: original.to_path_buf(),
            failed,
            total: chain.len(),
            location: ErrorLocation::from(location),
        })
    }
}
