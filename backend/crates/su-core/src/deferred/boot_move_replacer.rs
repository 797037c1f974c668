use crate::deferred::{DeferredReplace, register_chain};
use crate::{CoreError, CoreResult, DeferredOperation, ServiceLogger};

use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use windows_sys::Win32::Storage::FileSystem::{
    MOVEFILE_DELAY_UNTIL_REBOOT, MOVEFILE_REPLACE_EXISTING, MoveFileExW,
};

/// Registers the chain with the OS boot-time move list
/// (`PendingFileRenameOperations`). Requires administrator rights, which the
/// service account has.
///
/// The list survives service restarts and keeps every entry, so the same
/// chain may be registered several times before the next boot. The chain
/// is built to tolerate that.
pub struct BootMoveReplacer {
    log: ServiceLogger,
}

impl BootMoveReplacer {
    pub fn new(log: ServiceLogger) -> Self {
        Self { log }
    }

    fn register(operation: &DeferredOperation) -> CoreResult<()> {
        let source = to_wide(operation.source());
        let destination = operation.destination().map(to_wide);
        let flags = match operation {
            DeferredOperation::Delete { .. } => MOVEFILE_DELAY_UNTIL_REBOOT,
            DeferredOperation::Rename { .. } => {
                MOVEFILE_DELAY_UNTIL_REBOOT | MOVEFILE_REPLACE_EXISTING
            }
        };

        // SAFETY: both buffers are NUL-terminated UTF-16 that outlive the
        // call; a null destination registers a deletion.
        let ok = unsafe {
            MoveFileExW(
                source.as_ptr(),
                destination
                    .as_ref()
                    .map_or(std::ptr::null(), |wide| wide.as_ptr()),
                flags,
            )
        };

        if ok == 0 {
            Err(CoreError::io(operation.source(), std::io::Error::last_os_error()))
        } else {
            Ok(())
        }
    }
}

impl DeferredReplace for BootMoveReplacer {
    fn schedule(&self, original: &Path, staged: &Path) -> CoreResult<()> {
        register_chain(&self.log, original, staged, Self::register)
    }

    fn name(&self) -> &'static str {
        "boot-move"
    }
}

fn to_wide(path: &Path) -> Vec<u16> {
    path.as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}
