//! Update primitives shared by the service: deferred replacement of the
//! running executable, restart requests, the update busy guard, shutdown
//! signalling and the explicit service logger.

mod deferred;
mod error;
mod restart;
mod service_logger;
mod shutdown_coordinator;
mod shutdown_guard;
mod update_guard;

#[cfg(test)]
mod tests;

#[cfg(windows)]
pub use deferred::boot_move_replacer::BootMoveReplacer;
pub use deferred::{
    DeferredReplace, deferred_operation::DeferredOperation,
    marker_file_replacer::{MarkerFileReplacer, PendingApplyReport},
    pending_marker::{PendingEntry, PendingMarker, pending_marker_path},
    replacer_for,
};
pub use error::{CoreError, Result as CoreResult};
pub use restart::{RestartTrigger, system_restart::SystemRestart};
pub use service_logger::ServiceLogger;
pub use shutdown_coordinator::ShutdownCoordinator;
pub use shutdown_guard::ShutdownGuard;
pub use update_guard::{UpdateGuard, UpdatePermit};

/// Suffix appended to the uploaded file name to form the staging path.
pub const STAGING_SUFFIX: &str = "_new";
