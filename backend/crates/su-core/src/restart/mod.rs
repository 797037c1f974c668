pub(crate) mod system_restart;

use crate::CoreResult;

/// Asks the operating system for a restart.
///
/// Called from a blocking context after the deferred chain is registered.
/// Callers log failures and move on; there is no retry.
pub trait RestartTrigger: Send + Sync {
    fn request_restart(&self) -> CoreResult<()>;
}
