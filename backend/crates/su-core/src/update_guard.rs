use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Busy indicator serializing self-updates.
///
/// One upload → stage → schedule sequence may run at a time. The permit
/// returned by [`UpdateGuard::try_acquire`] releases the guard when dropped,
/// including on early error returns.
#[derive(Clone, Default)]
pub struct UpdateGuard {
    busy: Arc<AtomicBool>,
}

impl UpdateGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard, or `None` when another update holds it
    pub fn try_acquire(&self) -> Option<UpdatePermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| UpdatePermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof of holding the [`UpdateGuard`].
#[must_use = "the update guard is released as soon as the permit is dropped"]
pub struct UpdatePermit {
    busy: Arc<AtomicBool>,
}

impl Drop for UpdatePermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
