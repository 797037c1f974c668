use crate::ShutdownCoordinator;

use tokio::sync::watch;

/// Helper for gracefully handling shutdown in async tasks
pub struct ShutdownGuard {
    shutdown_rx: watch::Receiver<bool>,
}

impl ShutdownGuard {
    pub fn new(coordinator: &ShutdownCoordinator) -> Self {
        Self {
            shutdown_rx: coordinator.subscribe(),
        }
    }

    /// Wait for shutdown signal. Returns immediately if it was already sent.
    pub async fn wait(&mut self) {
        // An error means the coordinator is gone, which also ends the wait
        let _ = self.shutdown_rx.wait_for(|stopping| *stopping).await;
    }

    /// Check for shutdown signal without waiting
    pub fn poll_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }
}
