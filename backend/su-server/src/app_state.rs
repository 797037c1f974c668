use crate::ServerResult;

use su_config::Config;
use su_core::{
    DeferredReplace, RestartTrigger, ServiceLogger, SystemRestart, UpdateGuard, replacer_for,
};

use std::path::PathBuf;
use std::sync::Arc;

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub log: ServiceLogger,
    pub update_guard: UpdateGuard,
    pub replacer: Arc<dyn DeferredReplace>,
    pub restart: Arc<dyn RestartTrigger>,
    /// Replaces `current_exe()` as the update target when set
    pub executable_override: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &Config, log: ServiceLogger) -> ServerResult<Self> {
        let replacer = replacer_for(config.update.replacer, log.clone())?;
        log.info(format!("Deferred replacement backend: {}", replacer.name()));

        Ok(Self {
            replacer,
            restart: Arc::new(SystemRestart::new(config.update.reboot_delay())),
            update_guard: UpdateGuard::new(),
            executable_override: config.update.executable_override(),
            max_upload_bytes: usize::try_from(config.update.max_upload_bytes)
                .unwrap_or(usize::MAX),
            log,
        })
    }

    /// Path of the executable an update replaces.
    pub fn executable_path(&self) -> std::io::Result<PathBuf> {
        match &self.executable_override {
            Some(path) => Ok(path.clone()),
            None => std::env::current_exe(),
        }
    }
}
