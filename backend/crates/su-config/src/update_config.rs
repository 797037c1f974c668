use crate::{ConfigError, ConfigErrorResult, ReplacerKind};

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

// Upload constraints
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 32 << 20;
pub const MIN_MAX_UPLOAD_BYTES: u64 = 1 << 10;
pub const MAX_MAX_UPLOAD_BYTES: u64 = 1 << 30;

pub const DEFAULT_REBOOT_DELAY_SECS: u64 = 10;
pub const MAX_REBOOT_DELAY_SECS: u64 = 600;

/// Settings for the self-update endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Largest accepted request body for an upload
    pub max_upload_bytes: u64,
    /// Delay handed to the OS restart request
    pub reboot_delay_secs: u64,
    /// Replaces the running executable's path (tests, side-by-side installs)
    pub executable_path: Option<String>,
    pub replacer: ReplacerKind,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            reboot_delay_secs: DEFAULT_REBOOT_DELAY_SECS,
            executable_path: None,
            replacer: ReplacerKind::default(),
        }
    }
}

impl UpdateConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.max_upload_bytes < MIN_MAX_UPLOAD_BYTES
            || self.max_upload_bytes > MAX_MAX_UPLOAD_BYTES
        {
            return Err(ConfigError::update(format!(
                "update.max_upload_bytes must be {}-{}, got {}",
                MIN_MAX_UPLOAD_BYTES, MAX_MAX_UPLOAD_BYTES, self.max_upload_bytes
            )));
        }

        if self.reboot_delay_secs > MAX_REBOOT_DELAY_SECS {
            return Err(ConfigError::update(format!(
                "update.reboot_delay_secs must be 0-{}, got {}",
                MAX_REBOOT_DELAY_SECS, self.reboot_delay_secs
            )));
        }

        if let Some(path) = &self.executable_path
            && path.trim().is_empty()
        {
            return Err(ConfigError::update(
                "update.executable_path must not be empty when set",
            ));
        }

        Ok(())
    }

    pub fn reboot_delay(&self) -> Duration {
        Duration::from_secs(self.reboot_delay_secs)
    }

    pub fn executable_override(&self) -> Option<PathBuf> {
        self.executable_path.as_ref().map(PathBuf::from)
    }
}
