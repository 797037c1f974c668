use crate::{ConfigError, ConfigErrorResult, DEFAULT_SERVICE_NAME};

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_SLOW_TICK_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_INTERROGATE_DELAY_MS: u64 = 100;
pub const MAX_INTERROGATE_DELAY_MS: u64 = 5_000;

/// Service manager integration and control loop timing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Name registered with the host service manager
    pub name: String,
    /// Heartbeat period while running
    pub tick_interval_secs: u64,
    /// Heartbeat period while paused
    pub slow_tick_interval_secs: u64,
    /// Pause between the two status echoes answering an interrogate request
    pub interrogate_echo_delay_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: String::from(DEFAULT_SERVICE_NAME),
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            slow_tick_interval_secs: DEFAULT_SLOW_TICK_INTERVAL_SECS,
            interrogate_echo_delay_ms: DEFAULT_INTERROGATE_DELAY_MS,
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.name.trim().is_empty() || self.name.contains(['/', '\\']) {
            return Err(ConfigError::service(format!(
                "service.name must be a non-empty name without path separators, got '{}'",
                self.name
            )));
        }

        if self.tick_interval_secs == 0 || self.slow_tick_interval_secs == 0 {
            return Err(ConfigError::service(
                "service.tick_interval_secs and service.slow_tick_interval_secs must be non-zero",
            ));
        }

        if self.interrogate_echo_delay_ms == 0
            || self.interrogate_echo_delay_ms > MAX_INTERROGATE_DELAY_MS
        {
            return Err(ConfigError::service(format!(
                "service.interrogate_echo_delay_ms must be 1-{}, got {}",
                MAX_INTERROGATE_DELAY_MS, self.interrogate_echo_delay_ms
            )));
        }

        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn slow_tick_interval(&self) -> Duration {
        Duration::from_secs(self.slow_tick_interval_secs)
    }

    pub fn interrogate_echo_delay(&self) -> Duration {
        Duration::from_millis(self.interrogate_echo_delay_ms)
    }
}
