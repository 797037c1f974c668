use crate::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, CONFIG_FILENAME, ConfigError, ConfigErrorResult,
    LoggingConfig, ServerConfig, ServiceConfig, UpdateConfig,
};

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub update: UpdateConfig,
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Load `.env` if present
    /// 2. Resolve the config directory (SU_CONFIG_DIR, else `.su/` next to the executable)
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply SU_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let _ = dotenvy::dotenv();

        let config_path = Self::config_dir()?.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load and parse TOML file with detailed error context.
    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: SU_CONFIG_DIR env var > `.su/` beside the running executable.
    ///
    /// Services start with the system directory as their working directory,
    /// so the executable's location is the only stable anchor.
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let exe = std::env::current_exe()
            .map_err(|e| ConfigError::config(format!("Cannot locate running executable: {e}")))?;
        let exe_dir = exe
            .parent()
            .ok_or_else(|| ConfigError::config("Running executable has no parent directory"))?;
        Ok(exe_dir.join(CONFIG_DIR_NAME))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.update.validate()?;
        self.service.validate()?;

        if let Some(file) = &self.logging.file
            && (file.contains("..") || Path::new(file).is_absolute())
        {
            return Err(ConfigError::config(
                "logging.file must be a plain file name inside logging.dir",
            ));
        }

        Ok(())
    }

    /// Absolute directory log files are written to.
    pub fn log_dir(&self) -> ConfigErrorResult<PathBuf> {
        Ok(Self::config_dir()?.join(&self.logging.dir))
    }

    /// Configuration summary, one line per section.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            String::from("Configuration loaded:"),
            format!(
                "  server: {} (grace {}s)",
                self.server.bind_addr(),
                self.server.shutdown_grace_secs
            ),
            format!(
                "  update: max {} bytes, reboot delay {}s, replacer {}, executable {}",
                self.update.max_upload_bytes,
                self.update.reboot_delay_secs,
                self.update.replacer,
                self.update
                    .executable_path
                    .as_deref()
                    .unwrap_or("<current executable>")
            ),
            format!(
                "  service: {} (tick {}s, slow tick {}s, interrogate echo {}ms)",
                self.service.name,
                self.service.tick_interval_secs,
                self.service.slow_tick_interval_secs,
                self.service.interrogate_echo_delay_ms
            ),
            format!(
                "  logging: {} (colored: {}, file: {})",
                self.logging.level,
                self.logging.colored,
                self.logging.file.as_deref().unwrap_or("<default>")
            ),
        ]
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("SU_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("SU_SERVER_PORT", &mut self.server.port);
        Self::apply_env_parse(
            "SU_SHUTDOWN_GRACE_SECS",
            &mut self.server.shutdown_grace_secs,
        );

        // Update
        Self::apply_env_parse("SU_MAX_UPLOAD_BYTES", &mut self.update.max_upload_bytes);
        Self::apply_env_parse("SU_REBOOT_DELAY_SECS", &mut self.update.reboot_delay_secs);
        Self::apply_env_option_string("SU_EXECUTABLE_PATH", &mut self.update.executable_path);
        Self::apply_env_parse("SU_REPLACER", &mut self.update.replacer);

        // Service
        Self::apply_env_string("SU_SERVICE_NAME", &mut self.service.name);
        Self::apply_env_parse(
            "SU_TICK_INTERVAL_SECS",
            &mut self.service.tick_interval_secs,
        );
        Self::apply_env_parse(
            "SU_SLOW_TICK_INTERVAL_SECS",
            &mut self.service.slow_tick_interval_secs,
        );
        Self::apply_env_parse(
            "SU_INTERROGATE_DELAY_MS",
            &mut self.service.interrogate_echo_delay_ms,
        );

        // Logging
        Self::apply_env_parse("SU_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("SU_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("SU_LOG_FILE", &mut self.logging.file);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
