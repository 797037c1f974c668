mod config;
mod error;
mod log_level;
mod logging_config;
mod replacer_kind;
mod server_config;
mod service_config;
mod update_config;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use replacer_kind::ReplacerKind;
pub use server_config::ServerConfig;
pub use service_config::ServiceConfig;
pub use update_config::UpdateConfig;

/// Port the service listens on and the CLI connects to.
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SERVICE_NAME: &str = "su-service";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";
const CONFIG_DIR_ENV: &str = "SU_CONFIG_DIR";
const CONFIG_DIR_NAME: &str = ".su";
const CONFIG_FILENAME: &str = "config.toml";
