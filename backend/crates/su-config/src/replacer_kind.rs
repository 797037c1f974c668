use crate::ConfigError;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Which deferred-replacement backend the service uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplacerKind {
    /// Native boot-time operations where the OS has them, marker file elsewhere
    #[default]
    Auto,
    /// OS boot-time file operations (Windows only)
    Native,
    /// Marker file applied on the next service start
    Marker,
}

impl fmt::Display for ReplacerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplacerKind::Auto => "auto",
            ReplacerKind::Native => "native",
            ReplacerKind::Marker => "marker",
        };
        f.write_str(name)
    }
}

impl FromStr for ReplacerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(ReplacerKind::Auto),
            "native" => Ok(ReplacerKind::Native),
            "marker" => Ok(ReplacerKind::Marker),
            other => Err(ConfigError::update(format!(
                "unknown replacer '{other}' (expected auto, native or marker)"
            ))),
        }
    }
}
