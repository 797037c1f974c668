use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to schedule {failed} of {total} deferred operations for {original} {location}")]
    DeferredSchedule {
        original: PathBuf,
        failed: usize,
        total: usize,
        location: ErrorLocation,
    },

    #[error("IO error on {path}: {source} {location}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Pending marker {path} is malformed: {source} {location}")]
    Marker {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },

    #[error("Restart request failed: {message} {location}")]
    Restart {
        message: String,
        location: ErrorLocation,
    },

    #[error("Not supported on this platform: {message} {location}")]
    Unsupported {
        message: String,
        location: ErrorLocation,
    },
}

impl CoreError {
    #[track_caller]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::Io {
            path: path.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn restart<S: Into<String>>(message: S) -> Self {
        CoreError::Restart {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unsupported<S: Into<String>>(message: S) -> Self {
        CoreError::Unsupported {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
