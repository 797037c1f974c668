//! Marker file used by the portable replacer.
//!
//! File location: `<executable path>.pending`, next to the executable it
//! replaces. Contents are JSON, operations in registration order.

use crate::{CoreError, CoreResult, DeferredOperation};

use std::ffi::OsString;
use std::panic::Location;
use std::path::{Path, PathBuf};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

const PENDING_SUFFIX: &str = ".pending";
const TEMP_SUFFIX: &str = ".tmp";

/// Path of the marker belonging to `original`.
pub fn pending_marker_path(original: &Path) -> PathBuf {
    with_suffix(original, PENDING_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingMarker {
    pub entries: Vec<PendingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEntry {
    /// RFC 3339 registration time, for diagnostics
    pub registered_at: String,
    pub operation: DeferredOperation,
}

impl PendingMarker {
    /// Read the marker; a missing file is an empty marker.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(CoreError::io(path, e)),
        };

        serde_json::from_str(&contents).map_err(|source| CoreError::Marker {
            path: path.to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Write through a temp file and rename, so a crash never leaves half a marker.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let content = serde_json::to_string_pretty(self).map_err(|source| CoreError::Marker {
            path: path.to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp = with_suffix(path, TEMP_SUFFIX);
        std::fs::write(&temp, content).map_err(|e| CoreError::io(&temp, e))?;
        std::fs::rename(&temp, path).map_err(|e| CoreError::io(path, e))
    }

    pub fn push(&mut self, operation: DeferredOperation) {
        self.entries.push(PendingEntry {
            registered_at: chrono::Utc::now().to_rfc3339(),
            operation,
        });
    }

    /// Drop entries an earlier update registered for the same replacement,
    /// so the marker does not grow with every upload.
    ///
    /// Deletions of other staged paths are kept so stale uploads still get
    /// cleaned up. Returns the number of dropped entries.
    pub fn forget_replacement(&mut self, original: &Path, staged: &Path) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| match &entry.operation {
            DeferredOperation::Delete { path } => path != original && path != staged,
            DeferredOperation::Rename { to, .. } => to != original,
        });
        before - self.entries.len()
    }
}
