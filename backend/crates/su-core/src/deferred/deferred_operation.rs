use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File operation registered now and carried out at the next boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum DeferredOperation {
    Delete { path: PathBuf },
    Rename { from: PathBuf, to: PathBuf },
}

impl DeferredOperation {
    /// Chain that swaps `staged` into `original`, in registration order:
    /// move the staged binary over the original, then delete the staged
    /// path in case the move failed and left it behind.
    ///
    /// Registering the chain again is harmless. A repeated move finds
    /// nothing to move and the repeated delete finds nothing to delete, so
    /// the latest staged binary stays at `original`.
    pub fn replacement_chain(original: &Path, staged: &Path) -> [DeferredOperation; 2] {
        [
            DeferredOperation::Rename {
                from: staged.to_path_buf(),
                to: original.to_path_buf(),
            },
            DeferredOperation::Delete {
                path: staged.to_path_buf(),
            },
        ]
    }

    pub fn source(&self) -> &Path {
        match self {
            DeferredOperation::Delete { path } => path,
            DeferredOperation::Rename { from, .. } => from,
        }
    }

    /// Destination of a rename; `None` for a deletion.
    pub fn destination(&self) -> Option<&Path> {
        match self {
            DeferredOperation::Delete { .. } => None,
            DeferredOperation::Rename { to, .. } => Some(to),
        }
    }

    /// Carry the operation out immediately.
    ///
    /// Deleting a path that is already gone counts as success. A rename
    /// replaces an existing destination.
    pub fn apply(&self) -> io::Result<()> {
        match self {
            DeferredOperation::Delete { path } => match std::fs::remove_file(path) {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
            DeferredOperation::Rename { from, to } => std::fs::rename(from, to),
        }
    }
}

impl fmt::Display for DeferredOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeferredOperation::Delete { path } => write!(f, "delete {}", path.display()),
            DeferredOperation::Rename { from, to } => {
                write!(f, "rename {} -> {}", from.display(), to.display())
            }
        }
    }
}
