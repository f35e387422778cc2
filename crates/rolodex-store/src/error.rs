use std::fmt;
use std::path::PathBuf;

use rolodex_types::UserId;

/// Coarse failure taxonomy shared by every layer above the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Lookup miss: the identifier was never issued or has been deleted.
    RecordNotFound,
    /// The document could not be read or written.
    StoreUnavailable,
    /// The document was read but is malformed.
    StoreCorrupt,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RecordNotFound => "record not found",
            Self::StoreUnavailable => "store unavailable",
            Self::StoreCorrupt => "store corrupt",
        };
        f.write_str(s)
    }
}

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested user does not exist.
    #[error("user not found: {0}")]
    NotFound(UserId),

    /// The document file could not be read or written.
    #[error("store unavailable at {}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be decoded, encoded, or violates an invariant.
    #[error("store document at {} is corrupt: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}

impl StoreError {
    pub fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unavailable {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// The failure kind, preserved across every wrapping layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::RecordNotFound,
            Self::Unavailable { .. } => ErrorKind::StoreUnavailable,
            Self::Corrupt { .. } => ErrorKind::StoreCorrupt,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::RecordNotFound
    }
}

/// Result alias for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;
