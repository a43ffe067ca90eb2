//! Error types for the asset system

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::path::AssetPath;

/// Result type for asset operations
pub type AssetResult<T> = std::result::Result<T, AssetError>;

/// Errors that can occur while indexing, opening, analyzing or deleting assets
#[derive(Debug, Error)]
pub enum AssetError {
    /// Listing, reading or removing failed
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The operating system refused access
    #[error("Permission denied: '{}'", .path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A scene or atlas could not be parsed
    #[error("Corrupt asset '{path}': {message}")]
    CorruptFormat {
        path: AssetPath,
        message: String,
    },

    /// String is not a valid asset path
    #[error("Invalid asset path '{path}': {reason}")]
    InvalidPath {
        path: String,
        reason: &'static str,
    },

    /// Filesystem path is not below the asset root
    #[error("'{}' lies outside the asset root", .0.display())]
    OutsideRoot(PathBuf),

    /// Usage analysis requested for a kind scenes never reference
    #[error("'{0}' is not an asset kind that scenes reference")]
    NotAnalyzable(AssetPath),

    /// No document loader exists for this kind
    #[error("'{0}' cannot be opened")]
    NotOpenable(AssetPath),

    /// Another delete of the same path has not been resolved yet
    #[error("A delete of '{0}' is already in progress")]
    DeleteInProgress(AssetPath),

    /// Programming error, e.g. two live handles for one path
    #[error("State invariant violated: {0}")]
    StateInvariant(String),

    /// The watcher backend failed
    #[error("Watcher error: {0}")]
    Watch(String),
}

/// Coarse classification reported to the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    CorruptFormat,
    Permission,
    StateInvariant,
    InvalidRequest,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io => write!(f, "io"),
            Self::CorruptFormat => write!(f, "corrupt-format"),
            Self::Permission => write!(f, "permission"),
            Self::StateInvariant => write!(f, "state-invariant"),
            Self::InvalidRequest => write!(f, "invalid-request"),
        }
    }
}

impl AssetError {
    /// Wrap an I/O error, separating permission failures
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::PermissionDenied {
            AssetError::PermissionDenied { path, source }
        } else {
            AssetError::Io { path, source }
        }
    }

    /// Create a corrupt format error
    pub fn corrupt(path: &AssetPath, message: impl Into<String>) -> Self {
        AssetError::CorruptFormat {
            path: path.clone(),
            message: message.into(),
        }
    }

    /// Classify for user-facing reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            AssetError::Io { .. } | AssetError::Watch(_) => ErrorKind::Io,
            AssetError::PermissionDenied { .. } => ErrorKind::Permission,
            AssetError::CorruptFormat { .. } => ErrorKind::CorruptFormat,
            AssetError::StateInvariant(_) => ErrorKind::StateInvariant,
            AssetError::InvalidPath { .. }
            | AssetError::OutsideRoot(_)
            | AssetError::NotAnalyzable(_)
            | AssetError::NotOpenable(_)
            | AssetError::DeleteInProgress(_) => ErrorKind::InvalidRequest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_separated() {
        let err = AssetError::io("gfx/a.png", io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(err.kind(), ErrorKind::Permission);

        let err = AssetError::io("gfx/a.png", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_corrupt_message() {
        let path = AssetPath::new("scene/level.scene").unwrap();
        let err = AssetError::corrupt(&path, "expected value at line 1");
        assert_eq!(err.kind(), ErrorKind::CorruptFormat);
        assert_eq!(
            err.to_string(),
            "Corrupt asset 'scene/level.scene': expected value at line 1"
        );
    }
}
