/// Error types for compression and saving
///
/// Every failure the user can trigger ends up here and is shown as a
/// notice instead of taking the application down.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CompressError {
    /// The source bytes are not an image we can decode
    #[error("Could not decode image: {0}")]
    Decode(String),

    /// The JPEG encoder rejected the bitmap
    #[error("Could not encode image: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(String),

    /// The OS refused the write
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// Save was requested before any compressed result existed
    #[error("Nothing to save yet")]
    NothingToSave,

    #[error("Could not locate a Pictures or home directory")]
    NoPicturesDir,

    /// A background task panicked or was cancelled
    #[error("Worker failed: {0}")]
    Worker(String),
}

pub type CompressResult<T> = Result<T, CompressError>;

impl CompressError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Convert a write failure, keeping permission problems distinct
    pub fn from_write(err: io::Error, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.into()),
            _ => Self::Io(err.to_string()),
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}

impl From<io::Error> for CompressError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<tokio::task::JoinError> for CompressError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Worker(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_error_is_kept_distinct() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let converted = CompressError::from_write(err, "/tmp/out.jpg");
        assert!(converted.is_permission_denied());

        let err = io::Error::new(io::ErrorKind::Other, "disk full");
        let converted = CompressError::from_write(err, "/tmp/out.jpg");
        assert!(matches!(converted, CompressError::Io(_)));
    }
}
