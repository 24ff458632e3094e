//! Error types for preview extraction

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::tiff::errors::TiffError;

/// Preview extraction errors
///
/// Only conditions the caller must act on are errors. A candidate preview
/// that fails validation or whose embedded image cannot be decoded is simply
/// left out of the enumeration.
#[derive(Debug)]
pub enum PreviewError {
    /// The source file could not be opened or mapped
    Io { path: PathBuf, source: io::Error },
    /// Re-encoding a reconstructed image failed
    Encode(TiffError),
    /// A metadata key could not be parsed or resolved
    InvalidKey(String),
    /// Generic error with message
    GenericError(String),
}

impl PreviewError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PreviewError::Io { path: path.into(), source }
    }
}

impl fmt::Display for PreviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewError::Io { path, source } =>
                write!(f, "Failed to read {}: {}", path.display(), source),
            PreviewError::Encode(e) => write!(f, "Failed to encode preview: {}", e),
            PreviewError::InvalidKey(key) => write!(f, "Invalid metadata key: {}", key),
            PreviewError::GenericError(msg) => write!(f, "Preview error: {}", msg),
        }
    }
}

impl std::error::Error for PreviewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PreviewError::Io { source, .. } => Some(source),
            PreviewError::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TiffError> for PreviewError {
    fn from(error: TiffError) -> Self {
        PreviewError::Encode(error)
    }
}

impl From<String> for PreviewError {
    fn from(msg: String) -> Self {
        PreviewError::GenericError(msg)
    }
}

/// Result type for preview operations
pub type PreviewResult<T> = Result<T, PreviewError>;
