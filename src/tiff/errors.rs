//! Error types for TIFF reading and writing

use std::fmt;
use std::io;

/// Errors raised while parsing or encoding a TIFF structure
#[derive(Debug)]
pub enum TiffError {
    /// Underlying read or write failed
    IoError(io::Error),
    /// The first two bytes are neither "II" nor "MM"
    InvalidByteOrder(u16),
    /// A BigTIFF header with an unexpected offset size or reserved word
    InvalidBigTIFFHeader,
    /// Version word other than 42, 43 or the RW2 variant
    UnsupportedVersion(u16),
    TagNotFound(u16),
    UnsupportedFieldType(u16),
    /// A value points outside the structure being read
    ValueOutOfBounds { tag: u16, offset: u64, size: u64 },
    GenericError(String),
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiffError::IoError(e) => write!(f, "I/O error: {}", e),
            TiffError::InvalidByteOrder(v) => write!(f, "Not a TIFF structure (byte order marker {:#06x})", v),
            TiffError::InvalidBigTIFFHeader => write!(f, "Malformed BigTIFF header"),
            TiffError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version {}", v),
            TiffError::TagNotFound(tag) => write!(f, "Tag {} not present", tag),
            TiffError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type {}", ft),
            TiffError::ValueOutOfBounds { tag, offset, size } =>
                write!(f, "Value of tag {} at offset {} ({} bytes) lies outside the structure", tag, offset, size),
            TiffError::GenericError(msg) => write!(f, "TIFF error: {}", msg),
        }
    }
}

impl std::error::Error for TiffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TiffError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TiffError {
    fn from(error: io::Error) -> Self {
        TiffError::IoError(error)
    }
}

impl From<String> for TiffError {
    fn from(msg: String) -> Self {
        TiffError::GenericError(msg)
    }
}

/// Result type for TIFF operations
pub type TiffResult<T> = Result<T, TiffError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_errors_keep_their_source() {
        let error = TiffError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "short read"));
        assert!(error.source().is_some());
        assert_eq!(error.to_string(), "I/O error: short read");
    }

    #[test]
    fn bounds_error_names_the_tag() {
        let error = TiffError::ValueOutOfBounds { tag: 273, offset: 4096, size: 12 };
        assert_eq!(error.to_string(), "Value of tag 273 at offset 4096 (12 bytes) lies outside the structure");
    }
}
