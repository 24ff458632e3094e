//! TIFF format utilities
//!
//! Utilities for working with TIFF format specifics like
//! byte order detection and format detection.

use log::debug;
use crate::io::seekable::SeekableReader;
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::constants::header;
use crate::tiff::validation;

/// Detects and returns the byte order for a TIFF structure
pub fn detect_byte_order(reader: &mut dyn SeekableReader) -> TiffResult<Box<dyn ByteOrderHandler>> {
    let byte_order = ByteOrder::detect(reader)?;
    debug!("Detected byte order: {}", byte_order.name());

    Ok(byte_order.create_handler())
}

/// Detects whether a structure is classic TIFF, RW2 or BigTIFF from its version number
///
/// RW2 files use the classic layout with a vendor version word.
///
/// # Returns
/// A tuple with (is_big_tiff, version_number)
pub fn detect_tiff_format(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<(bool, u16)> {
    let version = byte_order_handler.read_u16(reader)?;
    debug!("TIFF version: {}", version);

    let is_big_tiff = match version {
        header::BIG_TIFF_VERSION => {
            debug!("Detected BigTIFF format");
            validation::validate_bigtiff_header(reader, byte_order_handler)?;
            true
        },
        header::TIFF_VERSION => {
            debug!("Detected standard TIFF format");
            false
        },
        header::RW2_VERSION => {
            debug!("Detected Panasonic RW2 format");
            false
        },
        _ => return Err(TiffError::UnsupportedVersion(version)),
    };

    Ok((is_big_tiff, version))
}

/// True if `data` starts with a TIFF-family header of either byte order
pub fn has_tiff_header(data: &[u8]) -> bool {
    if data.len() < 4 {
        return false;
    }

    let order = match [data[0], data[1]] {
        header::LITTLE_ENDIAN_MARKER => ByteOrder::LittleEndian,
        header::BIG_ENDIAN_MARKER => ByteOrder::BigEndian,
        _ => return false,
    };

    matches!(order.u16_from(&data[2..4]),
        header::TIFF_VERSION | header::BIG_TIFF_VERSION | header::RW2_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_tiff_family_headers() {
        assert!(has_tiff_header(b"II*\0\x08\0\0\0"));
        assert!(has_tiff_header(b"MM\0*\0\0\0\x08"));
        assert!(has_tiff_header(b"IIU\0\x08\0\0\0"));
        assert!(has_tiff_header(b"II+\0\x08\0\0\0"));
        assert!(!has_tiff_header(b"II\x01\0"));
        assert!(!has_tiff_header(b"\xff\xd8\xff\xe0"));
        assert!(!has_tiff_header(b"II"));
    }
}
