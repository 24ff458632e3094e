//! TIFF validation utilities
//!
//! Validation functions that keep the reader from following offsets out of
//! a potentially malformed structure.

use log::{debug, error, warn};
use std::io::SeekFrom;

use crate::io::byte_range::ByteRange;
use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::constants::header;
use crate::tiff::ifd::IFDEntry;

/// Validates an IFD offset to ensure it's within reasonable bounds
pub fn validate_ifd_offset(offset: u64, file_size: u64) -> TiffResult<()> {
    if offset >= file_size || offset < header::CLASSIC_HEADER_SIZE {
        return Err(TiffError::GenericError(format!(
            "Invalid IFD offset: {} (file size: {})",
            offset, file_size
        )));
    }

    Ok(())
}

/// Validates that an out-of-line value lies inside the structure
///
/// # Returns
/// The byte range of the value
pub fn validate_value_range(entry: &IFDEntry, file_size: u64) -> TiffResult<ByteRange> {
    let size = entry.value_size().ok_or(TiffError::ValueOutOfBounds {
        tag: entry.tag,
        offset: entry.value_offset,
        size: u64::MAX,
    })?;

    let range = ByteRange::new(entry.value_offset, size);
    if !range.fits_within(file_size) {
        return Err(TiffError::ValueOutOfBounds { tag: entry.tag, offset: entry.value_offset, size });
    }

    Ok(range)
}

/// Gets the size of the underlying stream
///
/// # Returns
/// The size or u64::MAX if it couldn't be determined
pub fn get_file_size(reader: &mut dyn SeekableReader) -> TiffResult<u64> {
    let current_position = reader.stream_position()?;
    let file_size = match reader.seek(SeekFrom::End(0)) {
        Ok(size) => {
            reader.seek(SeekFrom::Start(current_position))?;
            size
        },
        Err(e) => {
            warn!("Could not determine file size: {}", e);
            reader.seek(SeekFrom::Start(current_position))?;
            u64::MAX
        }
    };

    Ok(file_size)
}

/// Validates the BigTIFF header
///
/// After the version number (43) BigTIFF stores the offset size, which must
/// be 8, and a reserved word, which must be 0.
pub fn validate_bigtiff_header(
    reader: &mut dyn SeekableReader,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<()> {
    let offset_size = byte_order_handler.read_u16(reader)?;
    let zeros = byte_order_handler.read_u16(reader)?;

    debug!("BigTIFF offset size: {}", offset_size);
    debug!("BigTIFF zeros: {}", zeros);

    if offset_size != header::BIGTIFF_OFFSET_SIZE || zeros != 0 {
        error!("Invalid BigTIFF header: offset_size={}, zeros={}", offset_size, zeros);
        return Err(TiffError::InvalidBigTIFFHeader);
    }

    Ok(())
}
