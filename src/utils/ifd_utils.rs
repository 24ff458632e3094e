//! IFD layout utilities
//!
//! Sizes and pointer positions of IFD tables in classic and BigTIFF layouts.

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::IFD;

/// Reads an IFD pointer: the header's first-IFD offset or an IFD's next link
///
/// # Returns
/// The offset of the IFD, or 0 at the end of a chain
pub fn read_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<u64> {
    let offset = if is_big_tiff {
        byte_order_handler.read_u64(reader)?
    } else {
        byte_order_handler.read_u32(reader)? as u64
    };
    Ok(offset)
}

/// Size in bytes of one IFD pointer
pub fn pointer_size(is_big_tiff: bool) -> u64 {
    if is_big_tiff { 8 } else { 4 }
}

/// Size in bytes of an IFD table with `entry_count` entries
///
/// Covers the entry count field, the entries and the next-IFD pointer.
pub fn ifd_table_size(entry_count: usize, is_big_tiff: bool) -> u64 {
    let (count_field, entry_size) = if is_big_tiff { (8, 20) } else { (2, 12) };
    count_field + entry_size * entry_count as u64 + pointer_size(is_big_tiff)
}

/// Size in bytes of `ifd` as laid out in a file
pub fn calculate_ifd_size(ifd: &IFD, is_big_tiff: bool) -> u64 {
    ifd_table_size(ifd.entries.len(), is_big_tiff)
}

/// Position of the next-IFD pointer of an IFD at `ifd_offset`
pub fn next_pointer_position(ifd_offset: u64, ifd: &IFD, is_big_tiff: bool) -> u64 {
    ifd_offset + calculate_ifd_size(ifd, is_big_tiff) - pointer_size(is_big_tiff)
}
