//! TIFF structure reader
//!
//! This module implements the TIFF/BigTIFF/RW2 reader that uses the
//! Strategy pattern to handle different byte orders. It works on any
//! seekable stream: a cursor over a whole file, or over an Exif block cut
//! out of a JPEG.

use log::{debug, warn};
use std::io::SeekFrom;

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::metadata::value::Value;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::format_utils;
use crate::utils::ifd_utils;
use crate::utils::tag_utils;

/// Chains longer than this are treated as corrupt
const MAX_IFDS: usize = 100;

/// Reader for TIFF-structured data
pub struct TiffReader {
    /// Current byte order handler
    pub(crate) byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Whether currently reading BigTIFF format
    pub(crate) is_big_tiff: bool,
}

impl Default for TiffReader {
    fn default() -> Self {
        TiffReader::new()
    }
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            is_big_tiff: false,
        }
    }

    /// Returns the byte order handler, with proper error handling for None case
    fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Reads the header and main IFD chain
    ///
    /// 1. Detect byte order (little/big endian)
    /// 2. Check for TIFF, RW2 or BigTIFF format
    /// 3. Read all IFDs of the main chain
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        debug!("Reader::read starting");
        reader.seek(SeekFrom::Start(0))?;

        let handler = format_utils::detect_byte_order(reader)?;
        let byte_order = handler.byte_order();
        let (is_big_tiff, version) = format_utils::detect_tiff_format(reader, handler.as_ref())?;
        let first_ifd_offset = ifd_utils::read_ifd_offset(reader, is_big_tiff, handler.as_ref())?;
        debug!("First IFD offset: {}", first_ifd_offset);

        self.byte_order_handler = Some(handler);
        self.is_big_tiff = is_big_tiff;

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        let mut tiff = TIFF::new(byte_order, version);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset)?;

        debug!("Read {} IFDs from TIFF structure", tiff.ifds.len());
        Ok(tiff)
    }

    /// Reads a chain of IFDs starting from the given offset
    ///
    /// A broken link ends the chain; the IFDs read so far are kept.
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64) -> TiffResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut ifd_offset = first_ifd_offset;
        let mut ifd_number = 0;
        let handler = self.handler()?;
        let file_size = validation::get_file_size(reader)?;

        while ifd_offset != 0 && ifd_number < MAX_IFDS {
            debug!("Reading IFD at offset: {}", ifd_offset);

            if ifd_offset >= file_size {
                warn!("IFD offset {} exceeds file size {}, stopping IFD chain",
                  ifd_offset, file_size);
                break;
            }

            let ifd = match self.read_ifd(reader, ifd_offset, ifd_number) {
                Ok(ifd) => ifd,
                Err(e) => {
                    warn!("Error reading IFD {}: {}", ifd_number, e);
                    break;
                }
            };

            let next_offset_position = ifd_utils::next_pointer_position(ifd_offset, &ifd, self.is_big_tiff);

            let next_ifd_offset = match reader.seek(SeekFrom::Start(next_offset_position))
                .map_err(TiffError::IoError)
                .and_then(|_| ifd_utils::read_ifd_offset(reader, self.is_big_tiff, handler))
            {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    ifds.push(ifd);
                    break;
                }
            };

            debug!("Next IFD offset: {}", next_ifd_offset);

            if next_ifd_offset != 0 && (next_ifd_offset >= file_size || next_ifd_offset < 8) {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                ifds.push(ifd);
                break;
            }

            if next_ifd_offset == ifd_offset {
                warn!("IFD {} points to itself, stopping IFD chain", ifd_number);
                ifds.push(ifd);
                break;
            }

            ifds.push(ifd);
            ifd_offset = next_ifd_offset;
            ifd_number += 1;
        }

        Ok(ifds)
    }

    /// Reads a single IFD at `offset`
    ///
    /// Used for the main chain as well as for IFDs reached through pointer
    /// tags such as SubIFDs or the Exif IFD.
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = self.read_ifd_entry_count(reader)?;
        debug!("IFD entry count: {}", entry_count);

        let file_size = validation::get_file_size(reader)?;
        let table_size = ifd_utils::ifd_table_size(entry_count as usize, self.is_big_tiff);
        if entry_count > u16::MAX as u64 || offset.saturating_add(table_size) > file_size.saturating_add(8) {
            return Err(TiffError::GenericError(format!(
                "IFD at offset {} declares {} entries, more than the structure can hold", offset, entry_count)));
        }

        let mut ifd = IFD::new(number, offset);

        for _ in 0..entry_count {
            let entry = self.read_ifd_entry(reader)?;
            debug!("Read IFD entry: tag={}, type={}, count={}, offset={}",
                   entry.tag, entry.field_type, entry.count, entry.value_offset);

            ifd.add_entry(entry);
        }

        Ok(ifd)
    }

    /// Reads the entry count from an IFD
    fn read_ifd_entry_count(&self, reader: &mut dyn SeekableReader) -> TiffResult<u64> {
        let handler = self.handler()?;
        if self.is_big_tiff {
            handler.read_u64(reader).map_err(TiffError::IoError)
        } else {
            handler.read_u16(reader)
                .map(|v| v as u64)
                .map_err(TiffError::IoError)
        }
    }

    /// Reads a single IFD entry
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<IFDEntry> {
        let handler = self.handler()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let value_offset = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        Ok(IFDEntry::new(tag, field_type, count, value_offset))
    }

    /// Reads the complete value of an entry
    ///
    /// Inline values are recovered by re-encoding the value field in the
    /// structure's byte order; out-of-line values are bounds checked and read.
    pub fn read_entry_value(&self, reader: &mut dyn SeekableReader, entry: &IFDEntry) -> TiffResult<Value> {
        if !tag_utils::is_known_field_type(entry.field_type) {
            return Err(TiffError::UnsupportedFieldType(entry.field_type));
        }

        let byte_order = self.handler()?.byte_order();

        let data = if entry.is_value_inline(self.is_big_tiff) {
            let size = entry.value_size().unwrap_or(0) as usize;
            let field = if self.is_big_tiff {
                byte_order.u64_bytes(entry.value_offset).to_vec()
            } else {
                byte_order.u32_bytes(entry.value_offset as u32).to_vec()
            };
            field[..size].to_vec()
        } else {
            let file_size = validation::get_file_size(reader)?;
            let range = validation::validate_value_range(entry, file_size)?;
            let mut buffer = vec![0u8; range.size as usize];
            reader.seek(SeekFrom::Start(range.offset))?;
            reader.read_exact(&mut buffer)?;
            buffer
        };

        Ok(Value::new(entry.field_type, entry.count, data, byte_order))
    }

    /// Reads a tag's value as a vector of u64
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        Ok(self.read_entry_value(reader, entry)?.to_u64_vec())
    }

    /// Returns whether the current structure is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }
}
