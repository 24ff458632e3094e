//! TIFF writing strategy
//!
//! Lays out and writes a classic TIFF structure. Writing a valid TIFF
//! requires careful management of offsets, ordering and alignment so the
//! result can be read by other software.
//!
//! Layout: header, IFDs, out-of-line tag data, chunk offset arrays, then
//! each IFD's pixel data as one contiguous block.

use crate::io::byte_order::ByteOrder;
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::constants::{header, tags};
use crate::utils::{ifd_utils, write_utils};
use log::debug;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::{Seek, SeekFrom, Write};

/// Chunk offsets of one IFD, resolved against the final layout
struct ChunkLayout {
    tag: u16,
    offsets: Vec<u32>,
    /// Where the offsets array lives when it does not fit inline
    array_offset: Option<u64>,
}

/// Handles writing TIFF structures
pub struct WriterBuilder;

impl WriterBuilder {
    /// Write a complete classic TIFF structure
    ///
    /// `chunk_sizes` holds each IFD's strip or tile byte counts; chunk
    /// offsets are rewritten so the chunks lie back to back in that IFD's
    /// image data block.
    pub fn write(
        writer: &mut (impl Write + Seek),
        byte_order: ByteOrder,
        ifds: &[IFD],
        image_data: &BTreeMap<usize, Cow<'_, [u8]>>,
        external_data: &BTreeMap<(usize, u16), Vec<u8>>,
        chunk_sizes: &BTreeMap<usize, Vec<u64>>,
    ) -> TiffResult<()> {
        let sorted_ifds = Self::prepare_sorted_ifds(ifds);

        let mut current_offset = header::CLASSIC_HEADER_SIZE;

        let mut ifd_offsets = Vec::with_capacity(sorted_ifds.len());
        for ifd in &sorted_ifds {
            ifd_offsets.push(current_offset);
            current_offset = write_utils::align_to_4_bytes(current_offset + ifd_utils::calculate_ifd_size(ifd, false));
        }

        let mut tag_data_offsets = BTreeMap::new();
        for (key, data) in external_data {
            tag_data_offsets.insert(*key, current_offset);
            current_offset = write_utils::align_to_4_bytes(current_offset + data.len() as u64);
        }

        // Offsets arrays are sized now and filled once image positions are known
        let mut layouts: BTreeMap<usize, ChunkLayout> = BTreeMap::new();
        for (ifd_index, data) in image_data {
            let Some(ifd) = sorted_ifds.get(*ifd_index) else {
                continue;
            };
            let Some(tag) = [tags::STRIP_OFFSETS, tags::TILE_OFFSETS].into_iter().find(|t| ifd.has_tag(*t)) else {
                debug!("IFD #{} has image data but no offsets tag", ifd_index);
                continue;
            };

            let sizes = chunk_sizes.get(ifd_index).cloned()
                .unwrap_or_else(|| vec![data.len() as u64]);
            let array_offset = if sizes.len() > 1 {
                let offset = current_offset;
                current_offset = write_utils::align_to_4_bytes(current_offset + 4 * sizes.len() as u64);
                Some(offset)
            } else {
                None
            };

            layouts.insert(*ifd_index, ChunkLayout { tag, offsets: sizes.iter().map(|_| 0).collect(), array_offset });
        }

        let mut image_offsets = BTreeMap::new();
        for (ifd_index, data) in image_data {
            image_offsets.insert(*ifd_index, current_offset);

            if let Some(layout) = layouts.get_mut(ifd_index) {
                let sizes = chunk_sizes.get(ifd_index).cloned()
                    .unwrap_or_else(|| vec![data.len() as u64]);
                let mut position = current_offset;
                for (slot, size) in layout.offsets.iter_mut().zip(&sizes) {
                    *slot = u32::try_from(position).map_err(|_| Self::too_large(position))?;
                    position = position.checked_add(*size).ok_or_else(|| Self::too_large(u64::MAX))?;
                }
            }

            current_offset = write_utils::align_to_4_bytes(current_offset + data.len() as u64);
        }

        if current_offset > u32::MAX as u64 {
            return Err(Self::too_large(current_offset));
        }

        debug!("TIFF layout: {} IFDs, {} bytes", sorted_ifds.len(), current_offset);

        Self::write_header(writer, byte_order, ifd_offsets.first().copied().unwrap_or(0))?;

        for (i, ifd) in sorted_ifds.iter().enumerate() {
            let next_ifd_offset = ifd_offsets.get(i + 1).copied().unwrap_or(0);
            writer.seek(SeekFrom::Start(ifd_offsets[i]))?;
            Self::write_ifd(writer, byte_order, ifd, i, next_ifd_offset, &tag_data_offsets, layouts.get(&i))?;
        }

        for (key, data) in external_data {
            if let Some(offset) = tag_data_offsets.get(key) {
                writer.seek(SeekFrom::Start(*offset))?;
                writer.write_all(data)?;
                write_utils::write_padding(writer, data.len())?;
            }
        }

        for layout in layouts.values() {
            if let Some(offset) = layout.array_offset {
                writer.seek(SeekFrom::Start(offset))?;
                for value in &layout.offsets {
                    writer.write_all(&byte_order.u32_bytes(*value))?;
                }
            }
        }

        for (ifd_index, data) in image_data {
            if let Some(offset) = image_offsets.get(ifd_index) {
                writer.seek(SeekFrom::Start(*offset))?;
                writer.write_all(data)?;
                write_utils::write_padding(writer, data.len())?;
            }
        }

        writer.flush()?;
        Ok(())
    }

    fn too_large(offset: u64) -> TiffError {
        TiffError::GenericError(format!("Offset {} does not fit a classic TIFF", offset))
    }

    /// Prepare sorted IFDs with unique tags
    fn prepare_sorted_ifds(ifds: &[IFD]) -> Vec<IFD> {
        ifds.iter().map(|ifd| {
            let mut sorted_ifd = IFD::new(ifd.number, ifd.offset);
            for entry in write_utils::get_unique_sorted_entries(&ifd.entries) {
                sorted_ifd.add_entry(entry);
            }
            sorted_ifd
        }).collect()
    }

    /// Write the 8-byte classic header
    fn write_header(writer: &mut (impl Write + Seek), byte_order: ByteOrder, first_ifd_offset: u64) -> TiffResult<()> {
        writer.seek(SeekFrom::Start(0))?;
        writer.write_all(&byte_order.marker())?;
        writer.write_all(&byte_order.u16_bytes(header::TIFF_VERSION))?;
        writer.write_all(&byte_order.u32_bytes(first_ifd_offset as u32))?;
        Ok(())
    }

    /// Write an IFD (Image File Directory)
    fn write_ifd(
        writer: &mut (impl Write + Seek),
        byte_order: ByteOrder,
        ifd: &IFD,
        ifd_index: usize,
        next_offset: u64,
        tag_offsets: &BTreeMap<(usize, u16), u64>,
        layout: Option<&ChunkLayout>,
    ) -> TiffResult<()> {
        writer.write_all(&byte_order.u16_bytes(ifd.entries.len() as u16))?;

        for entry in &ifd.entries {
            let value_offset = Self::resolve_value_field(entry, ifd_index, tag_offsets, layout);

            writer.write_all(&byte_order.u16_bytes(entry.tag))?;
            writer.write_all(&byte_order.u16_bytes(entry.field_type))?;
            writer.write_all(&byte_order.u32_bytes(entry.count as u32))?;
            writer.write_all(&byte_order.u32_bytes(value_offset))?;
        }

        writer.write_all(&byte_order.u32_bytes(next_offset as u32))?;
        Ok(())
    }

    fn resolve_value_field(
        entry: &IFDEntry,
        ifd_index: usize,
        tag_offsets: &BTreeMap<(usize, u16), u64>,
        layout: Option<&ChunkLayout>,
    ) -> u32 {
        if let Some(layout) = layout.filter(|l| l.tag == entry.tag) {
            return match layout.array_offset {
                Some(offset) => offset as u32,
                None => layout.offsets.first().copied().unwrap_or(0),
            };
        }

        tag_offsets.get(&(ifd_index, entry.tag))
            .map(|offset| *offset as u32)
            .unwrap_or(entry.value_offset as u32)
    }
}
