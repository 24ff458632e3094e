//! TIFF construction
//!
//! Builds standalone classic TIFF byte streams from metadata values and
//! pixel data. Used to turn a raw strip/tile preview into a file any TIFF
//! decoder can open.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::Cursor;
use log::{debug, error};

use crate::io::byte_order::ByteOrder;
use crate::metadata::store::MetadataStore;
use crate::metadata::value::Value;
use crate::tiff::constants::{field_types, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::builders::writer::WriterBuilder;

/// Builder for in-memory TIFF structures
///
/// Image data can be borrowed, so a single mapped chunk is written straight
/// from the source without an intermediate copy.
pub struct TiffBuilder<'d> {
    byte_order: ByteOrder,
    pub ifds: Vec<IFD>,
    image_data: BTreeMap<usize, Cow<'d, [u8]>>,
    external_data: BTreeMap<(usize, u16), Vec<u8>>,
    chunk_sizes: BTreeMap<usize, Vec<u64>>,
}

impl<'d> TiffBuilder<'d> {
    /// Create a new TIFF builder writing in `byte_order`
    pub fn new(byte_order: ByteOrder) -> Self {
        debug!("Creating new TiffBuilder ({})", byte_order.name());
        TiffBuilder {
            byte_order,
            ifds: Vec::new(),
            image_data: BTreeMap::new(),
            external_data: BTreeMap::new(),
            chunk_sizes: BTreeMap::new(),
        }
    }

    /// Add an IFD to the TIFF
    pub fn add_ifd(&mut self, ifd: IFD) -> usize {
        let ifd_index = self.ifds.len();
        debug!("Adding IFD #{} to TiffBuilder", ifd_index);
        self.ifds.push(ifd);
        ifd_index
    }

    /// Add a tag value to an IFD
    ///
    /// Values are converted to the builder's byte order. Strip and tile
    /// offsets are always written as LONG, since they are rewritten to
    /// point into the new structure. Byte counts are written as LONG too;
    /// a count that does not fit is an error.
    pub fn add_value(&mut self, ifd_index: usize, tag: u16, value: &Value) -> TiffResult<()> {
        if ifd_index >= self.ifds.len() {
            error!("Invalid IFD index {}, only have {} IFDs", ifd_index, self.ifds.len());
            return Err(TiffError::GenericError(format!(
                "Invalid IFD index {}, only have {} IFDs", ifd_index, self.ifds.len())));
        }

        if is_chunk_size_tag(tag) {
            self.chunk_sizes.insert(ifd_index, value.to_u64_vec());
        }

        let value = if is_chunk_offset_tag(tag) && value.field_type() != field_types::LONG {
            let offsets: Vec<u32> = value.to_u64_vec().into_iter().map(|v| v as u32).collect();
            Value::from_u32s(field_types::LONG, &offsets, self.byte_order)
        } else if is_chunk_size_tag(tag) && value.field_type() != field_types::LONG {
            let counts = value.to_u64_vec().into_iter()
                .map(|v| u32::try_from(v).map_err(|_| TiffError::ValueOutOfBounds { tag, offset: v, size: 4 }))
                .collect::<TiffResult<Vec<u32>>>()?;
            Value::from_u32s(field_types::LONG, &counts, self.byte_order)
        } else {
            value.clone()
        };

        let bytes = value.encode(self.byte_order);
        let value_offset = if bytes.len() <= 4 {
            self.external_data.remove(&(ifd_index, tag));
            let mut field = [0u8; 4];
            field[..bytes.len()].copy_from_slice(&bytes);
            self.byte_order.u32_from(&field) as u64
        } else {
            self.external_data.insert((ifd_index, tag), bytes);
            0
        };

        self.ifds[ifd_index].add_entry(IFDEntry::new(tag, value.field_type(), value.count(), value_offset));
        Ok(())
    }

    /// Set the pixel data of an IFD
    ///
    /// The chunks must be contiguous and in the order of the IFD's byte counts.
    pub fn set_image_data(&mut self, ifd_index: usize, data: Cow<'d, [u8]>) {
        debug!("Setting image data for IFD #{}: {} bytes", ifd_index, data.len());

        if ifd_index >= self.ifds.len() {
            error!("Invalid IFD index {}, only have {} IFDs", ifd_index, self.ifds.len());
            return;
        }

        self.image_data.insert(ifd_index, data);
    }

    /// Encodes the TIFF structure
    pub fn to_bytes(&self) -> TiffResult<Vec<u8>> {
        // Offsets of IFDs with pixel data are regenerated by the writer
        let external_data: BTreeMap<(usize, u16), Vec<u8>> = self.external_data.iter()
            .filter(|((ifd_index, tag), _)| !(is_chunk_offset_tag(*tag) && self.image_data.contains_key(ifd_index)))
            .map(|(key, data)| (*key, data.clone()))
            .collect();

        let mut cursor = Cursor::new(Vec::new());
        WriterBuilder::write(
            &mut cursor,
            self.byte_order,
            &self.ifds,
            &self.image_data,
            &external_data,
            &self.chunk_sizes,
        )?;

        Ok(cursor.into_inner())
    }
}

fn is_chunk_offset_tag(tag: u16) -> bool {
    tag == tags::STRIP_OFFSETS || tag == tags::TILE_OFFSETS
}

fn is_chunk_size_tag(tag: u16) -> bool {
    tag == tags::STRIP_BYTE_COUNTS || tag == tags::TILE_BYTE_COUNTS
}

/// Encodes one metadata group as a single-image TIFF
///
/// The pixel data is taken from the data area of the group's strip or tile
/// offsets entry.
pub fn encode(store: &MetadataStore, group: &str, byte_order: ByteOrder) -> TiffResult<Vec<u8>> {
    let image_data = store.iter_group(group)
        .find(|entry| is_chunk_offset_tag(entry.tag()) && entry.size_data_area() > 0)
        .map(|entry| Cow::Borrowed(entry.data_area()));

    encode_with_image_data(store, group, byte_order, image_data)
}

/// Encodes one metadata group as a single-image TIFF with the given pixel data
pub fn encode_with_image_data<'d>(
    store: &MetadataStore,
    group: &str,
    byte_order: ByteOrder,
    image_data: Option<Cow<'d, [u8]>>,
) -> TiffResult<Vec<u8>> {
    let mut builder = TiffBuilder::new(byte_order);
    let ifd_index = builder.add_ifd(IFD::new(0, 0));

    for entry in store.iter_group(group) {
        builder.add_value(ifd_index, entry.tag(), entry.value())?;
    }

    if let Some(data) = image_data {
        builder.set_image_data(ifd_index, data);
    }

    builder.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiff::reader::TiffReader;

    fn short(v: u32) -> Value {
        Value::from_u32s(field_types::SHORT, &[v], ByteOrder::BigEndian)
    }

    #[test]
    fn inline_values_survive_byte_order_change() {
        let mut builder = TiffBuilder::new(ByteOrder::LittleEndian);
        let ifd = builder.add_ifd(IFD::new(0, 0));
        builder.add_value(ifd, tags::IMAGE_WIDTH, &short(300)).unwrap();
        let bytes = builder.to_bytes().unwrap();

        assert_eq!(&bytes[..4], b"II*\0");
        let mut reader = TiffReader::new();
        let tiff = reader.read(&mut Cursor::new(bytes.as_slice())).unwrap();
        let entry = tiff.ifds[0].get_entry(tags::IMAGE_WIDTH).unwrap();
        let value = reader.read_entry_value(&mut Cursor::new(bytes.as_slice()), entry).unwrap();
        assert_eq!(value.to_u64(0), Some(300));
    }

    #[test]
    fn chunk_offsets_point_at_contiguous_image_data() {
        let order = ByteOrder::LittleEndian;
        let mut builder = TiffBuilder::new(order);
        let ifd = builder.add_ifd(IFD::new(0, 0));
        builder.add_value(ifd, tags::STRIP_OFFSETS, &Value::from_u32s(field_types::SHORT, &[5000, 6000, 7000], order)).unwrap();
        builder.add_value(ifd, tags::STRIP_BYTE_COUNTS, &Value::from_u32s(field_types::LONG, &[2, 3, 1], order)).unwrap();
        builder.set_image_data(ifd, Cow::Owned(vec![1, 1, 2, 2, 2, 3]));
        let bytes = builder.to_bytes().unwrap();

        let mut reader = TiffReader::new();
        let mut cursor = Cursor::new(bytes.as_slice());
        let tiff = reader.read(&mut cursor).unwrap();
        let entry = tiff.ifds[0].get_entry(tags::STRIP_OFFSETS).unwrap();
        assert_eq!(entry.field_type, field_types::LONG);

        let offsets = reader.read_tag_values(&mut cursor, &tiff.ifds[0], tags::STRIP_OFFSETS).unwrap();
        assert_eq!(offsets.len(), 3);
        assert_eq!(offsets[1], offsets[0] + 2);
        assert_eq!(offsets[2], offsets[0] + 5);
        let start = offsets[0] as usize;
        assert_eq!(&bytes[start..start + 6], &[1, 1, 2, 2, 2, 3]);
    }

    #[test]
    fn long8_byte_counts_are_written_as_long() {
        let order = ByteOrder::LittleEndian;
        let counts: Vec<u8> = [3u64, 4].iter().flat_map(|c| c.to_le_bytes()).collect();
        let mut builder = TiffBuilder::new(order);
        let ifd = builder.add_ifd(IFD::new(0, 0));
        builder.add_value(ifd, tags::STRIP_OFFSETS, &Value::from_u32s(field_types::LONG, &[100, 200], order)).unwrap();
        builder.add_value(ifd, tags::STRIP_BYTE_COUNTS, &Value::new(field_types::LONG8, 2, counts, order)).unwrap();
        builder.set_image_data(ifd, Cow::Owned(vec![1, 1, 1, 2, 2, 2, 2]));
        let bytes = builder.to_bytes().unwrap();

        let mut reader = TiffReader::new();
        let mut cursor = Cursor::new(bytes.as_slice());
        let tiff = reader.read(&mut cursor).unwrap();
        let entry = tiff.ifds[0].get_entry(tags::STRIP_BYTE_COUNTS).unwrap();
        assert_eq!(entry.field_type, field_types::LONG);
        assert_eq!(reader.read_tag_values(&mut cursor, &tiff.ifds[0], tags::STRIP_BYTE_COUNTS).unwrap(), vec![3, 4]);
    }

    #[test]
    fn oversized_byte_counts_are_rejected() {
        let order = ByteOrder::LittleEndian;
        let mut builder = TiffBuilder::new(order);
        let ifd = builder.add_ifd(IFD::new(0, 0));
        let huge = Value::new(field_types::LONG8, 1, (u32::MAX as u64 + 1).to_le_bytes().to_vec(), order);
        assert!(matches!(
            builder.add_value(ifd, tags::TILE_BYTE_COUNTS, &huge),
            Err(TiffError::ValueOutOfBounds { tag: tags::TILE_BYTE_COUNTS, .. })
        ));
    }

    #[test]
    fn entries_are_sorted_and_unique() {
        let mut builder = TiffBuilder::new(ByteOrder::LittleEndian);
        let ifd = builder.add_ifd(IFD::new(0, 0));
        builder.add_value(ifd, tags::IMAGE_LENGTH, &short(2)).unwrap();
        builder.add_value(ifd, tags::IMAGE_WIDTH, &short(1)).unwrap();
        builder.add_value(ifd, tags::IMAGE_LENGTH, &short(3)).unwrap();
        let bytes = builder.to_bytes().unwrap();

        let tiff = TiffReader::new().read(&mut Cursor::new(bytes.as_slice())).unwrap();
        let tags_written: Vec<u16> = tiff.ifds[0].entries.iter().map(|e| e.tag).collect();
        assert_eq!(tags_written, vec![tags::IMAGE_WIDTH, tags::IMAGE_LENGTH]);
        assert_eq!(tiff.ifds[0].get_dimensions(), Some((1, 3)));
    }

    #[test]
    fn invalid_ifd_index_is_rejected() {
        let mut builder = TiffBuilder::new(ByteOrder::LittleEndian);
        assert!(builder.add_value(0, tags::IMAGE_WIDTH, &short(1)).is_err());
    }
}
