//! Metadata loader
//!
//! Fills a `MetadataStore` from TIFF-structured bytes (TIFF, BigTIFF, CR2,
//! RW2) or from the Exif block of a JPEG. Directories are mapped to groups:
//!
//! - main chain: `Image`, `Thumbnail`, `Image2`, `Image3`, ...
//!   (IFD0 of an RW2 file is `PanasonicRaw`)
//! - SubIFDs of IFD0: `SubImage1`, `SubImage2`, ...
//! - Exif IFD: `Photo`
//!
//! Offsets inside a JPEG's Exif block count from the block's TIFF header,
//! so the store records where that header sits in the file.
//!
//! Loading never fails. A structure that cannot be parsed at all yields an
//! empty store; individual bad entries are skipped with a warning.

use std::io::Cursor;

use byteorder::{BigEndian, ByteOrder as _};
use log::{debug, warn};

use crate::io::byte_order::ByteOrder;
use crate::io::byte_range::ByteRange;
use crate::io::seekable::SeekableReader;
use crate::metadata::key::MetadataKey;
use crate::metadata::store::MetadataStore;
use crate::metadata::value::Value;
use crate::tiff::constants::{field_types, tags};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::utils::format_utils;

const EXIF_HEADER: &[u8] = b"Exif\0\0";

const JPEG_SOI: u8 = 0xD8;
const JPEG_EOI: u8 = 0xD9;
const JPEG_SOS: u8 = 0xDA;
const JPEG_APP1: u8 = 0xE1;

/// Loads whatever metadata `data` carries
pub fn load_metadata(data: &[u8]) -> MetadataStore {
    if data.len() >= 2 && data[0] == 0xFF && data[1] == JPEG_SOI {
        return match find_exif_block(data) {
            Some((origin, block)) => {
                let mut store = load_tiff_metadata(block);
                store.set_origin(origin as u64);
                store
            },
            None => {
                debug!("JPEG carries no Exif block");
                MetadataStore::new()
            }
        };
    }

    if format_utils::has_tiff_header(data) {
        return load_tiff_metadata(data);
    }

    debug!("No recognised metadata container");
    MetadataStore::new()
}

/// Locates the TIFF structure inside a JPEG APP1 Exif segment
///
/// Returns the file position of the TIFF header along with the block.
pub fn find_exif_block(data: &[u8]) -> Option<(usize, &[u8])> {
    let mut pos = 2usize;

    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            warn!("Lost JPEG marker sync at offset {}", pos);
            return None;
        }

        let marker = data[pos + 1];
        match marker {
            0xFF => {
                pos += 1;
                continue;
            },
            JPEG_SOI | 0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            },
            JPEG_SOS | JPEG_EOI => return None,
            _ => {}
        }

        let length = BigEndian::read_u16(&data[pos + 2..pos + 4]) as usize;
        if length < 2 {
            return None;
        }
        let segment = data.get(pos + 4..pos + 2 + length)?;

        if marker == JPEG_APP1 && segment.starts_with(EXIF_HEADER) {
            let origin = pos + 4 + EXIF_HEADER.len();
            debug!("Found Exif segment at offset {}, TIFF header at {}", pos, origin);
            return Some((origin, &segment[EXIF_HEADER.len()..]));
        }

        pos += 2 + length;
    }

    None
}

/// Loads all directories of a TIFF structure
pub fn load_tiff_metadata(data: &[u8]) -> MetadataStore {
    let mut store = MetadataStore::new();
    let mut cursor = Cursor::new(data);
    let mut reader = TiffReader::new();

    let tiff = match reader.read(&mut cursor) {
        Ok(tiff) => tiff,
        Err(e) => {
            warn!("Failed to read TIFF structure: {}", e);
            return store;
        }
    };

    debug!("{}", tiff);

    for ifd in &tiff.ifds {
        let group = chain_group_name(ifd.number, tiff.is_rw2());
        add_ifd_entries(&mut store, &reader, &mut cursor, ifd, &group);

        if ifd.number == 0 {
            load_sub_ifds(&mut store, &reader, &mut cursor, ifd);
            load_exif_ifd(&mut store, &reader, &mut cursor, ifd, tiff.byte_order);
        }
    }

    attach_thumbnail(&mut store, data);

    debug!("Loaded {} metadata entries", store.len());
    store
}

/// Group name of the n-th IFD in the main chain
fn chain_group_name(number: usize, is_rw2: bool) -> String {
    match number {
        0 if is_rw2 => "PanasonicRaw".to_string(),
        0 => "Image".to_string(),
        1 => "Thumbnail".to_string(),
        n => format!("Image{}", n),
    }
}

fn add_ifd_entries(
    store: &mut MetadataStore,
    reader: &TiffReader,
    stream: &mut dyn SeekableReader,
    ifd: &IFD,
    group: &str,
) {
    for entry in &ifd.entries {
        match reader.read_entry_value(stream, entry) {
            Ok(value) => store.add(MetadataKey::new(group, entry.tag), value),
            Err(e) => warn!("Skipping entry {} in group {}: {}", entry.tag, group, e),
        }
    }
}

fn load_sub_ifds(store: &mut MetadataStore, reader: &TiffReader, stream: &mut dyn SeekableReader, ifd: &IFD) {
    if !ifd.has_tag(tags::SUB_IFDS) {
        return;
    }

    let offsets = match reader.read_tag_values(stream, ifd, tags::SUB_IFDS) {
        Ok(offsets) => offsets,
        Err(e) => {
            warn!("Failed to read SubIFD offsets: {}", e);
            return;
        }
    };

    for (index, offset) in offsets.into_iter().enumerate() {
        let group = format!("SubImage{}", index + 1);
        match reader.read_ifd(stream, offset, index) {
            Ok(sub_ifd) => add_ifd_entries(store, reader, stream, &sub_ifd, &group),
            Err(e) => warn!("Failed to read {} at offset {}: {}", group, offset, e),
        }
    }
}

fn load_exif_ifd(
    store: &mut MetadataStore,
    reader: &TiffReader,
    stream: &mut dyn SeekableReader,
    ifd: &IFD,
    byte_order: ByteOrder,
) {
    let Some(offset) = ifd.get_tag_value(tags::EXIF_IFD) else {
        return;
    };

    let exif_ifd = match reader.read_ifd(stream, offset, 0) {
        Ok(exif_ifd) => exif_ifd,
        Err(e) => {
            warn!("Failed to read Exif IFD at offset {}: {}", offset, e);
            return;
        }
    };

    add_ifd_entries(store, reader, stream, &exif_ifd, "Photo");

    // Vendor previews are addressed relative to the maker note block, which
    // itself is recorded relative to the TIFF header.
    if let Some(entry) = exif_ifd.get_entry(tags::MAKER_NOTE) {
        if !entry.is_value_inline(reader.is_big_tiff()) {
            store.add(MetadataKey::new("MakerNote", 0xffff),
                      Value::from_u32s(field_types::LONG, &[entry.value_offset as u32], byte_order));
            let marker = String::from_utf8_lossy(&byte_order.marker()).into_owned();
            store.add(MetadataKey::new("MakerNote", 0xfffe), Value::ascii(&marker));
        }
    }
}

/// Attaches the IFD1 JPEG thumbnail bytes to its offset entry
fn attach_thumbnail(store: &mut MetadataStore, data: &[u8]) {
    let Ok(key) = MetadataKey::parse("Exif.Thumbnail.JPEGInterchangeFormat") else {
        return;
    };

    let (Some(offset), Some(length)) = (
        store.find(&key).map(|e| e.to_u64()),
        store.find_key("Exif.Thumbnail.JPEGInterchangeFormatLength").map(|e| e.to_u64()),
    ) else {
        return;
    };

    let range = ByteRange::new(offset, length);
    match range.slice(data) {
        Some(bytes) if length > 0 => {
            store.set_data_area(&key, bytes.to_vec());
        },
        _ => warn!("Thumbnail at offset {} ({} bytes) is out of bounds", offset, length),
    }
}
