//! Previews stored as raw strips or tiles of a metadata group
//!
//! The group's pixel chunks are gathered from the source and wrapped in a
//! new single-image TIFF together with the group's structural tags.

use std::borrow::Cow;

use log::{debug, warn};

use crate::io::byte_order::ByteOrder;
use crate::io::byte_range::{self, ByteRange};
use crate::io::source::SourceImage;
use crate::metadata::key::MetadataKey;
use crate::metadata::store::{MetadataEntry, MetadataStore};
use crate::preview::errors::{PreviewError, PreviewResult};
use crate::preview::image::{PreviewId, PreviewProperties};
use crate::preview::tables::{TiffParams, TIFF_ALLOWED_TAGS};
use crate::tiff::builder;
use crate::tiff::constants::{mime, tags};

/// Group name of the re-encoded image
const OUTPUT_GROUP: &str = "Image";

/// A strip or tile image rebuilt as a standalone TIFF
#[derive(Debug)]
pub struct TiffReconstruct<'s> {
    id: PreviewId,
    source: &'s SourceImage,
    group: &'static str,
    offsets_tag: u16,
    chunks: Vec<ByteRange>,
    size: u32,
    width: u32,
    height: u32,
}

impl<'s> TiffReconstruct<'s> {
    pub fn validate(id: PreviewId, source: &'s SourceImage, params: &TiffParams) -> Option<Self> {
        let store = source.metadata();
        let group = params.group;

        if let Some(gate_key) = params.gate_key {
            let gate = store.find_key(gate_key)?;
            if let Some(expected) = params.gate_value {
                if gate.value().to_string() != expected {
                    return None;
                }
            }
        }

        let find = move |tag: u16| store.find(&MetadataKey::new(group, tag));

        let (offsets_tag, offsets, counts) = match find(tags::STRIP_OFFSETS) {
            Some(offsets) => (tags::STRIP_OFFSETS, offsets, find(tags::STRIP_BYTE_COUNTS)?),
            None => (tags::TILE_OFFSETS, find(tags::TILE_OFFSETS)?, find(tags::TILE_BYTE_COUNTS)?),
        };

        if offsets.count() != counts.count() {
            debug!("Group {} has {} chunk offsets but {} byte counts", group, offsets.count(), counts.count());
            return None;
        }

        let positions = offsets.value().to_u64_vec().into_iter()
            .map(|offset| store.file_offset(offset))
            .collect::<Option<Vec<u64>>>()?;
        let chunks = byte_range::pair_ranges(&positions, &counts.value().to_u64_vec())?;
        let size = byte_range::total_size(&chunks)?;
        if size == 0 {
            return None;
        }

        let width = find(tags::IMAGE_WIDTH).map(MetadataEntry::to_u64).unwrap_or(0);
        let height = find(tags::IMAGE_LENGTH).map(MetadataEntry::to_u64).unwrap_or(0);
        if width == 0 || height == 0 {
            return None;
        }

        if offsets.size_data_area() == 0 && !byte_range::all_fit_within(&chunks, source.size()) {
            debug!("Group {} has chunks outside the {} byte source", group, source.size());
            return None;
        }

        Some(TiffReconstruct {
            id,
            source,
            group,
            offsets_tag,
            chunks,
            size: u32::try_from(size).ok()?,
            width: u32::try_from(width).ok()?,
            height: u32::try_from(height).ok()?,
        })
    }

    pub fn id(&self) -> PreviewId {
        self.id
    }

    pub fn properties(&self) -> PreviewProperties {
        PreviewProperties {
            id: self.id,
            size: self.size,
            width: self.width,
            height: self.height,
            mime_type: mime::TIFF.to_string(),
            extension: ".tif".to_string(),
        }
    }

    /// Copies the group's structural tags into a fresh store under `Image`
    ///
    /// A data area on the offsets entry travels with it.
    pub fn synthesize_metadata(&self) -> MetadataStore {
        let mut synthetic = MetadataStore::new();

        for entry in self.source.metadata().iter_group(self.group) {
            if !TIFF_ALLOWED_TAGS.contains(&entry.tag()) {
                continue;
            }

            let key = MetadataKey::new(OUTPUT_GROUP, entry.tag());
            synthetic.add(key.clone(), entry.value().clone());
            if entry.size_data_area() > 0 {
                synthetic.set_data_area(&key, entry.data_area().to_vec());
            }
        }

        synthetic
    }

    pub fn get_data(&self) -> PreviewResult<Vec<u8>> {
        let synthetic = self.synthesize_metadata();

        let has_side_channel = synthetic.find(&MetadataKey::new(OUTPUT_GROUP, self.offsets_tag))
            .map_or(false, |entry| entry.size_data_area() > 0);
        if has_side_channel {
            debug!("Preview {}: pixel data taken from metadata", self.id);
            return Ok(builder::encode(&synthetic, OUTPUT_GROUP, ByteOrder::LittleEndian)?);
        }

        let view = self.source.map()?;
        let pixels = match self.chunks.as_slice() {
            [single] => single.slice(&view).map(Cow::Borrowed),
            chunks => byte_range::gather(&view, chunks).map(Cow::Owned),
        };

        let Some(pixels) = pixels else {
            warn!("Preview {}: pixel data of {} is unreadable", self.id, self.group);
            return Err(PreviewError::GenericError(format!(
                "Pixel data of group {} lies outside {}", self.group, self.source.path())));
        };

        debug!("Preview {}: re-encoding {} bytes from {} chunks", self.id, pixels.len(), self.chunks.len());
        Ok(builder::encode_with_image_data(&synthetic, OUTPUT_GROUP, ByteOrder::LittleEndian, Some(pixels))?)
    }
}
