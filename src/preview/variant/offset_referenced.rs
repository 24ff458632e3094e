//! Previews stored at an offset recorded in the metadata

use log::debug;

use crate::io::byte_range::ByteRange;
use crate::io::source::SourceImage;
use crate::preview::errors::{PreviewError, PreviewResult};
use crate::preview::image::{PreviewId, PreviewProperties};
use crate::preview::tables::OffsetParams;
use crate::tiff::constants::mime;

/// A JPEG preview at `[offset, offset + size)` of the source file
#[derive(Debug)]
pub struct OffsetReferenced<'s> {
    id: PreviewId,
    source: &'s SourceImage,
    range: ByteRange,
    width: u32,
    height: u32,
}

impl<'s> OffsetReferenced<'s> {
    pub fn validate(id: PreviewId, source: &'s SourceImage, params: &OffsetParams) -> Option<Self> {
        let store = source.metadata();
        let offset = store.find_key(params.offset_key)?.to_u64();
        let size = store.find_key(params.size_key)?.to_u64();
        if offset == 0 || size == 0 {
            return None;
        }

        let base = params.base_offset_key
            .and_then(|key| store.find_key(key))
            .map(|entry| entry.to_u64())
            .unwrap_or(0);

        let range = ByteRange::new(store.file_offset(offset.checked_add(base)?)?, size);
        if !range.fits_within(source.size()) || u32::try_from(size).is_err() {
            debug!("Preview {} at offset {} ({} bytes) lies outside the {} byte source",
                   id, range.offset, size, source.size());
            return None;
        }

        Some(OffsetReferenced { id, source, range, width: 0, height: 0 })
    }

    pub fn id(&self) -> PreviewId {
        self.id
    }

    pub fn properties(&self) -> PreviewProperties {
        PreviewProperties {
            id: self.id,
            size: self.range.size as u32,
            width: self.width,
            height: self.height,
            mime_type: mime::JPEG.to_string(),
            extension: ".jpg".to_string(),
        }
    }

    pub fn get_data(&self) -> PreviewResult<Vec<u8>> {
        let view = self.source.map()?;
        self.range.slice(&view)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| PreviewError::GenericError(format!(
                "{} is shorter than when it was opened", self.source.path())))
    }

    pub fn probe_dimensions(&mut self) -> PreviewResult<bool> {
        let data = self.get_data()?;
        match super::probe_encoded(self.id, self.source, &data) {
            Some((width, height)) => {
                self.width = width;
                self.height = height;
                Ok(true)
            },
            None => Ok(false),
        }
    }
}
