//! Previews stored inside a metadata entry

use crate::io::source::SourceImage;
use crate::preview::errors::PreviewResult;
use crate::preview::image::{PreviewId, PreviewProperties};
use crate::preview::tables::BlobParams;
use crate::tiff::constants::{field_types, mime};
use crate::metadata::store::MetadataEntry;

/// A JPEG preview held by a metadata entry's data area or inline value
#[derive(Debug)]
pub struct EmbeddedBlob<'s> {
    id: PreviewId,
    source: &'s SourceImage,
    entry: &'s MetadataEntry,
    size: u32,
    width: u32,
    height: u32,
}

impl<'s> EmbeddedBlob<'s> {
    pub fn validate(id: PreviewId, source: &'s SourceImage, params: &BlobParams) -> Option<Self> {
        let entry = source.metadata().find_key(params.data_key)?;

        let size = if entry.size_data_area() > 0 {
            entry.size_data_area()
        } else if entry.field_type() == field_types::UNDEFINED && entry.size() > 0 {
            entry.size()
        } else {
            return None;
        };

        Some(EmbeddedBlob { id, source, entry, size: u32::try_from(size).ok()?, width: 0, height: 0 })
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
            mime_type: mime::JPEG.to_string(),
            extension: ".jpg".to_string(),
        }
    }

    /// The data area if there is one, otherwise the inline value
    ///
    /// Inline previews always get 0xFF as their first byte; some cameras
    /// store the JPEG start marker with a corrupted first byte.
    pub fn get_data(&self) -> PreviewResult<Vec<u8>> {
        if self.entry.size_data_area() > 0 {
            return Ok(self.entry.data_area().to_vec());
        }

        let mut data = self.entry.value().raw_bytes().to_vec();
        if let Some(first) = data.first_mut() {
            *first = 0xFF;
        }
        Ok(data)
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
