//! Preview enumeration and extraction

use log::{debug, info};

use crate::io::source::SourceImage;
use crate::preview::errors::PreviewResult;
use crate::preview::image::{PreviewId, PreviewImage, PreviewProperties};
use crate::preview::tables::VARIANT_REGISTRY;
use crate::preview::variant::ExtractionVariant;

/// Finds and extracts the previews of one source image
pub struct PreviewManager<'s> {
    source: &'s SourceImage,
}

impl<'s> PreviewManager<'s> {
    pub fn new(source: &'s SourceImage) -> Self {
        PreviewManager { source }
    }

    /// Lists the available previews, smallest first
    ///
    /// Previews of equal area keep registry order.
    pub fn enumerate(&self) -> PreviewResult<Vec<PreviewProperties>> {
        let mut previews = Vec::new();

        for id in 0..VARIANT_REGISTRY.len() {
            if let Some(variant) = self.instantiate(id)? {
                previews.push(variant.properties());
            }
        }

        previews.sort_by_key(PreviewProperties::area);
        info!("Found {} previews in {}", previews.len(), self.source.path());
        Ok(previews)
    }

    /// Extracts preview `id`
    ///
    /// An id that does not name an available preview yields an empty image.
    pub fn fetch(&self, id: PreviewId) -> PreviewResult<PreviewImage> {
        match self.instantiate(id)? {
            Some(variant) => {
                let data = variant.get_data()?;
                debug!("Extracted preview {}: {} bytes", id, data.len());
                Ok(PreviewImage::new(variant.properties(), data))
            },
            None => Ok(PreviewImage::empty(id)),
        }
    }

    /// Extracts the preview described by `properties`
    pub fn preview_image(&self, properties: &PreviewProperties) -> PreviewResult<PreviewImage> {
        self.fetch(properties.id)
    }

    /// Creates and probes one variant
    fn instantiate(&self, id: PreviewId) -> PreviewResult<Option<ExtractionVariant<'s>>> {
        let Some(mut variant) = ExtractionVariant::create(id, self.source) else {
            return Ok(None);
        };

        if !variant.probe_dimensions()? {
            return Ok(None);
        }

        Ok(Some(variant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use image::{ImageFormat, RgbImage};
    use crate::io::byte_order::ByteOrder;
    use crate::metadata::store::MetadataStore;
    use crate::metadata::value::Value;
    use crate::tiff::constants::{field_types, mime};

    fn long(value: u32) -> Value {
        Value::from_u32s(field_types::LONG, &[value], ByteOrder::LittleEndian)
    }

    /// A CR2-style IFD0 whose single strip is a JPEG at offset 16
    fn strip_jpeg_source(mime_type: &str) -> (SourceImage, Vec<u8>) {
        let mut preview = Cursor::new(Vec::new());
        RgbImage::new(40, 30).write_to(&mut preview, ImageFormat::Jpeg).unwrap();
        let preview = preview.into_inner();

        let mut store = MetadataStore::new();
        store.add_by_name("Exif.Image.StripOffsets", long(16)).unwrap();
        store.add_by_name("Exif.Image.StripByteCounts", long(preview.len() as u32)).unwrap();

        let mut data = vec![0u8; 16];
        data.extend_from_slice(&preview);
        (SourceImage::with_metadata(data, mime_type, store), preview)
    }

    #[test]
    fn cr2_strip_preview_is_listed() {
        let (source, preview) = strip_jpeg_source(mime::CANON_CR2);
        let manager = PreviewManager::new(&source);

        let previews = manager.enumerate().unwrap();
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].id, 20);
        assert_eq!((previews[0].width, previews[0].height), (40, 30));
        assert_eq!(previews[0].mime_type, mime::JPEG);

        assert_eq!(manager.fetch(20).unwrap().data(), &preview[..]);
    }

    #[test]
    fn strip_preview_row_is_cr2_only() {
        let (source, _) = strip_jpeg_source(mime::TIFF);
        let manager = PreviewManager::new(&source);

        assert!(manager.enumerate().unwrap().is_empty());
        assert!(manager.fetch(20).unwrap().is_empty());
    }

    #[test]
    fn fetched_properties_match_enumeration() {
        let mut store = MetadataStore::new();
        store.add_by_name("Exif.SubImage1.NewSubfileType", long(1)).unwrap();
        store.add_by_name("Exif.SubImage1.ImageWidth", long(4)).unwrap();
        store.add_by_name("Exif.SubImage1.ImageLength", long(2)).unwrap();
        store.add_by_name("Exif.SubImage1.StripOffsets", long(8)).unwrap();
        store.add_by_name("Exif.SubImage1.StripByteCounts", long(8)).unwrap();
        let source = SourceImage::with_metadata(vec![7; 32], mime::TIFF, store);
        let manager = PreviewManager::new(&source);

        let listed = manager.enumerate().unwrap();
        assert_eq!(listed.len(), 1);
        let image = manager.preview_image(&listed[0]).unwrap();

        assert_eq!(image.properties(), &listed[0]);
        assert_eq!(image.properties().size, 8);
        assert_eq!(image.size() as usize, image.data().len());
        assert!(image.size() > 8);
    }
}
