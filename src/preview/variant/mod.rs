//! Extraction strategies
//!
//! Each registry row instantiates one `ExtractionVariant`. Instantiation
//! validates the row's metadata against the source; a variant that exists
//! is known to describe plausible preview bytes. Probing then confirms that
//! encoded previews actually decode.

mod offset_referenced;
mod embedded_blob;
mod tiff_reconstruct;

pub use offset_referenced::OffsetReferenced;
pub use embedded_blob::EmbeddedBlob;
pub use tiff_reconstruct::TiffReconstruct;

use log::{trace, warn};

use crate::io::source::SourceImage;
use crate::preview::errors::PreviewResult;
use crate::preview::image::{PreviewId, PreviewProperties};
use crate::preview::sniffer;
use crate::preview::tables::{self, VariantKind};

/// A validated preview location
#[derive(Debug)]
pub enum ExtractionVariant<'s> {
    OffsetReferenced(OffsetReferenced<'s>),
    EmbeddedBlob(EmbeddedBlob<'s>),
    TiffReconstruct(TiffReconstruct<'s>),
}

impl<'s> ExtractionVariant<'s> {
    /// Instantiates registry row `id` for `source`
    ///
    /// Returns None for ids outside the registry, rows whose MIME filter
    /// rejects the source, and rows whose metadata does not validate.
    pub fn create(id: PreviewId, source: &'s SourceImage) -> Option<Self> {
        let row = tables::VARIANT_REGISTRY.get(id)?;
        if !row.accepts(source.mime_type()) {
            trace!("Preview {} does not apply to {}", id, source.mime_type());
            return None;
        }

        let variant = match row.kind {
            VariantKind::OffsetReferenced => OffsetReferenced::validate(id, source, tables::OFFSET_PARAMS.get(row.param)?)
                .map(ExtractionVariant::OffsetReferenced),
            VariantKind::EmbeddedBlob => EmbeddedBlob::validate(id, source, tables::BLOB_PARAMS.get(row.param)?)
                .map(ExtractionVariant::EmbeddedBlob),
            VariantKind::TiffReconstruct => TiffReconstruct::validate(id, source, tables::TIFF_PARAMS.get(row.param)?)
                .map(ExtractionVariant::TiffReconstruct),
        };

        if variant.is_none() {
            trace!("Preview {} is not present", id);
        }
        variant
    }

    pub fn id(&self) -> PreviewId {
        match self {
            ExtractionVariant::OffsetReferenced(v) => v.id(),
            ExtractionVariant::EmbeddedBlob(v) => v.id(),
            ExtractionVariant::TiffReconstruct(v) => v.id(),
        }
    }

    /// Current properties of this preview
    pub fn properties(&self) -> PreviewProperties {
        match self {
            ExtractionVariant::OffsetReferenced(v) => v.properties(),
            ExtractionVariant::EmbeddedBlob(v) => v.properties(),
            ExtractionVariant::TiffReconstruct(v) => v.properties(),
        }
    }

    /// Produces the preview bytes
    pub fn get_data(&self) -> PreviewResult<Vec<u8>> {
        match self {
            ExtractionVariant::OffsetReferenced(v) => v.get_data(),
            ExtractionVariant::EmbeddedBlob(v) => v.get_data(),
            ExtractionVariant::TiffReconstruct(v) => v.get_data(),
        }
    }

    /// Fills in width and height
    ///
    /// # Returns
    /// false if the preview turned out to be unusable; errors are reserved
    /// for failures to read the source
    pub fn probe_dimensions(&mut self) -> PreviewResult<bool> {
        match self {
            ExtractionVariant::OffsetReferenced(v) => v.probe_dimensions(),
            ExtractionVariant::EmbeddedBlob(v) => v.probe_dimensions(),
            ExtractionVariant::TiffReconstruct(_) => Ok(true),
        }
    }
}

/// Probes encoded preview bytes, warning when they do not decode
fn probe_encoded(id: PreviewId, source: &SourceImage, data: &[u8]) -> Option<(u32, u32)> {
    let dimensions = sniffer::probe_dimensions(data);
    if dimensions.is_none() {
        warn!("Preview {} in {} is not a readable image, skipping it", id, source.path());
    }
    dimensions
}
