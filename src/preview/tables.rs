//! Preview location tables
//!
//! Which metadata keys locate a preview, for each extraction strategy, and
//! the fixed registry that turns a preview id into a strategy and its
//! parameters. Row order in `VARIANT_REGISTRY` is the public preview id and
//! must never change.

use crate::tiff::constants::{mime, tags};

/// Extraction strategy of a registry row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    OffsetReferenced,
    EmbeddedBlob,
    TiffReconstruct,
}

/// One registry row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantDescriptor {
    /// Source MIME type this row applies to; None matches every source
    pub mime_filter: Option<&'static str>,
    pub kind: VariantKind,
    /// Index into the parameter table of `kind`
    pub param: usize,
}

impl VariantDescriptor {
    const fn any(kind: VariantKind, param: usize) -> Self {
        VariantDescriptor { mime_filter: None, kind, param }
    }

    const fn only(mime_type: &'static str, kind: VariantKind, param: usize) -> Self {
        VariantDescriptor { mime_filter: Some(mime_type), kind, param }
    }

    /// True if this row applies to a source of `mime_type`
    pub fn accepts(&self, mime_type: &str) -> bool {
        match self.mime_filter {
            Some(filter) => filter == mime_type,
            None => true,
        }
    }
}

/// Offset and length keys of a preview stored at a file offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetParams {
    pub offset_key: &'static str,
    pub size_key: &'static str,
    /// Added to the offset when present
    pub base_offset_key: Option<&'static str>,
}

/// Key of an entry whose value (or data area) is the preview itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobParams {
    pub data_key: &'static str,
}

/// A metadata group describing a strip or tile image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffParams {
    pub group: &'static str,
    /// Key that must exist for the group to count as a preview
    pub gate_key: Option<&'static str>,
    /// Rendered value the gate key must have
    pub gate_value: Option<&'static str>,
}

const fn offset(offset_key: &'static str, size_key: &'static str) -> OffsetParams {
    OffsetParams { offset_key, size_key, base_offset_key: None }
}

const fn gated(group: &'static str, gate_key: &'static str) -> TiffParams {
    TiffParams { group, gate_key: Some(gate_key), gate_value: Some("1") }
}

pub static OFFSET_PARAMS: [OffsetParams; 8] = [
    offset("Exif.Image.JPEGInterchangeFormat", "Exif.Image.JPEGInterchangeFormatLength"),
    offset("Exif.SubImage1.JPEGInterchangeFormat", "Exif.SubImage1.JPEGInterchangeFormatLength"),
    offset("Exif.SubImage2.JPEGInterchangeFormat", "Exif.SubImage2.JPEGInterchangeFormatLength"),
    offset("Exif.SubImage3.JPEGInterchangeFormat", "Exif.SubImage3.JPEGInterchangeFormatLength"),
    offset("Exif.SubImage4.JPEGInterchangeFormat", "Exif.SubImage4.JPEGInterchangeFormatLength"),
    offset("Exif.Image2.JPEGInterchangeFormat", "Exif.Image2.JPEGInterchangeFormatLength"),
    offset("Exif.Image.StripOffsets", "Exif.Image.StripByteCounts"),
    OffsetParams {
        offset_key: "Exif.OlympusCs.PreviewImageStart",
        size_key: "Exif.OlympusCs.PreviewImageLength",
        base_offset_key: Some("Exif.MakerNote.Offset"),
    },
];

pub static BLOB_PARAMS: [BlobParams; 8] = [
    BlobParams { data_key: "Exif.Thumbnail.JPEGInterchangeFormat" },
    BlobParams { data_key: "Exif.NikonPreview.JPEGInterchangeFormat" },
    BlobParams { data_key: "Exif.Pentax.PreviewOffset" },
    BlobParams { data_key: "Exif.Minolta.ThumbnailOffset" },
    BlobParams { data_key: "Exif.Olympus.ThumbnailImage" },
    BlobParams { data_key: "Exif.Olympus2.ThumbnailImage" },
    BlobParams { data_key: "Exif.Minolta.Thumbnail" },
    BlobParams { data_key: "Exif.PanasonicRaw.PreviewImage" },
];

pub static TIFF_PARAMS: [TiffParams; 6] = [
    gated("Image", "Exif.Image.NewSubfileType"),
    gated("SubImage1", "Exif.SubImage1.NewSubfileType"),
    gated("SubImage2", "Exif.SubImage2.NewSubfileType"),
    gated("SubImage3", "Exif.SubImage3.NewSubfileType"),
    gated("SubImage4", "Exif.SubImage4.NewSubfileType"),
    TiffParams { group: "Thumbnail", gate_key: None, gate_value: None },
];

use VariantKind::{EmbeddedBlob, OffsetReferenced, TiffReconstruct};

/// All preview locations, indexed by preview id
pub static VARIANT_REGISTRY: [VariantDescriptor; 22] = [
    VariantDescriptor::any(EmbeddedBlob, 0),
    VariantDescriptor::any(EmbeddedBlob, 1),
    VariantDescriptor::any(EmbeddedBlob, 2),
    VariantDescriptor::any(EmbeddedBlob, 3),
    VariantDescriptor::any(EmbeddedBlob, 4),
    VariantDescriptor::any(EmbeddedBlob, 5),
    VariantDescriptor::any(EmbeddedBlob, 6),
    VariantDescriptor::only(mime::PANASONIC_RAW, EmbeddedBlob, 7),
    VariantDescriptor::any(TiffReconstruct, 0),
    VariantDescriptor::any(TiffReconstruct, 1),
    VariantDescriptor::any(TiffReconstruct, 2),
    VariantDescriptor::any(TiffReconstruct, 3),
    VariantDescriptor::any(TiffReconstruct, 4),
    VariantDescriptor::any(TiffReconstruct, 5),
    VariantDescriptor::any(OffsetReferenced, 0),
    VariantDescriptor::any(OffsetReferenced, 1),
    VariantDescriptor::any(OffsetReferenced, 2),
    VariantDescriptor::any(OffsetReferenced, 3),
    VariantDescriptor::any(OffsetReferenced, 4),
    VariantDescriptor::any(OffsetReferenced, 5),
    VariantDescriptor::only(mime::CANON_CR2, OffsetReferenced, 6),
    VariantDescriptor::any(OffsetReferenced, 7),
];

/// Structural tags carried over when a strip/tile group is re-encoded
///
/// NewSubfileType and Orientation are never copied.
pub static TIFF_ALLOWED_TAGS: [u16; 17] = [
    tags::IMAGE_WIDTH,
    tags::IMAGE_LENGTH,
    tags::BITS_PER_SAMPLE,
    tags::COMPRESSION,
    tags::PHOTOMETRIC_INTERPRETATION,
    tags::STRIP_OFFSETS,
    tags::SAMPLES_PER_PIXEL,
    tags::ROWS_PER_STRIP,
    tags::STRIP_BYTE_COUNTS,
    tags::X_RESOLUTION,
    tags::Y_RESOLUTION,
    tags::RESOLUTION_UNIT,
    tags::COLOR_MAP,
    tags::TILE_WIDTH,
    tags::TILE_LENGTH,
    tags::TILE_OFFSETS,
    tags::TILE_BYTE_COUNTS,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::key::MetadataKey;

    #[test]
    fn every_registry_row_has_parameters() {
        for row in VARIANT_REGISTRY.iter() {
            let len = match row.kind {
                VariantKind::OffsetReferenced => OFFSET_PARAMS.len(),
                VariantKind::EmbeddedBlob => BLOB_PARAMS.len(),
                VariantKind::TiffReconstruct => TIFF_PARAMS.len(),
            };
            assert!(row.param < len, "{:?} has no parameters", row);
        }
    }

    #[test]
    fn every_table_key_resolves() {
        let keys = OFFSET_PARAMS.iter()
            .flat_map(|p| [Some(p.offset_key), Some(p.size_key), p.base_offset_key])
            .chain(BLOB_PARAMS.iter().map(|p| Some(p.data_key)))
            .chain(TIFF_PARAMS.iter().map(|p| p.gate_key))
            .flatten();

        for key in keys {
            assert!(MetadataKey::parse(key).is_ok(), "{} does not resolve", key);
        }
    }

    #[test]
    fn mime_filters_match_exactly() {
        assert!(VARIANT_REGISTRY[0].accepts("anything/at-all"));
        assert!(VARIANT_REGISTRY[7].accepts(mime::PANASONIC_RAW));
        assert!(!VARIANT_REGISTRY[7].accepts(mime::JPEG));
        assert!(VARIANT_REGISTRY[20].accepts(mime::CANON_CR2));
        assert!(!VARIANT_REGISTRY[20].accepts(mime::TIFF));
    }
}
