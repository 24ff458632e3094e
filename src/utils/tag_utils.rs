//! TIFF tag utilities
//!
//! Utilities for working with TIFF tags, field types and their values.

use crate::metadata::tag_names;
use crate::tiff::ifd::IFDEntry;
use crate::tiff::constants::{field_types, compression, photometric};

/// Determine how much space one component of a field type needs in bytes
pub fn get_field_type_size(field_type: u16) -> usize {
    match field_type {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT | field_types::IFD => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => 1,
    }
}

/// Size of the byte-swappable unit inside one component
///
/// Rationals are two independent 32-bit halves, so they swap in 4-byte units.
pub fn get_swap_unit_size(field_type: u16) -> usize {
    match field_type {
        field_types::RATIONAL | field_types::SRATIONAL => 4,
        other => get_field_type_size(other),
    }
}

/// True if the field type is a known TIFF type
pub fn is_known_field_type(field_type: u16) -> bool {
    matches!(field_type, field_types::BYTE..=field_types::IFD
        | field_types::LONG8 | field_types::SLONG8 | field_types::IFD8)
}

/// Determines if a tag's value is stored inline or at an offset
pub fn is_value_inline(entry: &IFDEntry, is_big_tiff: bool) -> bool {
    let limit = if is_big_tiff { 8 } else { 4 };
    match entry.count.checked_mul(get_field_type_size(entry.field_type) as u64) {
        Some(total_size) => total_size <= limit,
        None => false,
    }
}

/// Get the name of a standard TIFF tag, or "Unknown"
pub fn get_tag_name(tag: u16) -> &'static str {
    tag_names::standard_tag_name(tag).unwrap_or("Unknown")
}

/// Get the name of a TIFF field type
pub fn get_field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        field_types::IFD => "IFD",
        field_types::LONG8 => "LONG8",
        field_types::SLONG8 => "SLONG8",
        field_types::IFD8 => "IFD8",
        _ => "Unknown",
    }
}

/// Get the name of a compression method
pub fn get_compression_name(compression_code: u64) -> &'static str {
    match compression_code as u16 {
        compression::NONE => "None",
        compression::CCITT_RLE => "CCITT RLE",
        compression::CCITT_FAX3 => "CCITT Group 3 Fax",
        compression::CCITT_FAX4 => "CCITT Group 4 Fax",
        compression::LZW => "LZW",
        compression::JPEG_OLD => "Old JPEG",
        compression::JPEG => "JPEG",
        compression::DEFLATE => "Adobe Deflate",
        compression::PACKBITS => "PackBits",
        _ => "Unknown",
    }
}

/// Get the name of a photometric interpretation method
pub fn get_photometric_name(photometric_code: u64) -> &'static str {
    match photometric_code as u16 {
        photometric::WHITE_IS_ZERO => "WhiteIsZero",
        photometric::BLACK_IS_ZERO => "BlackIsZero",
        photometric::RGB => "RGB",
        photometric::PALETTE => "Palette",
        photometric::CMYK => "CMYK",
        photometric::YCBCR => "YCbCr",
        photometric::CFA => "CFA",
        photometric::LINEAR_RAW => "LinearRaw",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiff::constants::tags;

    #[test]
    fn rational_swaps_in_halves() {
        assert_eq!(get_field_type_size(field_types::RATIONAL), 8);
        assert_eq!(get_swap_unit_size(field_types::RATIONAL), 4);
        assert_eq!(get_swap_unit_size(field_types::DOUBLE), 8);
    }

    #[test]
    fn inline_threshold_depends_on_format() {
        let entry = IFDEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, 3, 0);
        assert!(!is_value_inline(&entry, false));
        assert!(is_value_inline(&entry, true));
    }

    #[test]
    fn unknown_codes_have_fallback_names() {
        assert_eq!(get_tag_name(tags::STRIP_OFFSETS), "StripOffsets");
        assert_eq!(get_tag_name(0x9999), "Unknown");
        assert_eq!(get_field_type_name(99), "Unknown");
        assert_eq!(get_compression_name(7), "JPEG");
    }
}
