//! TIFF builder strategy modules
//!
//! The writer lays out header, directories, out-of-line values and pixel
//! data for the TiffBuilder.

pub mod writer;
