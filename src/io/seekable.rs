//! Seekable reader trait
//!
//! The TIFF reader works on anything that can both read and seek: an
//! in-memory cursor over a mapped file, or an Exif block cut out of a JPEG.

use std::io::{Read, Seek};

/// Trait for readers that can both read and seek
pub trait SeekableReader: Read + Seek + Send + Sync {}

// Blanket implementation for any type that implements the required traits
impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
