//! TIFF file format module
//!
//! This module provides structures and functions for reading TIFF, BigTIFF
//! and RW2 directory chains and for writing single-image classic TIFFs.

pub mod errors;
pub mod ifd;
pub(crate) mod types;
pub mod reader;
#[cfg(test)]
mod tests;
pub mod builder;
mod builders;
pub(crate) mod constants;
pub(crate) mod validation;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
pub use builder::{encode, encode_with_image_data, TiffBuilder};
