//! I/O utilities for source file handling
//!
//! This module provides byte order strategies, the seekable reader trait,
//! checked byte range helpers and the memory-mapped source image.

pub mod seekable;
pub mod byte_order;
pub mod byte_range;
pub mod source;

pub use byte_range::ByteRange;
pub use source::{SourceImage, SourceView};
