//! Core TIFF data structures

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::header;
use crate::tiff::ifd::IFD;
use std::fmt;

/// A parsed TIFF structure: its header facts and the main IFD chain
#[derive(Debug)]
pub struct TIFF {
    /// Image File Directories of the main chain
    pub ifds: Vec<IFD>,
    /// Whether this is a BigTIFF format
    pub is_big_tiff: bool,
    /// Byte order declared by the header
    pub byte_order: ByteOrder,
    /// Version word from the header (42, 43 or the RW2 variant)
    pub version: u16,
}

impl TIFF {
    /// Creates a new empty TIFF structure
    pub fn new(byte_order: ByteOrder, version: u16) -> Self {
        TIFF {
            ifds: Vec::new(),
            is_big_tiff: version == header::BIG_TIFF_VERSION,
            byte_order,
            version,
        }
    }

    /// Returns the main (first) IFD if available
    pub fn main_ifd(&self) -> Option<&IFD> {
        self.ifds.first()
    }

    /// Returns the number of IFDs in the main chain
    pub fn ifd_count(&self) -> usize {
        self.ifds.len()
    }

    /// True for Panasonic RW2 files, whose IFD0 uses a vendor tag set
    pub fn is_rw2(&self) -> bool {
        self.version == header::RW2_VERSION
    }
}

impl fmt::Display for TIFF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TIFF structure:")?;
        let format = match self.version {
            header::BIG_TIFF_VERSION => "BigTIFF",
            header::RW2_VERSION => "RW2",
            _ => "TIFF",
        };
        writeln!(f, "  Format: {}", format)?;
        writeln!(f, "  Byte order: {}", self.byte_order.name())?;
        writeln!(f, "  Number of IFDs: {}", self.ifds.len())?;

        if let Some(ifd) = self.main_ifd() {
            write!(f, "{}", ifd)?;
        }

        Ok(())
    }
}
