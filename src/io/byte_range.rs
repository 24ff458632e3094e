//! Byte range arithmetic and bounds checks
//!
//! Every offset/length pair read from metadata is untrusted. These helpers
//! keep the arithmetic checked so a hostile offset can never wrap around and
//! pass a bounds test.

use log::{trace, warn};

/// A half-open `[offset, offset + size)` range inside a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub offset: u64,
    pub size: u64,
}

impl ByteRange {
    pub fn new(offset: u64, size: u64) -> Self {
        ByteRange { offset, size }
    }

    /// End of the range, or None if `offset + size` overflows
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.size)
    }

    /// True if the whole range lies inside a buffer of `len` bytes
    pub fn fits_within(&self, len: u64) -> bool {
        match self.end() {
            Some(end) => end <= len,
            None => false,
        }
    }

    /// Borrows this range out of `data`
    pub fn slice<'d>(&self, data: &'d [u8]) -> Option<&'d [u8]> {
        let start = usize::try_from(self.offset).ok()?;
        let end = usize::try_from(self.end()?).ok()?;
        data.get(start..end)
    }
}

/// Builds ranges from parallel offset and size lists
///
/// Returns None when the lists differ in length.
pub fn pair_ranges(offsets: &[u64], sizes: &[u64]) -> Option<Vec<ByteRange>> {
    if offsets.len() != sizes.len() {
        trace!("Offset/size count mismatch: {} vs {}", offsets.len(), sizes.len());
        return None;
    }

    Some(offsets.iter()
        .zip(sizes)
        .map(|(&offset, &size)| ByteRange::new(offset, size))
        .collect())
}

/// Sum of all range sizes, or None on overflow
pub fn total_size(ranges: &[ByteRange]) -> Option<u64> {
    ranges.iter().try_fold(0u64, |acc, range| acc.checked_add(range.size))
}

/// True if every range lies inside a buffer of `len` bytes
pub fn all_fit_within(ranges: &[ByteRange], len: u64) -> bool {
    ranges.iter().all(|range| range.fits_within(len))
}

/// Copies each range of `data` into one contiguous buffer, in order
///
/// A range that falls outside `data` leaves its slot zero-filled so that
/// later chunks still land at the position their byte counts imply.
pub fn gather(data: &[u8], ranges: &[ByteRange]) -> Option<Vec<u8>> {
    let total = usize::try_from(total_size(ranges)?).ok()?;
    let mut buffer = vec![0u8; total];
    let mut position = 0usize;

    for (index, range) in ranges.iter().enumerate() {
        let size = usize::try_from(range.size).ok()?;
        match range.slice(data) {
            Some(chunk) => buffer[position..position + size].copy_from_slice(chunk),
            None => warn!("Chunk {} at offset {} ({} bytes) is out of bounds, leaving it empty",
                          index, range.offset, range.size),
        }
        position += size;
    }

    Some(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_fits_exactly_at_end() {
        assert!(ByteRange::new(6, 4).fits_within(10));
        assert!(!ByteRange::new(7, 4).fits_within(10));
    }

    #[test]
    fn overflowing_range_never_fits() {
        let range = ByteRange::new(u64::MAX - 1, 8);
        assert_eq!(range.end(), None);
        assert!(!range.fits_within(u64::MAX));
    }

    #[test]
    fn slice_borrows_expected_bytes() {
        let data: Vec<u8> = (0..16).collect();
        assert_eq!(ByteRange::new(4, 3).slice(&data), Some(&[4u8, 5, 6][..]));
        assert_eq!(ByteRange::new(15, 2).slice(&data), None);
    }

    #[test]
    fn pair_ranges_rejects_mismatched_lists() {
        assert!(pair_ranges(&[1, 2], &[3]).is_none());
        let ranges = pair_ranges(&[1, 2], &[3, 4]).unwrap();
        assert_eq!(ranges[1], ByteRange::new(2, 4));
    }

    #[test]
    fn total_size_detects_overflow() {
        let ranges = [ByteRange::new(0, u64::MAX), ByteRange::new(0, 1)];
        assert_eq!(total_size(&ranges), None);
        assert_eq!(total_size(&[ByteRange::new(0, 10), ByteRange::new(5, 20)]), Some(30));
    }

    #[test]
    fn gather_concatenates_in_chunk_order() {
        let data: Vec<u8> = (0..32).collect();
        let ranges = [ByteRange::new(20, 2), ByteRange::new(0, 3)];
        assert_eq!(gather(&data, &ranges).unwrap(), vec![20, 21, 0, 1, 2]);
    }

    #[test]
    fn gather_zero_fills_out_of_bounds_chunks() {
        let data: Vec<u8> = (1..=8).collect();
        let ranges = [ByteRange::new(100, 2), ByteRange::new(0, 2)];
        assert_eq!(gather(&data, &ranges).unwrap(), vec![0, 0, 1, 2]);
    }
}
