use std::io::Cursor;
use byteorder::{LittleEndian, WriteBytesExt};

/// Little-endian classic TIFF with one IFD at offset 8
///
/// Entries are (tag, type, count, value) and must have inline values.
pub fn classic_le_tiff(entries: &[(u16, u16, u32, u32)]) -> Cursor<Vec<u8>> {
    let mut buffer = b"II".to_vec();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();

    buffer.write_u16::<LittleEndian>(entries.len() as u16).unwrap();
    for &(tag, field_type, count, value) in entries {
        buffer.write_u16::<LittleEndian>(tag).unwrap();
        buffer.write_u16::<LittleEndian>(field_type).unwrap();
        buffer.write_u32::<LittleEndian>(count).unwrap();
        buffer.write_u32::<LittleEndian>(value).unwrap();
    }
    buffer.write_u32::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Creates an 800x600 classic TIFF with LONG dimensions
pub fn create_test_tiff_buffer() -> Cursor<Vec<u8>> {
    classic_le_tiff(&[(256, 4, 1, 800), (257, 4, 1, 600)])
}

/// Creates a test buffer with BigTIFF header and sample data
pub fn create_test_bigtiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // BigTIFF header (little-endian)
    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(43).unwrap();     // BigTIFF version
    buffer.write_u16::<LittleEndian>(8).unwrap();      // Offset size
    buffer.write_u16::<LittleEndian>(0).unwrap();      // Reserved
    buffer.write_u64::<LittleEndian>(16).unwrap();     // IFD offset

    // Sample IFD (at offset 16)
    buffer.write_u64::<LittleEndian>(2).unwrap();      // Entry count (2 entries)

    // Entry 1: ImageWidth (tag 256)
    buffer.write_u16::<LittleEndian>(256).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u64::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u64::<LittleEndian>(1024).unwrap();   // Value (width)

    // Entry 2: ImageLength/Height (tag 257)
    buffer.write_u16::<LittleEndian>(257).unwrap();    // Tag
    buffer.write_u16::<LittleEndian>(4).unwrap();      // Type (LONG)
    buffer.write_u64::<LittleEndian>(1).unwrap();      // Count
    buffer.write_u64::<LittleEndian>(768).unwrap();    // Value (height)

    // Next IFD offset (0 = no more IFDs)
    buffer.write_u64::<LittleEndian>(0).unwrap();

    Cursor::new(buffer)
}

/// Creates a big-endian TIFF whose single IFD holds an out-of-line SHORT[3]
///
/// The IFD's next-IFD link points back at itself.
pub fn create_self_linked_tiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = vec![0x4D, 0x4D, 0, 42, 0, 0, 0, 8];

    buffer.extend_from_slice(&[0, 1]);                 // Entry count
    buffer.extend_from_slice(&[0x01, 0x02]);           // Tag 258 (BitsPerSample)
    buffer.extend_from_slice(&[0, 3]);                 // Type (SHORT)
    buffer.extend_from_slice(&[0, 0, 0, 3]);           // Count
    buffer.extend_from_slice(&[0, 0, 0, 26]);          // Offset of the values
    buffer.extend_from_slice(&[0, 0, 0, 8]);           // Next IFD offset: this IFD

    buffer.extend_from_slice(&[0, 8, 0, 8, 0, 8]);     // Values at offset 26

    Cursor::new(buffer)
}
