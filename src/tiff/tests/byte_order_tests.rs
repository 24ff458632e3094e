//! Tests for byte order detection and the in-buffer codecs

extern crate std;

use std::io::Cursor;
use byteorder::{BigEndian, WriteBytesExt};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};

#[test]
fn test_detects_both_markers() {
    for (marker, expected) in [(b"II", ByteOrder::LittleEndian), (b"MM", ByteOrder::BigEndian)] {
        let mut cursor = Cursor::new(marker.to_vec());
        std::assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), expected);
        std::assert_eq!(&expected.marker(), marker);
    }
}

#[test]
fn test_rejects_mixed_marker() {
    let mut cursor = Cursor::new(b"IM*\0".to_vec());
    std::assert!(ByteOrder::detect(&mut cursor).is_err());
}

#[test]
fn test_handler_matches_detected_order() {
    let mut buffer = b"MM".to_vec();
    buffer.write_u16::<BigEndian>(42).unwrap();
    buffer.write_u32::<BigEndian>(0x0000_0108).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = ByteOrder::detect(&mut cursor).unwrap().create_handler();
    std::assert_eq!(handler.byte_order(), ByteOrder::BigEndian);
    std::assert_eq!(handler.read_u16(&mut cursor).unwrap(), 42);
    std::assert_eq!(handler.read_u32(&mut cursor).unwrap(), 264);
}

#[test]
fn test_buffer_codecs_round_trip_per_order() {
    let le = ByteOrder::LittleEndian;
    let be = ByteOrder::BigEndian;

    std::assert_eq!(le.u32_bytes(0x0102_0304), [4, 3, 2, 1]);
    std::assert_eq!(be.u32_bytes(0x0102_0304), [1, 2, 3, 4]);
    std::assert_eq!(le.u16_from(&[0x34, 0x12, 0xFF]), 0x1234);
    std::assert_eq!(be.u16_from(&be.u16_bytes(513)), 513);
    std::assert_eq!(le.u64_from(&le.u64_bytes(0x1234_5678_90AB_CDEF)), 0x1234_5678_90AB_CDEF);
}
