//! Integration tests for preview enumeration and extraction

use std::borrow::Cow;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbImage};

use previewkit::{MetadataStore, PreviewError, PreviewKit, PreviewManager, SourceImage};
use previewkit::metadata::{MetadataKey, Value};
use previewkit::tiff::{ByteOrder, TiffBuilder, TiffReader, IFD};

const SHORT: u16 = 3;
const LONG: u16 = 4;
const UNDEFINED: u16 = 7;

/// Pixels of the 8x4 grayscale main image, two strips of two rows
const PIXELS: [u8; 32] = [
    0, 10, 20, 30, 40, 50, 60, 70,
    1, 11, 21, 31, 41, 51, 61, 71,
    2, 12, 22, 32, 42, 52, 62, 72,
    3, 13, 23, 33, 43, 53, 63, 73,
];

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| image::Rgb([(x * 16) as u8, (y * 16) as u8, 128]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
    out.into_inner()
}

fn long(values: &[u32]) -> Value {
    Value::from_u32s(LONG, values, ByteOrder::LittleEndian)
}

fn short(value: u32) -> Value {
    Value::from_u32s(SHORT, &[value], ByteOrder::LittleEndian)
}

/// Builds a TIFF whose IFD0 is a reduced-resolution strip image and also
/// points at a JPEG appended after the structure
fn tiff_with_jpeg(jpeg: &[u8], declared_jpeg_length: u32) -> Vec<u8> {
    let build = |jpeg_offset: u32| {
        let mut builder = TiffBuilder::new(ByteOrder::LittleEndian);
        let ifd = builder.add_ifd(IFD::new(0, 0));
        builder.add_value(ifd, 254, &long(&[1])).unwrap();
        builder.add_value(ifd, 256, &short(8)).unwrap();
        builder.add_value(ifd, 257, &short(4)).unwrap();
        builder.add_value(ifd, 258, &short(8)).unwrap();
        builder.add_value(ifd, 259, &short(1)).unwrap();
        builder.add_value(ifd, 262, &short(1)).unwrap();
        builder.add_value(ifd, 273, &long(&[0, 0])).unwrap();
        builder.add_value(ifd, 277, &short(1)).unwrap();
        builder.add_value(ifd, 278, &short(2)).unwrap();
        builder.add_value(ifd, 279, &long(&[16, 16])).unwrap();
        builder.add_value(ifd, 513, &long(&[jpeg_offset])).unwrap();
        builder.add_value(ifd, 514, &long(&[declared_jpeg_length])).unwrap();
        builder.set_image_data(ifd, Cow::Borrowed(&PIXELS[..]));
        builder.to_bytes().unwrap()
    };

    // The layout does not depend on the inline offset value
    let structure_len = build(0).len() as u32;
    let mut file = build(structure_len);
    file.extend_from_slice(jpeg);
    file
}

fn le_ifd(entries: &[(u16, u16, u32)], next: u32) -> Vec<u8> {
    let mut out = (entries.len() as u16).to_le_bytes().to_vec();
    for &(tag, field_type, value) in entries {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&field_type.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&value.to_le_bytes());
    }
    out.extend_from_slice(&next.to_le_bytes());
    out
}

/// Builds a JPEG whose Exif IFD1 is an uncompressed 2x2 grayscale strip
///
/// The strip sits at offset 140 of the Exif TIFF block.
fn jpeg_with_strip_thumbnail(pixels: [u8; 4]) -> Vec<u8> {
    let mut exif = b"II*\0".to_vec();
    exif.extend_from_slice(&8u32.to_le_bytes());
    exif.extend(le_ifd(&[(256, LONG, 64)], 26));
    exif.extend(le_ifd(&[
        (256, SHORT, 2),
        (257, SHORT, 2),
        (258, SHORT, 8),
        (259, SHORT, 1),
        (262, SHORT, 1),
        (273, LONG, 140),
        (277, SHORT, 1),
        (278, SHORT, 2),
        (279, LONG, 4),
    ], 0));
    assert_eq!(exif.len(), 140);
    exif.extend_from_slice(&pixels);

    let body = jpeg(8, 8);
    let mut file = body[..2].to_vec();
    file.extend_from_slice(&[0xFF, 0xE1]);
    file.extend_from_slice(&((exif.len() + 8) as u16).to_be_bytes());
    file.extend_from_slice(b"Exif\0\0");
    file.extend_from_slice(&exif);
    file.extend_from_slice(&body[2..]);
    file
}

fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_jpeg_without_metadata_has_no_previews() {
    let source = SourceImage::from_bytes(jpeg(8, 8));
    let previews = PreviewManager::new(&source).enumerate().unwrap();
    assert!(previews.is_empty());
}

#[test]
fn test_tiff_previews_are_listed_smallest_first() {
    let dir = tempfile::tempdir().unwrap();
    let thumbnail = jpeg(16, 16);
    let path = write_fixture(dir.path(), "shot.tif", &tiff_with_jpeg(&thumbnail, thumbnail.len() as u32));

    let source = SourceImage::open(&path).unwrap();
    let previews = PreviewManager::new(&source).enumerate().unwrap();

    let ids: Vec<usize> = previews.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![8, 14]);

    assert_eq!(previews[0].mime_type, "image/tiff");
    assert_eq!((previews[0].width, previews[0].height), (8, 4));
    assert_eq!(previews[0].size, 32);

    assert_eq!(previews[1].mime_type, "image/jpeg");
    assert_eq!((previews[1].width, previews[1].height), (16, 16));
    assert_eq!(previews[1].size as usize, thumbnail.len());
}

#[test]
fn test_offset_preview_bytes_are_exact() {
    let dir = tempfile::tempdir().unwrap();
    let thumbnail = jpeg(16, 16);
    let path = write_fixture(dir.path(), "shot.tif", &tiff_with_jpeg(&thumbnail, thumbnail.len() as u32));

    let source = SourceImage::open(&path).unwrap();
    let image = PreviewManager::new(&source).fetch(14).unwrap();

    assert_eq!(image.data(), &thumbnail[..]);
    assert_eq!(image.extension(), ".jpg");
}

#[test]
fn test_out_of_bounds_offset_preview_is_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let thumbnail = jpeg(16, 16);
    let path = write_fixture(dir.path(), "short.tif", &tiff_with_jpeg(&thumbnail, thumbnail.len() as u32 + 1));

    let source = SourceImage::open(&path).unwrap();
    let manager = PreviewManager::new(&source);
    let ids: Vec<usize> = manager.enumerate().unwrap().iter().map(|p| p.id).collect();

    assert_eq!(ids, vec![8]);
    assert!(manager.fetch(14).unwrap().is_empty());
}

#[test]
fn test_reconstructed_tiff_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let thumbnail = jpeg(16, 16);
    let path = write_fixture(dir.path(), "shot.tif", &tiff_with_jpeg(&thumbnail, thumbnail.len() as u32));

    let source = SourceImage::open(&path).unwrap();
    let preview = PreviewManager::new(&source).fetch(8).unwrap();
    assert_eq!(preview.mime_type(), "image/tiff");
    assert_eq!(preview.size() as usize, preview.data().len());

    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut Cursor::new(preview.data())).unwrap();
    assert_eq!(tiff.ifd_count(), 1);
    let ifd = tiff.main_ifd().unwrap();
    assert_eq!(ifd.get_dimensions(), Some((8, 4)));
    assert!(!ifd.has_tag(254));
    assert!(!ifd.has_tag(513));

    let decoded = image::load_from_memory_with_format(preview.data(), ImageFormat::Tiff).unwrap();
    let gray = decoded.to_luma8();
    assert_eq!(gray.dimensions(), (8, 4));
    assert_eq!(gray.as_raw().as_slice(), &PIXELS[..]);
}

#[test]
fn test_unknown_id_yields_empty_image() {
    let source = SourceImage::from_bytes(jpeg(8, 8));
    let manager = PreviewManager::new(&source);

    let image = manager.fetch(3).unwrap();
    assert!(image.is_empty());
    assert_eq!(image.id(), 3);
    assert_eq!(image.size(), 0);

    assert!(manager.fetch(500).unwrap().is_empty());
}

#[test]
fn test_equal_areas_keep_registry_order() {
    let large = jpeg(32, 16);
    let small = jpeg(16, 16);

    let mut store = MetadataStore::new();
    for (key, data) in [
        ("Exif.Thumbnail.JPEGInterchangeFormat", &large),
        ("Exif.NikonPreview.JPEGInterchangeFormat", &small),
        ("Exif.Pentax.PreviewOffset", &small),
    ] {
        store.add_by_name(key, long(&[0])).unwrap();
        assert!(store.set_data_area(&MetadataKey::parse(key).unwrap(), data.clone()));
    }

    let source = SourceImage::with_metadata(vec![0; 16], "image/jpeg", store);
    let ids: Vec<usize> = PreviewManager::new(&source).enumerate().unwrap().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 0]);
}

#[test]
fn test_inline_blob_gets_jpeg_marker_restored() {
    let mut damaged = jpeg(16, 8);
    damaged[0] = 0x00;

    let mut store = MetadataStore::new();
    let value = Value::new(UNDEFINED, damaged.len() as u64, damaged.clone(), ByteOrder::LittleEndian);
    store.add_by_name("Exif.Minolta.Thumbnail", value).unwrap();

    let source = SourceImage::with_metadata(vec![0; 16], "image/x-minolta-mrw", store);
    let manager = PreviewManager::new(&source);
    let previews = manager.enumerate().unwrap();
    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].id, 6);
    assert_eq!((previews[0].width, previews[0].height), (16, 8));

    let image = manager.preview_image(&previews[0]).unwrap();
    assert_eq!(image.data()[0], 0xFF);
    assert_eq!(&image.data()[1..], &damaged[1..]);
}

#[test]
fn test_missing_file_during_fetch_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let thumbnail = jpeg(16, 16);
    let path = write_fixture(dir.path(), "gone.tif", &tiff_with_jpeg(&thumbnail, thumbnail.len() as u32));

    let source = SourceImage::open(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let result = PreviewManager::new(&source).fetch(14);
    assert!(matches!(result, Err(PreviewError::Io { .. })));
}

#[test]
fn test_extract_all_writes_named_files() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let thumbnail = jpeg(16, 16);
    let path = write_fixture(dir.path(), "IMG_0042.tif", &tiff_with_jpeg(&thumbnail, thumbnail.len() as u32));

    let written = PreviewKit::new().extract_all(&path, Some(out.path())).unwrap();
    assert_eq!(written, vec![
        out.path().join("IMG_0042-preview8.tif"),
        out.path().join("IMG_0042-preview14.jpg"),
    ]);
    assert_eq!(fs::read(&written[1]).unwrap(), thumbnail);

    let none = PreviewKit::new().extract(&path, 0, Some(out.path())).unwrap();
    assert!(none.is_none());
}

#[test]
fn test_jpeg_strip_thumbnail_is_read_from_exif_block() {
    let pixels = [11, 22, 33, 44];
    let source = SourceImage::from_bytes(jpeg_with_strip_thumbnail(pixels));
    assert_eq!(source.mime_type(), "image/jpeg");

    let manager = PreviewManager::new(&source);
    let previews = manager.enumerate().unwrap();
    let ids: Vec<usize> = previews.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![13]);
    assert_eq!(previews[0].size, 4);

    let image = manager.fetch(13).unwrap();
    let decoded = image::load_from_memory_with_format(image.data(), ImageFormat::Tiff).unwrap();
    let gray = decoded.to_luma8();
    assert_eq!(gray.dimensions(), (2, 2));
    assert_eq!(gray.as_raw().as_slice(), &pixels[..]);
}
