//! Preview value types

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::preview::errors::{PreviewError, PreviewResult};

/// Stable identifier of a preview location (a registry row)
pub type PreviewId = usize;

/// Description of one available preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewProperties {
    pub id: PreviewId,
    /// Size of the preview data in bytes
    pub size: u32,
    /// Width in pixels, 0 when unknown
    pub width: u32,
    /// Height in pixels, 0 when unknown
    pub height: u32,
    pub mime_type: String,
    /// File extension including the leading dot
    pub extension: String,
}

impl PreviewProperties {
    /// Properties of a preview that could not be produced
    pub fn empty(id: PreviewId) -> Self {
        PreviewProperties {
            id,
            size: 0,
            width: 0,
            height: 0,
            mime_type: String::new(),
            extension: String::new(),
        }
    }

    /// Pixel area used to rank previews
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// An extracted preview and its properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    properties: PreviewProperties,
    data: Vec<u8>,
}

impl PreviewImage {
    pub fn new(properties: PreviewProperties, data: Vec<u8>) -> Self {
        PreviewImage { properties, data }
    }

    pub fn empty(id: PreviewId) -> Self {
        PreviewImage::new(PreviewProperties::empty(id), Vec::new())
    }

    /// The preview bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// An owned copy of the preview bytes
    pub fn copy(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn size(&self) -> u32 {
        self.data.len() as u32
    }

    pub fn mime_type(&self) -> &str {
        &self.properties.mime_type
    }

    pub fn extension(&self) -> &str {
        &self.properties.extension
    }

    pub fn width(&self) -> u32 {
        self.properties.width
    }

    pub fn height(&self) -> u32 {
        self.properties.height
    }

    pub fn id(&self) -> PreviewId {
        self.properties.id
    }

    pub fn properties(&self) -> &PreviewProperties {
        &self.properties
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Writes the preview to `base` with the preview's extension appended
    ///
    /// # Returns
    /// The path written
    pub fn write_file(&self, base: impl AsRef<Path>) -> PreviewResult<PathBuf> {
        let mut path = base.as_ref().as_os_str().to_owned();
        path.push(&self.properties.extension);
        let path = PathBuf::from(path);

        fs::write(&path, &self.data).map_err(|e| PreviewError::io(&path, e))?;
        info!("Wrote preview {} ({} bytes) to {}", self.id(), self.data.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg_props(id: PreviewId) -> PreviewProperties {
        PreviewProperties {
            id,
            size: 3,
            width: 4,
            height: 5,
            mime_type: "image/jpeg".to_string(),
            extension: ".jpg".to_string(),
        }
    }

    #[test]
    fn empty_properties_have_no_area() {
        let props = PreviewProperties::empty(9);
        assert_eq!(props.id, 9);
        assert_eq!(props.area(), 0);
        assert!(PreviewImage::empty(9).is_empty());
    }

    #[test]
    fn clone_is_independent() {
        let image = PreviewImage::new(jpeg_props(1), vec![1, 2, 3]);
        let mut copy = image.copy();
        copy[0] = 9;
        assert_eq!(image.data(), &[1, 2, 3]);
        assert_eq!(image.clone(), image);
        assert_eq!(image.size(), 3);
        assert_eq!(image.width() as u64 * image.height() as u64, jpeg_props(1).area());
    }

    #[test]
    fn write_file_appends_extension() {
        let dir = tempfile::tempdir().unwrap();
        let image = PreviewImage::new(jpeg_props(2), vec![0xFF, 0xD8]);
        let written = image.write_file(dir.path().join("photo-preview2")).unwrap();

        assert_eq!(written, dir.path().join("photo-preview2.jpg"));
        assert_eq!(fs::read(&written).unwrap(), vec![0xFF, 0xD8]);
    }

    #[test]
    fn write_file_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let image = PreviewImage::new(jpeg_props(2), vec![0xFF]);
        let result = image.write_file(dir.path().join("no-such-dir").join("x"));
        assert!(matches!(result, Err(PreviewError::Io { .. })));
    }
}
