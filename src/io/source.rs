//! Source images
//!
//! A `SourceImage` is the read-only input of preview extraction: a file on
//! disk or an in-memory buffer, its sniffed MIME type and the metadata
//! loaded from it. File-backed sources are never held open; each read maps
//! the file afresh through a `SourceView` and the map is released when the
//! view is dropped.

use std::fs::File;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use log::{debug, info};
use memmap2::Mmap;

use crate::metadata::loader;
use crate::metadata::store::MetadataStore;
use crate::preview::errors::{PreviewError, PreviewResult};
use crate::tiff::constants::{header, mime};
use crate::utils::format_utils;

/// Path reported for in-memory sources
pub const MEMORY_PATH: &str = "<memory>";

#[derive(Debug, Clone)]
enum Backing {
    File(PathBuf),
    Memory(Vec<u8>),
}

/// A read-only view of a source's bytes
pub enum SourceView<'a> {
    Mapped(Mmap),
    Borrowed(&'a [u8]),
}

impl Deref for SourceView<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            SourceView::Mapped(map) => map,
            SourceView::Borrowed(bytes) => bytes,
        }
    }
}

/// An image file (or buffer) previews are extracted from
#[derive(Debug, Clone)]
pub struct SourceImage {
    backing: Backing,
    path: String,
    mime_type: String,
    size: u64,
    metadata: MetadataStore,
}

impl SourceImage {
    /// Opens a file, sniffs its type and loads its metadata
    pub fn open(path: impl AsRef<Path>) -> PreviewResult<Self> {
        let path = path.as_ref();
        info!("Opening source image: {}", path.display());

        let mut source = SourceImage {
            backing: Backing::File(path.to_path_buf()),
            path: path.display().to_string(),
            mime_type: mime::UNKNOWN.to_string(),
            size: 0,
            metadata: MetadataStore::new(),
        };

        let (mime_type, size, metadata) = {
            let view = source.map()?;
            (sniff_mime_type(&view), view.len() as u64, loader::load_metadata(&view))
        };

        debug!("{}: {} bytes, {}, {} metadata entries", source.path, size, mime_type, metadata.len());
        source.mime_type = mime_type.to_string();
        source.size = size;
        source.metadata = metadata;
        Ok(source)
    }

    /// Wraps an in-memory buffer, sniffing its type and loading its metadata
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime_type = sniff_mime_type(&bytes);
        let metadata = loader::load_metadata(&bytes);
        SourceImage::with_metadata(bytes, mime_type, metadata)
    }

    /// Wraps an in-memory buffer with caller-supplied type and metadata
    pub fn with_metadata(bytes: Vec<u8>, mime_type: &str, metadata: MetadataStore) -> Self {
        SourceImage {
            size: bytes.len() as u64,
            backing: Backing::Memory(bytes),
            path: MEMORY_PATH.to_string(),
            mime_type: mime_type.to_string(),
            metadata,
        }
    }

    /// Overrides the sniffed MIME type
    pub fn set_mime_type(&mut self, mime_type: &str) {
        self.mime_type = mime_type.to_string();
    }

    /// Maps the source read-only for the lifetime of the returned view
    pub fn map(&self) -> PreviewResult<SourceView<'_>> {
        match &self.backing {
            Backing::Memory(bytes) => Ok(SourceView::Borrowed(bytes)),
            Backing::File(path) => {
                let file = File::open(path).map_err(|e| PreviewError::io(path, e))?;
                let len = file.metadata().map_err(|e| PreviewError::io(path, e))?.len();
                if len == 0 {
                    return Ok(SourceView::Borrowed(&[]));
                }

                // SAFETY: the map is read-only and dropped with the view; the
                // file is not written by this process while it is mapped.
                let map = unsafe { Mmap::map(&file) }.map_err(|e| PreviewError::io(path, e))?;
                Ok(SourceView::Mapped(map))
            }
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size of the source in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }
}

/// Determines a MIME type from the leading bytes of a file
pub fn sniff_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0xFF, 0xD8]) {
        return mime::JPEG;
    }

    if !format_utils::has_tiff_header(data) {
        return mime::UNKNOWN;
    }

    if data.starts_with(b"IIU\0") {
        return mime::PANASONIC_RAW;
    }

    if data.get(8..10) == Some(&header::CR2_SIGNATURE[..]) {
        return mime::CANON_CR2;
    }

    mime::TIFF
}
