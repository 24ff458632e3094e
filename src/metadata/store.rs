//! Metadata store
//!
//! An ordered collection of `Exif.Group.Tag` entries. Each entry carries a
//! typed value and, optionally, a side-channel data area: payload bytes that
//! belong to the entry but live outside its inline value (an embedded
//! thumbnail, for example).

use log::{debug, trace};

use crate::metadata::key::MetadataKey;
use crate::metadata::value::Value;
use crate::preview::errors::PreviewResult;

/// One metadata entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    key: MetadataKey,
    value: Value,
    data_area: Vec<u8>,
}

impl MetadataEntry {
    pub fn new(key: MetadataKey, value: Value) -> Self {
        MetadataEntry { key, value, data_area: Vec::new() }
    }

    pub fn key(&self) -> &MetadataKey {
        &self.key
    }

    pub fn group(&self) -> &str {
        self.key.group()
    }

    pub fn tag(&self) -> u16 {
        self.key.tag()
    }

    pub fn tag_name(&self) -> &str {
        self.key.tag_name()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Declared field type of the value
    pub fn field_type(&self) -> u16 {
        self.value.field_type()
    }

    /// Number of value components
    pub fn count(&self) -> u64 {
        self.value.count()
    }

    /// Size of the inline encoded value
    pub fn size(&self) -> usize {
        self.value.size()
    }

    /// First component as an integer, 0 if absent
    pub fn to_u64(&self) -> u64 {
        self.value.to_u64(0).unwrap_or(0)
    }

    /// Side-channel bytes, empty if none are attached
    pub fn data_area(&self) -> &[u8] {
        &self.data_area
    }

    pub fn size_data_area(&self) -> usize {
        self.data_area.len()
    }

    pub fn set_data_area(&mut self, data: Vec<u8>) {
        self.data_area = data;
    }
}

/// Ordered metadata entries with key lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataStore {
    entries: Vec<MetadataEntry>,
    origin: u64,
}

impl MetadataStore {
    pub fn new() -> Self {
        MetadataStore::default()
    }

    /// Appends an entry
    pub fn add(&mut self, key: MetadataKey, value: Value) {
        trace!("Adding metadata entry {} = {}", key, value);
        self.entries.push(MetadataEntry::new(key, value));
    }

    /// Parses `key` and appends an entry for it
    pub fn add_by_name(&mut self, key: &str, value: Value) -> PreviewResult<()> {
        let key = MetadataKey::parse(key)?;
        self.add(key, value);
        Ok(())
    }

    /// Finds the first entry for `key`
    ///
    /// Malformed or unresolvable keys simply find nothing.
    pub fn find_key(&self, key: &str) -> Option<&MetadataEntry> {
        let key = MetadataKey::parse(key).ok()?;
        self.find(&key)
    }

    /// Finds the first entry for a resolved key
    pub fn find(&self, key: &MetadataKey) -> Option<&MetadataEntry> {
        self.entries.iter().find(|e| e.key.group() == key.group() && e.key.tag() == key.tag())
    }

    fn find_mut(&mut self, key: &MetadataKey) -> Option<&mut MetadataEntry> {
        self.entries.iter_mut().find(|e| e.key.group() == key.group() && e.key.tag() == key.tag())
    }

    /// Attaches side-channel bytes to an existing entry
    ///
    /// Returns false if no entry exists for `key`.
    pub fn set_data_area(&mut self, key: &MetadataKey, data: Vec<u8>) -> bool {
        match self.find_mut(key) {
            Some(entry) => {
                debug!("Attaching {} side-channel bytes to {}", data.len(), key);
                entry.set_data_area(data);
                true
            },
            None => false,
        }
    }

    /// File position that stored offsets are relative to
    ///
    /// Zero for TIFF-structured files. For a JPEG it is the start of the TIFF
    /// header inside the APP1 Exif segment.
    pub fn origin(&self) -> u64 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: u64) {
        self.origin = origin;
    }

    /// Converts an offset read from the metadata into a file position
    pub fn file_offset(&self, offset: u64) -> Option<u64> {
        offset.checked_add(self.origin)
    }

    /// Iterates over the entries of one group, in insertion order
    pub fn iter_group<'s>(&'s self, group: &'s str) -> impl Iterator<Item = &'s MetadataEntry> + 's {
        self.entries.iter().filter(move |e| e.group() == group)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetadataEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::byte_order::ByteOrder;
    use crate::tiff::constants::field_types;

    fn long(v: u32) -> Value {
        Value::from_u32s(field_types::LONG, &[v], ByteOrder::LittleEndian)
    }

    #[test]
    fn finds_entries_by_key_string() {
        let mut store = MetadataStore::new();
        store.add_by_name("Exif.Image.ImageWidth", long(640)).unwrap();
        store.add_by_name("Exif.Thumbnail.ImageWidth", long(160)).unwrap();

        assert_eq!(store.find_key("Exif.Thumbnail.ImageWidth").unwrap().to_u64(), 160);
        assert_eq!(store.find_key("Exif.Image.0x0100").unwrap().to_u64(), 640);
        assert!(store.find_key("Exif.Image.ImageLength").is_none());
        assert!(store.find_key("garbage").is_none());
    }

    #[test]
    fn iterates_one_group_in_order() {
        let mut store = MetadataStore::new();
        store.add_by_name("Exif.SubImage1.ImageWidth", long(1)).unwrap();
        store.add_by_name("Exif.Image.ImageWidth", long(2)).unwrap();
        store.add_by_name("Exif.SubImage1.ImageLength", long(3)).unwrap();

        let names: Vec<&str> = store.iter_group("SubImage1").map(|e| e.tag_name()).collect();
        assert_eq!(names, vec!["ImageWidth", "ImageLength"]);
    }

    #[test]
    fn data_area_attaches_to_existing_entries_only() {
        let mut store = MetadataStore::new();
        let key = MetadataKey::parse("Exif.Thumbnail.JPEGInterchangeFormat").unwrap();
        assert!(!store.set_data_area(&key, vec![1, 2, 3]));

        store.add(key.clone(), long(100));
        assert!(store.set_data_area(&key, vec![1, 2, 3]));
        assert_eq!(store.find(&key).unwrap().size_data_area(), 3);
    }

    #[test]
    fn file_offsets_are_shifted_by_origin() {
        let mut store = MetadataStore::new();
        assert_eq!(store.file_offset(100), Some(100));

        store.set_origin(12);
        assert_eq!(store.origin(), 12);
        assert_eq!(store.file_offset(100), Some(112));
        assert_eq!(store.file_offset(u64::MAX), None);
    }
}
