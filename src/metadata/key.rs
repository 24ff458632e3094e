//! Hierarchical metadata keys of the form `Exif.Group.Tag`

use std::fmt;
use lazy_static::lazy_static;
use regex::Regex;

use crate::metadata::tag_names;
use crate::preview::errors::{PreviewError, PreviewResult};

/// The only key family this crate produces
pub const EXIF_FAMILY: &str = "Exif";

lazy_static! {
    static ref KEY_PATTERN: Regex = Regex::new(r"^([A-Za-z]+)\.([A-Za-z][A-Za-z0-9]*)\.([A-Za-z0-9]+)$")
        .expect("metadata key pattern is valid");
}

/// A resolved metadata key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetadataKey {
    group: String,
    tag: u16,
    tag_name: String,
}

impl MetadataKey {
    /// Creates a key for a numeric tag, resolving its name within `group`
    pub fn new(group: &str, tag: u16) -> Self {
        MetadataKey {
            group: group.to_string(),
            tag,
            tag_name: tag_names::tag_name(group, tag),
        }
    }

    /// Parses `Exif.Group.Tag`, where Tag is a known name or a `0xNNNN` literal
    pub fn parse(key: &str) -> PreviewResult<Self> {
        let captures = KEY_PATTERN.captures(key)
            .ok_or_else(|| PreviewError::InvalidKey(key.to_string()))?;

        if &captures[1] != EXIF_FAMILY {
            return Err(PreviewError::InvalidKey(key.to_string()));
        }

        let group = &captures[2];
        let tag = tag_names::tag_id(group, &captures[3])
            .ok_or_else(|| PreviewError::InvalidKey(key.to_string()))?;

        Ok(MetadataKey::new(group, tag))
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn tag(&self) -> u16 {
        self.tag
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", EXIF_FAMILY, self.group, self.tag_name)
    }
}
