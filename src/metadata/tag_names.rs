//! Tag name definitions
//!
//! Tag names are resolved per metadata group from the definition table in
//! `preview_tags.toml`, which is embedded at compile time and parsed once.

use std::collections::HashMap;
use lazy_static::lazy_static;
use log::warn;
use crate::tiff::errors::{TiffError, TiffResult};

lazy_static! {
    static ref TAG_DEFINITIONS: TagDefinitions = {
        let content = include_str!("../../preview_tags.toml");
        TagDefinitions::parse(content).unwrap_or_else(|e| {
            warn!("Failed to parse tag definitions: {}", e);
            TagDefinitions::default()
        })
    };
}

/// Tag id to name tables
#[derive(Debug, Default)]
pub struct TagDefinitions {
    /// Names shared by every IFD-structured group
    pub standard: HashMap<u16, String>,
    /// Group-specific names, taking precedence over `standard`
    pub groups: HashMap<String, HashMap<u16, String>>,
}

impl TagDefinitions {
    /// Parse tag definitions from a TOML string
    pub fn parse(content: &str) -> TiffResult<Self> {
        let toml_value: toml::Value = content.parse()
            .map_err(|e| TiffError::GenericError(format!("Failed to parse TOML: {}", e)))?;

        let mut defs = TagDefinitions::default();

        if let Some(table) = toml_value.get("standard").and_then(|v| v.as_table()) {
            Self::parse_id_table(table, &mut defs.standard);
        }

        if let Some(groups) = toml_value.get("groups").and_then(|v| v.as_table()) {
            for (group, value) in groups {
                if let Some(table) = value.as_table() {
                    let mut names = HashMap::new();
                    Self::parse_id_table(table, &mut names);
                    defs.groups.insert(group.clone(), names);
                }
            }
        }

        Ok(defs)
    }

    fn parse_id_table(table: &toml::map::Map<String, toml::Value>, target: &mut HashMap<u16, String>) {
        for (k, v) in table {
            match (k.parse::<u16>(), v.as_str()) {
                (Ok(id), Some(name)) => {
                    target.insert(id, name.to_string());
                }
                _ => warn!("Skipping malformed tag definition {} = {}", k, v),
            }
        }
    }

    fn name_in_group(&self, group: &str, tag: u16) -> Option<&str> {
        self.groups.get(group)
            .and_then(|names| names.get(&tag))
            .or_else(|| self.standard.get(&tag))
            .map(String::as_str)
    }

    fn id_in_group(&self, group: &str, name: &str) -> Option<u16> {
        let find = |names: &HashMap<u16, String>| {
            names.iter().find(|(_, n)| n.as_str() == name).map(|(id, _)| *id)
        };

        self.groups.get(group)
            .and_then(find)
            .or_else(|| find(&self.standard))
    }
}

/// Name of a tag in the standard TIFF table
pub fn standard_tag_name(tag: u16) -> Option<&'static str> {
    TAG_DEFINITIONS.standard.get(&tag).map(String::as_str)
}

/// Name of a tag within a group; unknown tags render as `0xNNNN`
pub fn tag_name(group: &str, tag: u16) -> String {
    match TAG_DEFINITIONS.name_in_group(group, tag) {
        Some(name) => name.to_string(),
        None => format!("0x{:04x}", tag),
    }
}

/// Resolves a tag name (or `0xNNNN` literal) within a group to its id
pub fn tag_id(group: &str, name: &str) -> Option<u16> {
    if let Some(hex) = name.strip_prefix("0x") {
        return u16::from_str_radix(hex, 16).ok();
    }
    TAG_DEFINITIONS.id_in_group(group, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_definitions_parse() {
        assert_eq!(standard_tag_name(256), Some("ImageWidth"));
        assert_eq!(tag_name("Thumbnail", 513), "JPEGInterchangeFormat");
    }

    #[test]
    fn group_table_takes_precedence() {
        assert_eq!(tag_name("PanasonicRaw", 46), "PreviewImage");
        assert_eq!(tag_id("OlympusCs", "PreviewImageStart"), Some(0x0101));
        assert_eq!(tag_id("SubImage2", "StripOffsets"), Some(273));
    }

    #[test]
    fn unknown_tags_use_hex_names() {
        assert_eq!(tag_name("Image", 0xbeef), "0xbeef");
        assert_eq!(tag_id("Image", "0xbeef"), Some(0xbeef));
        assert_eq!(tag_id("Image", "NoSuchTag"), None);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let defs = TagDefinitions::parse("[standard]\n1 = \"One\"\nabc = \"Bad\"\n").unwrap();
        assert_eq!(defs.standard.len(), 1);
        assert!(TagDefinitions::parse("not toml [").is_err());
    }
}
