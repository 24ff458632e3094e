//! Exif-style metadata
//!
//! Keys of the form `Exif.Group.Tag`, typed values, the ordered store that
//! holds them, and the loader that fills a store from TIFF or JPEG bytes.

pub mod key;
pub mod value;
pub mod store;
pub mod loader;
pub(crate) mod tag_names;

pub use key::MetadataKey;
pub use value::Value;
pub use store::{MetadataEntry, MetadataStore};
pub use loader::load_metadata;
