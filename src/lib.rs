pub mod io;
pub mod tiff;
pub mod metadata;
pub mod preview;
pub mod utils;
pub mod commands;
pub mod api;

pub use crate::api::PreviewKit;

pub use io::SourceImage;
pub use metadata::MetadataStore;
pub use preview::{PreviewError, PreviewImage, PreviewManager, PreviewProperties, PreviewResult};
