//! Preview extraction
//!
//! Camera files carry reduced-size copies of their main image in several
//! vendor-specific ways. This module knows where to look (`tables`), how to
//! pull each kind out (`variant`), and ranks what it finds (`manager`).

pub mod errors;
pub mod tables;
pub mod variant;
pub mod sniffer;
pub mod image;
pub mod manager;

pub use errors::{PreviewError, PreviewResult};
pub use image::{PreviewId, PreviewImage, PreviewProperties};
pub use manager::PreviewManager;
pub use variant::ExtractionVariant;
