//! Header-only image probing

use std::io::Cursor;

use image::ImageReader;
use log::trace;

/// Reads the pixel dimensions of an encoded image without decoding it
///
/// Returns None if the format is not recognised, the header is malformed,
/// or either dimension is zero.
pub fn probe_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?;

    let format = reader.format();
    match reader.into_dimensions() {
        Ok((width, height)) if width > 0 && height > 0 => {
            trace!("Probed {:?} image: {}x{}", format, width, height);
            Some((width, height))
        },
        Ok(_) => None,
        Err(e) => {
            trace!("Could not probe image dimensions: {}", e);
            None
        }
    }
}
