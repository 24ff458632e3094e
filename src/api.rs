use std::path::{Path, PathBuf};
use log::{info, warn};
use crate::io::source::SourceImage;
use crate::preview::errors::PreviewResult;
use crate::preview::image::{PreviewId, PreviewProperties};
use crate::preview::manager::PreviewManager;

/// Main interface to the PreviewKit library
///
/// Wraps opening a source, enumerating its previews and writing them out.
#[derive(Debug, Clone, Default)]
pub struct PreviewKit {
    mime_override: Option<String>,
}

impl PreviewKit {
    /// Create a new PreviewKit instance
    pub fn new() -> Self {
        PreviewKit::default()
    }

    /// Treat every opened source as `mime_type` instead of sniffing it
    pub fn with_mime_type(mut self, mime_type: &str) -> Self {
        self.mime_override = Some(mime_type.to_string());
        self
    }

    /// Open a source image, applying the MIME override if one is set
    pub fn open(&self, input_path: impl AsRef<Path>) -> PreviewResult<SourceImage> {
        let mut source = SourceImage::open(input_path)?;
        if let Some(mime_type) = &self.mime_override {
            info!("Treating {} as {}", source.path(), mime_type);
            source.set_mime_type(mime_type);
        }
        Ok(source)
    }

    /// List the previews of a file, smallest first
    ///
    /// # Arguments
    /// * `input_path` - Path to the image file
    ///
    /// # Returns
    /// The preview properties or an error if the file cannot be read
    pub fn list(&self, input_path: impl AsRef<Path>) -> PreviewResult<Vec<PreviewProperties>> {
        let source = self.open(input_path)?;
        PreviewManager::new(&source).enumerate()
    }

    /// Extract one preview of a file
    ///
    /// The preview is written to `<output_dir>/<stem>-preview<id><ext>`, where
    /// `output_dir` defaults to the input's directory.
    ///
    /// # Arguments
    /// * `input_path` - Path to the image file
    /// * `id` - Preview id as reported by `list`
    /// * `output_dir` - Optional directory for the written file
    ///
    /// # Returns
    /// The written path, or `None` if the file has no preview `id`
    pub fn extract(&self,
                   input_path: impl AsRef<Path>,
                   id: PreviewId,
                   output_dir: Option<&Path>) -> PreviewResult<Option<PathBuf>> {
        let input_path = input_path.as_ref();
        let source = self.open(input_path)?;
        let image = PreviewManager::new(&source).fetch(id)?;

        if image.is_empty() {
            warn!("{} has no preview {}", input_path.display(), id);
            return Ok(None);
        }

        image.write_file(output_base(input_path, output_dir, id)).map(Some)
    }

    /// Extract every preview of a file
    ///
    /// # Returns
    /// The written paths in enumeration order
    pub fn extract_all(&self,
                       input_path: impl AsRef<Path>,
                       output_dir: Option<&Path>) -> PreviewResult<Vec<PathBuf>> {
        let input_path = input_path.as_ref();
        let source = self.open(input_path)?;
        let manager = PreviewManager::new(&source);

        let mut written = Vec::new();
        for properties in manager.enumerate()? {
            let image = manager.preview_image(&properties)?;
            if image.is_empty() {
                continue;
            }
            written.push(image.write_file(output_base(input_path, output_dir, properties.id))?);
        }

        info!("Extracted {} previews from {}", written.len(), input_path.display());
        Ok(written)
    }
}

/// Output path of preview `id` without its extension
pub fn output_base(input_path: &Path, output_dir: Option<&Path>, id: PreviewId) -> PathBuf {
    let stem = input_path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input_path.parent().map(Path::to_path_buf))
        .unwrap_or_default();

    dir.join(format!("{}-preview{}", stem, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_base_defaults_to_input_directory() {
        let base = output_base(Path::new("/photos/IMG_0001.CR2"), None, 3);
        assert_eq!(base, PathBuf::from("/photos/IMG_0001-preview3"));
    }

    #[test]
    fn output_base_uses_output_directory() {
        let base = output_base(Path::new("IMG_0001.NEF"), Some(Path::new("/tmp/out")), 0);
        assert_eq!(base, PathBuf::from("/tmp/out/IMG_0001-preview0"));
    }

    #[test]
    fn output_base_without_directory_is_relative() {
        let base = output_base(Path::new("shot.jpg"), None, 12);
        assert_eq!(base, PathBuf::from("shot-preview12"));
    }
}
