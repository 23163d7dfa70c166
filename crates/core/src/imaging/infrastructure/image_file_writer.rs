use std::fs;
use std::path::Path;

use crate::imaging::domain::image_encoder::{EncodeError, ImageEncoder};
use crate::imaging::domain::image_writer::ImageWriter;
use crate::imaging::infrastructure::png_encoder::PngImageEncoder;
use crate::shared::bitmap::Bitmap;

/// Writes bitmaps as PNG files, creating parent directories as needed.
pub struct ImageFileWriter {
    encoder: PngImageEncoder,
}

impl ImageFileWriter {
    pub fn new() -> Self {
        Self {
            encoder: PngImageEncoder::new(),
        }
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, image: &Bitmap) -> Result<(), EncodeError> {
        let write_err = |e: std::io::Error| EncodeError::Write {
            path: path.to_path_buf(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let bytes = self.encoder.encode(image)?;
        fs::write(path, bytes).map_err(write_err)?;
        Ok(())
    }
}
