use std::path::Path;

use crate::imaging::domain::image_encoder::EncodeError;
use crate::shared::bitmap::Bitmap;

/// Writes a single bitmap to an image file.
pub trait ImageWriter {
    fn write(&self, path: &Path, image: &Bitmap) -> Result<(), EncodeError>;
}
