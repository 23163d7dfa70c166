use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder as _};

use crate::imaging::domain::image_encoder::{EncodeError, ImageEncoder};
use crate::shared::bitmap::Bitmap;

/// Lossless PNG encoding through the `image` crate.
pub struct PngImageEncoder;

impl PngImageEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PngImageEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageEncoder for PngImageEncoder {
    fn encode(&self, image: &Bitmap) -> Result<Vec<u8>, EncodeError> {
        if image.channels() != 3 {
            return Err(EncodeError::UnsupportedChannels(image.channels()));
        }
        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer).write_image(
            image.data(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(buffer)
    }
}
