use std::path::PathBuf;

use thiserror::Error;

use crate::shared::bitmap::Bitmap;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("cannot encode a {0}-channel bitmap, expected 3 channels")]
    UnsupportedChannels(u8),
    #[error("image codec rejected the pixel buffer: {0}")]
    Codec(#[from] image::ImageError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Serializes a bitmap into a compressed byte stream for transmission.
pub trait ImageEncoder: Send {
    fn encode(&self, image: &Bitmap) -> Result<Vec<u8>, EncodeError>;
}
