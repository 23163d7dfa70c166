use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::bitmap::Bitmap;

#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("cannot read image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("cannot list directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loads source images as tile-sized bitmaps.
pub trait ImageReader {
    /// Reads the image at `path`, normalized to the reader's tile size.
    fn read(&self, path: &Path) -> Result<Bitmap, ImageLoadError>;
}
