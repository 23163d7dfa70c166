use std::fs;
use std::path::{Path, PathBuf};

use crate::imaging::domain::image_reader::{ImageLoadError, ImageReader};
use crate::imaging::domain::normalizer::normalize;
use crate::shared::bitmap::Bitmap;
use crate::shared::constants::{DEFAULT_TILE_SIZE, IMAGE_EXTENSIONS};

/// Reads image files with the `image` crate and normalizes them to a square tile.
///
/// Any colour type is converted to 8-bit RGB. Sources that are not already
/// `tile_size x tile_size` are padded or scaled down, with a warning.
pub struct ImageFileReader {
    tile_size: u32,
}

impl ImageFileReader {
    pub fn new(tile_size: u32) -> Self {
        Self { tile_size }
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Bitmap, ImageLoadError> {
        let rgb = image::open(path)
            .map_err(|e| ImageLoadError::Decode {
                path: path.to_path_buf(),
                source: e,
            })?
            .to_rgb8();
        let (width, height) = rgb.dimensions();
        let bitmap = Bitmap::new(rgb.into_raw(), width, height, 3);

        if bitmap.dimensions() != (self.tile_size, self.tile_size) {
            log::warn!(
                "{} is {width}x{height}, normalizing to {size}x{size}",
                path.display(),
                size = self.tile_size
            );
        }
        Ok(normalize(&bitmap, self.tile_size))
    }
}

/// Lists the PNG files directly inside `dir`, sorted by path.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, ImageLoadError> {
    let list_err = |e: std::io::Error| ImageLoadError::ListDir {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if path.is_file() && is_image(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
