use ndarray::{concatenate, Array3, ArrayView3, Axis};
use thiserror::Error;

use crate::shared::bitmap::Bitmap;
use crate::shared::constants::BLANK_VALUE;

#[derive(Error, Debug)]
pub enum TileError {
    #[error("grid size must be at least 1")]
    ZeroGridSize,
    #[error("tile {index} is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    SizeMismatch {
        index: usize,
        actual_width: u32,
        actual_height: u32,
        expected_width: u32,
        expected_height: u32,
    },
    #[error("{count} images do not fit a {grid_size}x{grid_size} grid")]
    TooManyImages { count: usize, grid_size: usize },
    #[error("failed to concatenate tiles: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Arranges equally sized images into a square grid.
///
/// Cells are filled row-major; cells past the end of the input hold a
/// white placeholder of the tile size.
pub struct GridTiler {
    grid_size: usize,
    blank: Bitmap,
}

impl GridTiler {
    pub fn new(grid_size: usize, tile_size: u32) -> Result<Self, TileError> {
        if grid_size == 0 {
            return Err(TileError::ZeroGridSize);
        }
        Ok(Self {
            grid_size,
            blank: Bitmap::filled(tile_size, tile_size, BLANK_VALUE),
        })
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Number of tiles one composite holds.
    pub fn capacity(&self) -> usize {
        self.grid_size * self.grid_size
    }

    pub fn blank(&self) -> &Bitmap {
        &self.blank
    }

    /// Tiles up to `grid_size²` images into one composite of
    /// `(grid_size * tile) x (grid_size * tile)` pixels.
    pub fn tile(&self, images: &[Bitmap]) -> Result<Bitmap, TileError> {
        if images.len() > self.capacity() {
            return Err(TileError::TooManyImages {
                count: images.len(),
                grid_size: self.grid_size,
            });
        }
        self.check_sizes(images)?;

        let cells: Vec<ArrayView3<'_, u8>> = (0..self.capacity())
            .map(|i| images.get(i).unwrap_or(&self.blank).as_ndarray())
            .collect();

        let rows = cells
            .chunks(self.grid_size)
            .map(|row| concatenate(Axis(1), row))
            .collect::<Result<Vec<Array3<u8>>, _>>()?;
        let row_views: Vec<ArrayView3<'_, u8>> = rows.iter().map(|r| r.view()).collect();
        let composite = concatenate(Axis(0), &row_views)?;

        Ok(Bitmap::from_ndarray(&composite))
    }

    /// Splits `images` into consecutive batches of `grid_size²` and tiles each.
    pub fn tile_all(&self, images: &[Bitmap]) -> Result<Vec<Bitmap>, TileError> {
        images
            .chunks(self.capacity())
            .map(|batch| self.tile(batch))
            .collect()
    }

    fn check_sizes(&self, images: &[Bitmap]) -> Result<(), TileError> {
        let (expected_width, expected_height) = self.blank.dimensions();
        for (index, image) in images.iter().enumerate() {
            if image.dimensions() != (expected_width, expected_height)
                || image.channels() != self.blank.channels()
            {
                return Err(TileError::SizeMismatch {
                    index,
                    actual_width: image.width(),
                    actual_height: image.height(),
                    expected_width,
                    expected_height,
                });
            }
        }
        Ok(())
    }
}
