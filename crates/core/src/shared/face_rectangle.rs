use serde::{Deserialize, Serialize};

/// Bounding box of a detected face, in pixels of the image sent for detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRectangle {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceRectangle {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> (i32, i32) {
        (self.left + self.width / 2, self.top + self.height / 2)
    }

    /// Row-major index of the grid cell containing this rectangle's center,
    /// for a composite of `grid_size x grid_size` tiles of `tile_size` pixels.
    ///
    /// Returns `None` when the center lies outside the grid.
    pub fn grid_cell(&self, tile_size: u32, grid_size: usize) -> Option<usize> {
        if tile_size == 0 {
            return None;
        }
        let (cx, cy) = self.center();
        if cx < 0 || cy < 0 {
            return None;
        }
        let col = cx as usize / tile_size as usize;
        let row = cy as usize / tile_size as usize;
        if col >= grid_size || row >= grid_size {
            return None;
        }
        Some(row * grid_size + col)
    }
}
