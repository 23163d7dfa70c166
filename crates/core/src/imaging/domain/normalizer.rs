use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::shared::bitmap::Bitmap;
use crate::shared::constants::BLANK_VALUE;

/// Dimensions an image of `width x height` takes on a `size x size` canvas.
///
/// Images that already fit keep their size. Otherwise the longer side becomes
/// `size` and the shorter side is scaled by the same ratio, rounding down
/// but never below one pixel.
pub fn fitted_dimensions(width: u32, height: u32, size: u32) -> (u32, u32) {
    if width <= size && height <= size {
        return (width, height);
    }
    let scale = |short: u32, long: u32| -> u32 {
        ((short as u64 * size as u64) / long as u64).max(1) as u32
    };
    if width >= height {
        (size, scale(height, width))
    } else {
        (scale(width, height), size)
    }
}

/// Returns `image` fitted onto a white `size x size` canvas at the top-left corner.
///
/// An image that is already `size x size` is returned as is.
pub fn normalize(image: &Bitmap, size: u32) -> Bitmap {
    if image.dimensions() == (size, size) {
        return image.clone();
    }

    let (w, h) = fitted_dimensions(image.width(), image.height(), size);
    let content = if (w, h) == image.dimensions() {
        image.clone()
    } else {
        resize(image, w, h)
    };

    Bitmap::filled(size, size, BLANK_VALUE).compose(&content)
}

fn resize(image: &Bitmap, width: u32, height: u32) -> Bitmap {
    debug_assert_eq!(image.channels(), 3, "only RGB bitmaps can be resized");
    let rgb = RgbImage::from_raw(image.width(), image.height(), image.data().to_vec())
        .expect("Bitmap data length must match dimensions");
    let resized = imageops::resize(&rgb, width, height, FilterType::Triangle);
    Bitmap::new(resized.into_raw(), width, height, 3)
}
