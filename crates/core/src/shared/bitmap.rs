use ndarray::{Array3, ArrayView3};

/// An in-memory image: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; the domain layer
/// treats pixel data as opaque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Bitmap {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    /// A 3-channel image with every byte set to `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        let len = (width as usize) * (height as usize) * 3;
        Self::new(vec![value; len], width, height, 3)
    }

    /// Builds a bitmap from a `(height, width, channels)` array.
    pub fn from_ndarray(array: &Array3<u8>) -> Self {
        let (height, width, channels) = array.dim();
        let data: Vec<u8> = array.iter().copied().collect();
        Self::new(data, width as u32, height as u32, channels as u8)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.channels as usize;
        let start = ((y as usize) * (self.width as usize) + x as usize) * c;
        &self.data[start..start + c]
    }

    /// Returns a copy of the `width` x `height` block whose top-left corner is `(x, y)`.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Bitmap {
        let c = self.channels as usize;
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * c);
        for row in y..y + height {
            let start = ((row as usize) * (self.width as usize) + x as usize) * c;
            data.extend_from_slice(&self.data[start..start + (width as usize) * c]);
        }
        Bitmap::new(data, width, height, self.channels)
    }

    /// Returns a new bitmap with `overlay` drawn over `self` at the top-left corner.
    ///
    /// Parts of the overlay that fall outside `self` are clipped. Neither
    /// input is modified.
    pub fn compose(&self, overlay: &Bitmap) -> Bitmap {
        debug_assert_eq!(self.channels, overlay.channels, "channel counts must match");
        let c = self.channels as usize;
        let copy_w = self.width.min(overlay.width) as usize;
        let copy_h = self.height.min(overlay.height) as usize;

        let mut data = self.data.clone();
        for row in 0..copy_h {
            let dst = row * (self.width as usize) * c;
            let src = row * (overlay.width as usize) * c;
            data[dst..dst + copy_w * c].copy_from_slice(&overlay.data[src..src + copy_w * c]);
        }
        Bitmap::new(data, self.width, self.height, self.channels)
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Bitmap data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
