/// Bytes per pixel of a decoded bitmap (RGBA8888).
pub const BYTES_PER_PIXEL: usize = 4;

/// An immutable decoded raster.
///
/// Produced once by a decode worker, then shared read-only as an
/// `Arc<Bitmap>` by the cache and any slot it is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Box<[u8]>,
}

impl Bitmap {
    /// Wraps decoded RGBA pixel data.
    ///
    /// `pixels.len()` must equal `width * height * BYTES_PER_PIXEL`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * BYTES_PER_PIXEL,
            "pixel buffer does not match dimensions"
        );
        Self {
            width,
            height,
            pixels: pixels.into_boxed_slice(),
        }
    }

    /// A solid-color bitmap, mostly useful for tests and placeholders.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * BYTES_PER_PIXEL);
        for _ in 0..width as usize * height as usize {
            pixels.extend_from_slice(&rgba);
        }
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Size of the decoded data in bytes; the cache cost of this bitmap.
    pub fn byte_count(&self) -> usize {
        self.pixels.len()
    }
}
