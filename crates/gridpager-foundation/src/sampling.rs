//! Bounds-based downsampling math.

/// Pixel dimensions of a source image, read without decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageBounds {
    pub width: u32,
    pub height: u32,
}

/// Dimensions a decoded image should fit within.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl Default for TargetSize {
    /// Grid thumbnail target.
    fn default() -> Self {
        Self {
            width: 300,
            height: 200,
        }
    }
}

/// Computes the integer downsampling factor for decoding `bounds` to fit
/// `target`.
///
/// Returns 1 when the source already fits. Otherwise the ratio is taken on
/// the source's larger axis against the target dimension on that same axis,
/// rounded to the nearest integer and clamped to at least 1. For 1200x800
/// into 300x200 both axes give 4.
pub fn sample_size(bounds: ImageBounds, target: TargetSize) -> u32 {
    if bounds.width <= target.width && bounds.height <= target.height {
        return 1;
    }
    let ratio = if bounds.width >= bounds.height {
        bounds.width as f32 / target.width.max(1) as f32
    } else {
        bounds.height as f32 / target.height.max(1) as f32
    };
    (ratio.round() as u32).max(1)
}
