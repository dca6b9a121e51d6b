use std::hash::Hash;

use gridpager_cache::Bitmap;

use crate::ImageBounds;

/// How an item key resolves to image content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// Path-like content decoded with bounds-based downsampling.
    Sampled,
    /// Content-store key served a pre-generated thumbnail.
    Thumbnail,
}

/// Resolves item keys to decoded bitmaps on worker threads.
///
/// The content source behind this trait may fail for any key (missing or
/// unreadable content); every method degrades to `None` instead of
/// propagating an error, and the affected slot simply keeps its placeholder.
pub trait ImageDecoder: Send + Sync {
    /// Opaque, equality-comparable item key; stable within one data-set
    /// version.
    type Key: Eq + Hash + Clone + Send + 'static;

    /// Classifies how `key` should be resolved.
    fn source_kind(&self, key: &Self::Key) -> SourceKind {
        let _ = key;
        SourceKind::Sampled
    }

    /// Reads the source dimensions without decoding pixel data.
    fn probe(&self, key: &Self::Key) -> Option<ImageBounds>;

    /// Decodes `key` at the given integer downsampling factor.
    fn decode(&self, key: &Self::Key, sample_size: u32) -> Option<Bitmap>;

    /// Fetches a pre-generated thumbnail for a [`SourceKind::Thumbnail`] key.
    fn thumbnail(&self, key: &Self::Key) -> Option<Bitmap> {
        let _ = key;
        None
    }
}
