//! Byte-bounded in-memory bitmap cache.
//!
//! [`BitmapCache`] maps opaque item keys to decoded [`Bitmap`]s, bounded by
//! the total decoded byte size and evicting least-recently-used entries.
//! Capacity is usually derived from a host-supplied memory budget via
//! [`cache_budget_bytes`].
//!
//! Eviction only affects future lookups: a slot that already received an
//! `Arc<Bitmap>` keeps displaying it after the entry is evicted.

mod bitmap;
mod budget;
mod error;
mod lru;

pub use bitmap::{Bitmap, BYTES_PER_PIXEL};
pub use budget::{
    cache_budget_bytes, DEFAULT_CACHE_FRACTION, MAX_CACHE_FRACTION, MIN_CACHE_FRACTION,
};
pub use error::ConfigError;
pub use lru::BitmapCache;
