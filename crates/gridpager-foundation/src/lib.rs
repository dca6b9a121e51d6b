//! Recycling paged grid adapter with asynchronous image binding.
//!
//! The engine partitions a linear item collection into fixed-size pages.
//! Each page is a composite view whose child slots come from a
//! [`RecycleBin`] of detached views, and each slot's image is populated by
//! the [`ImageLoader`]: cache lookup first, then a cancellable decode on a
//! worker thread, with stale results rejected before they can bind.
//!
//! The host toolkit plugs in through three small traits: [`GridAdapter`]
//! (content binding), [`GridPage`]/[`PageViewFactory`] (the composite page
//! view), and [`ImageDecoder`] (content resolution). The engine itself holds
//! no toolkit-specific state.

mod adapter;
mod decoder;
mod loader;
mod page;
mod pager;
mod recycle_bin;
mod sampling;

pub use adapter::{GridAdapter, ViewType};
pub use decoder::{ImageDecoder, SourceKind};
pub use loader::{BindTransition, ImageLoader, RequestOutcome, SlotId, FADE_IN};
pub use page::{GridPage, PageViewFactory};
pub use pager::{PagerStats, RecyclingPagerAdapter, PAGE_POOL_CAPACITY};
pub use recycle_bin::RecycleBin;
pub use sampling::{sample_size, ImageBounds, TargetSize};

pub use gridpager_cache::{Bitmap, BitmapCache, ConfigError};
pub use gridpager_core::{CancelToken, Dispatcher, UiRuntime, WorkGate};
