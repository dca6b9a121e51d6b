//! Paged windowing over a recycling adapter.

use gridpager_cache::ConfigError;

use crate::{GridAdapter, GridPage, PageViewFactory, RecycleBin};

/// Number of page views kept pooled for reuse, pre-inflated at construction.
pub const PAGE_POOL_CAPACITY: usize = 3;

/// Slot reuse counters, for tests and diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PagerStats {
    /// Slots the adapter built from scratch.
    pub inflated: usize,
    /// Slots served from the recycle bin.
    pub reused: usize,
}

/// Partitions a linear item collection into fixed-size pages of recycled
/// slot views.
///
/// Page capacity is `columns * rows`, read once from an inflated page
/// prototype. Materializing a page pulls each slot from the [`RecycleBin`]
/// (or lets the adapter inflate a fresh one) and hands it to the adapter's
/// `get_view` for binding; releasing a page returns its slots to the bin
/// tagged with their positions and the page view to an internal pool.
///
/// All methods run on the coordination thread.
pub struct RecyclingPagerAdapter<A, F>
where
    A: GridAdapter,
    F: PageViewFactory,
    F::Page: GridPage<View = A::View>,
{
    adapter: A,
    factory: F,
    bin: RecycleBin<A::View>,
    page_pool: Vec<F::Page>,
    page_capacity: usize,
    stats: PagerStats,
}

impl<A, F> RecyclingPagerAdapter<A, F>
where
    A: GridAdapter,
    F: PageViewFactory,
    F::Page: GridPage<View = A::View>,
{
    /// Builds the pager, pre-inflating [`PAGE_POOL_CAPACITY`] page views and
    /// reading the page capacity from one of them.
    ///
    /// Fails fast if the page layout declares a zero-slot grid or the
    /// adapter declares no view types.
    pub fn new(adapter: A, mut factory: F) -> Result<Self, ConfigError> {
        let mut page_pool = Vec::with_capacity(PAGE_POOL_CAPACITY);
        for _ in 0..PAGE_POOL_CAPACITY {
            page_pool.push(factory.inflate_page());
        }
        let prototype = &page_pool[PAGE_POOL_CAPACITY - 1];
        let page_capacity = prototype.column_count() * prototype.row_count();
        if page_capacity == 0 {
            return Err(ConfigError::new(format!(
                "page layout declares a {}x{} grid; need at least one slot",
                prototype.column_count(),
                prototype.row_count()
            )));
        }

        let view_types = adapter.view_type_count();
        if view_types == 0 {
            return Err(ConfigError::new("adapter must declare at least one view type"));
        }
        let mut bin = RecycleBin::new();
        bin.set_view_type_count(view_types);

        Ok(Self {
            adapter,
            factory,
            bin,
            page_pool,
            page_capacity,
            stats: PagerStats::default(),
        })
    }

    /// Slots per page (`columns * rows`).
    pub fn page_capacity(&self) -> usize {
        self.page_capacity
    }

    /// Number of pages covering the current item count.
    pub fn page_count(&self) -> usize {
        self.adapter.item_count().div_ceil(self.page_capacity)
    }

    /// Assembles the page at index `page`, filling each slot from the bin
    /// or a fresh inflation via the adapter.
    pub fn materialize_page(&mut self, page: usize) -> F::Page {
        let start = page * self.page_capacity;
        let end = self
            .adapter
            .item_count()
            .min((page + 1) * self.page_capacity);

        let mut page_view = self
            .page_pool
            .pop()
            .unwrap_or_else(|| self.factory.inflate_page());

        for position in start..end {
            let view_type = self.adapter.item_view_type(position);
            let scrap = view_type
                .index()
                .and_then(|vt| self.bin.get_scrap_view(position, vt));
            if scrap.is_some() {
                self.stats.reused += 1;
            } else {
                self.stats.inflated += 1;
            }
            let view = self.adapter.get_view(position, scrap);
            page_view.add_slot(view);
        }
        page_view
    }

    /// Disassembles a page produced by [`materialize_page`].
    ///
    /// Every non-ignored slot returns to the bin tagged with its position
    /// and view type; the page view returns to the page pool when the pool
    /// has room.
    ///
    /// [`materialize_page`]: Self::materialize_page
    pub fn release_page(&mut self, page: usize, mut page_view: F::Page) {
        let start = page * self.page_capacity;
        for (offset, view) in page_view.take_slots().into_iter().enumerate() {
            let position = start + offset;
            if let Some(view_type) = self.adapter.item_view_type(position).index() {
                self.bin.add_scrap_view(view, position, view_type);
            }
        }
        if self.page_pool.len() < PAGE_POOL_CAPACITY {
            self.page_pool.push(page_view);
        }
    }

    /// Called when the backing collection changes identity or content.
    ///
    /// Scrapped views' bindings are undefined across a data-set change, so
    /// every pool is cleared; callers re-materialize the visible pages.
    /// Cache contents are unaffected.
    pub fn invalidate(&mut self) {
        self.bin.scrap_active_views();
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn stats(&self) -> PagerStats {
        self.stats
    }

    /// Scrap currently pooled for `view_type`; test hook.
    pub fn scrap_count(&self, view_type: usize) -> usize {
        self.bin.scrap_count(view_type)
    }
}
