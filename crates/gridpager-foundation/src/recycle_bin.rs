//! Per-view-type pools of detached slot views awaiting reuse.

use smallvec::SmallVec;

struct ScrapEntry<V> {
    /// Position the view last represented; used for proximity preference.
    position: usize,
    view: V,
}

type Pool<V> = SmallVec<[ScrapEntry<V>; 8]>;

/// Pools of scrapped slot views, one pool per view type.
///
/// Views enter a pool fully detached from their page; their old content
/// binding is undefined and consumers must re-bind through the adapter's
/// `get_view` before showing them. Mutated only on the coordination thread.
pub struct RecycleBin<V> {
    pools: Vec<Pool<V>>,
}

impl<V> Default for RecycleBin<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RecycleBin<V> {
    /// Creates a bin with a single view-type pool.
    pub fn new() -> Self {
        let mut bin = Self { pools: Vec::new() };
        bin.set_view_type_count(1);
        bin
    }

    /// Sizes the bin to `count` independent pools, discarding all scrap.
    pub fn set_view_type_count(&mut self, count: usize) {
        self.pools.clear();
        self.pools.resize_with(count.max(1), SmallVec::new);
    }

    pub fn view_type_count(&self) -> usize {
        self.pools.len()
    }

    /// Inserts a detached view into the pool for `view_type`, tagged with
    /// the position it last represented.
    ///
    /// `view_type` must be an index the bin was sized for; out-of-range
    /// types drop the view rather than growing the bin.
    pub fn add_scrap_view(&mut self, view: V, position: usize, view_type: usize) {
        match self.pools.get_mut(view_type) {
            Some(pool) => pool.push(ScrapEntry { position, view }),
            None => log::warn!("dropping scrap view of undeclared type {view_type}"),
        }
    }

    /// Removes and returns a pooled view of `view_type`, preferring the one
    /// whose last-known position is closest to `position`. Ties go to the
    /// most recently scrapped entry.
    pub fn get_scrap_view(&mut self, position: usize, view_type: usize) -> Option<V> {
        let pool = self.pools.get_mut(view_type)?;
        let mut best: Option<(usize, usize)> = None; // (distance, index)
        for (index, entry) in pool.iter().enumerate() {
            let distance = entry.position.abs_diff(position);
            if best.map_or(true, |(best_distance, _)| distance <= best_distance) {
                best = Some((distance, index));
            }
        }
        let (_, index) = best?;
        Some(pool.remove(index).view)
    }

    /// Clears every pool. Called on full data-set invalidation: scrapped
    /// views' bindings are undefined across a data-set change, so none of
    /// them may be reused.
    pub fn scrap_active_views(&mut self) {
        for pool in &mut self.pools {
            pool.clear();
        }
    }

    /// Number of scrapped views currently pooled for `view_type`.
    pub fn scrap_count(&self, view_type: usize) -> usize {
        self.pools.get(view_type).map_or(0, SmallVec::len)
    }
}
