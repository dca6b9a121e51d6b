/// The type of view a position renders into.
///
/// Either an index in `[0, view_type_count)` or [`ViewType::IGNORE`], which
/// marks a slot that is never pooled or recycled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewType(u32);

impl ViewType {
    /// Sentinel for slots that must not enter the recycle pools.
    pub const IGNORE: ViewType = ViewType(u32::MAX);

    /// A pooled view type with the given index.
    pub fn of(index: usize) -> Self {
        Self(index as u32)
    }

    /// Returns the pool index, or `None` for [`ViewType::IGNORE`].
    pub fn index(self) -> Option<usize> {
        if self.is_ignore() {
            None
        } else {
            Some(self.0 as usize)
        }
    }

    pub fn is_ignore(self) -> bool {
        self == Self::IGNORE
    }
}

/// Host-supplied content adapter; the per-item rendering hook.
///
/// Behaves like a classic list adapter with view types and view recycling:
/// the pager asks it for the item count, a view type per position, and a
/// bound view per position, handing back a recycled view of the matching
/// type when one is available.
pub trait GridAdapter {
    /// Opaque slot view handle owned by the host toolkit.
    type View;

    /// Total number of items in the backing collection.
    fn item_count(&self) -> usize;

    /// Number of distinct view types `get_view` produces. Must be at least 1
    /// and stable for the adapter's lifetime.
    fn view_type_count(&self) -> usize {
        1
    }

    /// View type for the item at `position`, in `[0, view_type_count)`, or
    /// [`ViewType::IGNORE`] to keep the slot out of the pools.
    fn item_view_type(&self, position: usize) -> ViewType {
        let _ = position;
        ViewType::of(0)
    }

    /// Produces a view displaying the item at `position`.
    ///
    /// `convert` is a detached view of the same type scrapped from an earlier
    /// page, if one was available. A recycled view carries no usable binding;
    /// implementations must fully re-bind it before returning.
    fn get_view(&mut self, position: usize, convert: Option<Self::View>) -> Self::View;
}
