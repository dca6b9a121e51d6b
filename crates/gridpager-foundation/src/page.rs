/// A composite page view: the unit of attach/detach for the pager.
///
/// A page declares its grid dimensions and holds up to
/// `column_count() * row_count()` child slot views while active.
pub trait GridPage {
    /// Slot view handle; must match the adapter's `View` type.
    type View;

    fn column_count(&self) -> usize;

    fn row_count(&self) -> usize;

    /// Attaches a slot view as the next child of this page.
    fn add_slot(&mut self, view: Self::View);

    /// Detaches and returns every child slot, in attach order.
    fn take_slots(&mut self) -> Vec<Self::View>;

    /// Number of currently attached slots.
    fn slot_count(&self) -> usize;
}

/// Inflates fresh page views for the pager's page pool.
pub trait PageViewFactory {
    type Page: GridPage;

    fn inflate_page(&mut self) -> Self::Page;
}
