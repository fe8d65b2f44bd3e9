use serde::Serialize;
use shared::error::{AppError, AppResult};
use shared::models::{ListFilter, SortColumn, SortDirection};
use std::ops::Range;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 5;
pub const DEFAULT_MAX_VISIBLE_PAGES: usize = 5;

/// Numeric pagination fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    /// As requested; may be out of range, see [`ListPaginationStore::effective_page`]
    pub current_page: i64,
    pub items_per_page: usize,
    pub total_items: usize,
    pub max_visible_pages: usize,
}

/// Sort and page state of the defect list
///
/// Owns only numbers, sort keys and the last applied filter, never the rows
/// being paginated. `set_current_page` stores whatever it is given;
/// `set_total_items` and `set_items_per_page` clamp the stored page back into
/// range. A different filter, like a different sort, starts over at page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPaginationStore {
    state: PaginationState,
    sort_column: Option<SortColumn>,
    sort_direction: SortDirection,
    applied_filter: ListFilter,
}

impl ListPaginationStore {
    pub fn new(items_per_page: usize, max_visible_pages: usize) -> AppResult<Self> {
        let mut store = Self::default();
        store.set_items_per_page(items_per_page)?;
        store.set_max_visible_pages(max_visible_pages)?;
        Ok(store)
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    pub fn current_page(&self) -> i64 {
        self.state.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.state.items_per_page
    }

    pub fn total_items(&self) -> usize {
        self.state.total_items
    }

    pub fn max_visible_pages(&self) -> usize {
        self.state.max_visible_pages
    }

    pub fn sort_column(&self) -> Option<SortColumn> {
        self.sort_column
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn applied_filter(&self) -> &ListFilter {
        &self.applied_filter
    }

    // ========== Mutations ==========

    /// Permissive: any page is stored as is
    pub fn set_current_page(&mut self, page: i64) {
        self.state.current_page = page;
    }

    /// Update the total and pull the current page back into range
    pub fn set_total_items(&mut self, total: usize) {
        self.state.total_items = total;
        self.clamp_current_page();
    }

    pub fn set_items_per_page(&mut self, items_per_page: usize) -> AppResult<()> {
        if items_per_page == 0 {
            return Err(AppError::validation("items_per_page must be positive")
                .with_detail("field", "items_per_page"));
        }
        self.state.items_per_page = items_per_page;
        self.clamp_current_page();
        Ok(())
    }

    pub fn set_max_visible_pages(&mut self, max_visible_pages: usize) -> AppResult<()> {
        if max_visible_pages == 0 {
            return Err(AppError::validation("max_visible_pages must be positive")
                .with_detail("field", "max_visible_pages"));
        }
        self.state.max_visible_pages = max_visible_pages;
        Ok(())
    }

    /// Same column flips the direction, a new column sorts ascending; both
    /// go back to page 1
    pub fn toggle_sort(&mut self, column: SortColumn) {
        if self.sort_column == Some(column) {
            self.sort_direction = self.sort_direction.toggle();
        } else {
            self.sort_column = Some(column);
            self.sort_direction = SortDirection::Asc;
        }
        self.state.current_page = 1;
    }

    pub fn set_sort(&mut self, column: Option<SortColumn>, direction: SortDirection) {
        self.sort_column = column;
        self.sort_direction = direction;
        self.state.current_page = 1;
    }

    /// Record the filter the next page is built with; true (and back to
    /// page 1) when it differs from the previous one
    pub fn apply_filter(&mut self, filter: &ListFilter) -> bool {
        if self.applied_filter == *filter {
            return false;
        }
        self.applied_filter = filter.clone();
        self.state.current_page = 1;
        true
    }

    /// Move forward one page; false when already on the last page
    pub fn next_page(&mut self) -> bool {
        let page = self.effective_page();
        if page < self.total_pages() {
            self.state.current_page = page as i64 + 1;
            true
        } else {
            false
        }
    }

    /// Move back one page; false when already on page 1
    pub fn prev_page(&mut self) -> bool {
        let page = self.effective_page();
        if page > 1 {
            self.state.current_page = page as i64 - 1;
            true
        } else {
            false
        }
    }

    fn clamp_current_page(&mut self) {
        self.state.current_page = self.effective_page() as i64;
    }

    // ========== Derived values ==========

    /// `ceil(total_items / items_per_page)`
    pub fn total_pages(&self) -> usize {
        self.state.total_items.div_ceil(self.state.items_per_page)
    }

    /// Current page clamped to `[1, max(total_pages, 1)]`
    pub fn effective_page(&self) -> usize {
        let last = self.total_pages().max(1) as i64;
        self.state.current_page.clamp(1, last) as usize
    }

    /// Index range of the effective page within `total_items`
    pub fn page_range(&self) -> Range<usize> {
        let start = (self.effective_page() - 1) * self.state.items_per_page;
        let start = start.min(self.state.total_items);
        let end = (start + self.state.items_per_page).min(self.state.total_items);
        start..end
    }

    /// Page numbers for the page bar, a window of at most
    /// `max_visible_pages` centered on the effective page
    pub fn compute_visible_page_numbers(&self) -> Vec<usize> {
        let total = self.total_pages();
        let max = self.state.max_visible_pages;
        if total <= max {
            return (1..=total).collect();
        }

        let current = self.effective_page();
        let mut start = current.saturating_sub(max / 2).max(1);
        let end = (start + max - 1).min(total);
        if end + 1 - start < max {
            start = (end + 1).saturating_sub(max).max(1);
        }
        (start..=end).collect()
    }

    /// Pages exist before the visible window
    pub fn has_leading_ellipsis(&self) -> bool {
        self.compute_visible_page_numbers()
            .first()
            .is_some_and(|first| *first > 1)
    }

    /// Pages exist after the visible window
    pub fn has_trailing_ellipsis(&self) -> bool {
        self.compute_visible_page_numbers()
            .last()
            .is_some_and(|last| *last < self.total_pages())
    }
}

impl Default for ListPaginationStore {
    fn default() -> Self {
        Self {
            state: PaginationState {
                current_page: 1,
                items_per_page: DEFAULT_ITEMS_PER_PAGE,
                total_items: 0,
                max_visible_pages: DEFAULT_MAX_VISIBLE_PAGES,
            },
            sort_column: None,
            sort_direction: SortDirection::Asc,
            applied_filter: ListFilter::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    fn store(total_pages: usize, current: i64) -> ListPaginationStore {
        let mut store = ListPaginationStore::new(10, 5).unwrap();
        store.set_total_items(total_pages * 10);
        store.set_current_page(current);
        store
    }

    #[test]
    fn test_window_centered() {
        assert_eq!(store(20, 10).compute_visible_page_numbers(), vec![8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_window_clamped_at_edges() {
        assert_eq!(store(20, 1).compute_visible_page_numbers(), vec![1, 2, 3, 4, 5]);
        assert_eq!(store(20, 20).compute_visible_page_numbers(), vec![16, 17, 18, 19, 20]);
        assert_eq!(store(20, 19).compute_visible_page_numbers(), vec![16, 17, 18, 19, 20]);
    }

    #[test]
    fn test_few_pages_shows_all() {
        assert_eq!(store(3, 2).compute_visible_page_numbers(), vec![1, 2, 3]);
        assert!(store(0, 1).compute_visible_page_numbers().is_empty());
    }

    #[test]
    fn test_even_window() {
        let mut store = store(20, 10);
        store.set_max_visible_pages(4).unwrap();
        assert_eq!(store.compute_visible_page_numbers(), vec![8, 9, 10, 11]);
    }

    #[test]
    fn test_set_current_page_is_permissive() {
        let mut store = store(3, 1);
        store.set_current_page(42);
        assert_eq!(store.current_page(), 42);
        assert_eq!(store.effective_page(), 3);

        store.set_current_page(-7);
        assert_eq!(store.effective_page(), 1);
    }

    #[test]
    fn test_shrinking_total_clamps_page() {
        let mut store = store(10, 9);
        store.set_total_items(25);
        assert_eq!(store.current_page(), 3);

        store.set_total_items(0);
        assert_eq!(store.current_page(), 1);
        assert_eq!(store.page_range(), 0..0);
    }

    #[test]
    fn test_page_range() {
        let mut store = ListPaginationStore::default();
        store.set_total_items(12);
        assert_eq!(store.page_range(), 0..5);
        store.set_current_page(3);
        assert_eq!(store.page_range(), 10..12);
    }

    #[test]
    fn test_items_per_page_rejects_zero() {
        let mut store = ListPaginationStore::default();
        let err = store.set_items_per_page(0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(store.items_per_page(), DEFAULT_ITEMS_PER_PAGE);
        assert!(ListPaginationStore::new(5, 0).is_err());
    }

    #[test]
    fn test_toggle_sort() {
        let mut store = store(5, 4);
        store.toggle_sort(SortColumn::Severity);
        assert_eq!(store.sort_column(), Some(SortColumn::Severity));
        assert_eq!(store.sort_direction(), SortDirection::Asc);
        assert_eq!(store.current_page(), 1);

        store.toggle_sort(SortColumn::Severity);
        assert_eq!(store.sort_direction(), SortDirection::Desc);

        store.toggle_sort(SortColumn::UpdatedAt);
        assert_eq!(store.sort_column(), Some(SortColumn::UpdatedAt));
        assert_eq!(store.sort_direction(), SortDirection::Asc);
    }

    #[test]
    fn test_changed_filter_resets_page() {
        let mut store = store(5, 3);
        assert!(!store.apply_filter(&ListFilter::default()));
        assert_eq!(store.current_page(), 3);

        let received = ListFilter {
            status: Some(shared::models::ProcessStatus::Received),
            ..Default::default()
        };
        assert!(store.apply_filter(&received));
        assert_eq!(store.current_page(), 1);
        assert_eq!(store.applied_filter(), &received);

        store.set_current_page(2);
        assert!(!store.apply_filter(&received));
        assert_eq!(store.current_page(), 2);

        assert!(store.apply_filter(&ListFilter::default()));
        assert_eq!(store.current_page(), 1);
    }

    #[test]
    fn test_next_prev_and_ellipsis() {
        let mut store = store(20, 1);
        assert!(!store.prev_page());
        assert!(!store.has_leading_ellipsis());
        assert!(store.has_trailing_ellipsis());

        store.set_current_page(20);
        assert!(!store.next_page());
        assert!(store.has_leading_ellipsis());
        assert!(!store.has_trailing_ellipsis());

        assert!(store.prev_page());
        assert_eq!(store.current_page(), 19);
    }
}
