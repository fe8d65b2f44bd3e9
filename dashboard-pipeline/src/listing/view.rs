use super::pagination::ListPaginationStore;
use serde::Serialize;
use shared::models::{DefectDetail, DefectListItem, ListFilter, SortColumn, SortDirection};

/// One rendered page of the defect list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub rows: Vec<DefectListItem>,
    /// Effective (clamped) page
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub visible_pages: Vec<usize>,
}

/// One row per damage of each detail, keeping only rows that match `filter`
pub fn build_rows(details: &[DefectDetail], filter: &ListFilter) -> Vec<DefectListItem> {
    details
        .iter()
        .flat_map(DefectListItem::rows_for)
        .filter(|row| filter.matches(row))
        .collect()
}

/// Stable sort; `None` keeps the input order
pub fn sort_rows(rows: &mut [DefectListItem], column: Option<SortColumn>, direction: SortDirection) {
    if let Some(column) = column {
        rows.sort_by(|a, b| direction.apply(a.compare_by(b, column)));
    }
}

/// Slice the effective page out of already filtered and sorted rows
///
/// `store.total_items()` must already equal `rows.len()`.
pub fn paginate(rows: Vec<DefectListItem>, store: &ListPaginationStore) -> ListPage {
    let range = store.page_range();
    let total_items = rows.len();
    let rows = rows
        .into_iter()
        .skip(range.start)
        .take(range.len())
        .collect();

    ListPage {
        rows,
        current_page: store.effective_page(),
        total_pages: store.total_pages(),
        total_items,
        visible_pages: store.compute_visible_page_numbers(),
    }
}
