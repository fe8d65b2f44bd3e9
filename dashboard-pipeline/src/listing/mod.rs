//! Defect list: rows, filtering, sorting and pagination

mod pagination;
mod view;

pub use pagination::{
    DEFAULT_ITEMS_PER_PAGE, DEFAULT_MAX_VISIBLE_PAGES, ListPaginationStore, PaginationState,
};
pub use view::{ListPage, build_rows, paginate, sort_rows};
