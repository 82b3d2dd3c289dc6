//! Catalog paging (12 books per page)

pub const PAGE_SIZE: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-indexed, clamped to `[1, total_pages]`
    pub page: i64,
    pub total_pages: i64,
    /// SQL OFFSET for `page`
    pub offset: i64,
}

/// Clamp `requested_page` into range and compute its offset
///
/// ```
/// use bks_web::pagination::calculate_pagination;
///
/// let p = calculate_pagination(30, 2);
/// assert_eq!((p.page, p.total_pages, p.offset), (2, 3, 12));
///
/// let p = calculate_pagination(30, 99);
/// assert_eq!(p.page, 3);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64) -> Pagination {
    let total_pages = (total_results + PAGE_SIZE - 1) / PAGE_SIZE;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * PAGE_SIZE;

    Pagination {
        page,
        total_pages,
        offset,
    }
}
