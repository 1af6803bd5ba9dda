//! Fixed-size paging over a derived view.

use serde::{Deserialize, Serialize};

/// Position of a page within a paginated sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Zero-based index of the page actually returned (after clamping).
    pub page: usize,
    /// Number of pages; always at least one.
    pub page_count: usize,
    /// Requested page size; zero means "everything on one page".
    pub page_size: usize,
    pub total_items: usize,
}

impl PageInfo {
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page + 1 < self.page_count
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 0
    }
}

/// Offset of a page's first row and the number of leading rows to keep
/// through its last, before clamping to the item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: usize,
    pub keep_count: usize,
}

impl PageWindow {
    #[must_use]
    pub const fn new(page: usize, page_size: usize) -> Self {
        let offset = page.saturating_mul(page_size);
        Self {
            offset,
            keep_count: offset.saturating_add(page_size),
        }
    }
}

/// Returns the slice for `page` and its [`PageInfo`].
///
/// Pages past the end are clamped to the last page.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> (&[T], PageInfo) {
    let total_items = items.len();

    if page_size == 0 {
        return (
            items,
            PageInfo {
                page: 0,
                page_count: 1,
                page_size,
                total_items,
            },
        );
    }

    let page_count = total_items.div_ceil(page_size).max(1);
    let page = page.min(page_count - 1);
    let window = PageWindow::new(page, page_size);
    let start = window.offset.min(total_items);
    let end = window.keep_count.min(total_items);

    (
        &items[start..end],
        PageInfo {
            page,
            page_count,
            page_size,
            total_items,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_pages() {
        let items: Vec<u32> = (1..=7).collect();
        let (slice, info) = paginate(&items, 1, 3);
        assert_eq!(slice, &[4, 5, 6]);
        assert_eq!(info.page_count, 3);
        assert!(info.has_next());
        assert!(info.has_previous());

        let (slice, info) = paginate(&items, 2, 3);
        assert_eq!(slice, &[7]);
        assert!(!info.has_next());
    }

    #[test]
    fn clamps_past_the_end() {
        let items: Vec<u32> = (1..=4).collect();
        let (slice, info) = paginate(&items, 9, 2);
        assert_eq!(slice, &[3, 4]);
        assert_eq!(info.page, 1);
    }

    #[test]
    fn empty_view_has_one_empty_page() {
        let items: Vec<u32> = Vec::new();
        let (slice, info) = paginate(&items, 0, 10);
        assert!(slice.is_empty());
        assert_eq!(info.page_count, 1);
        assert_eq!(info.page, 0);
    }

    #[test]
    fn windows_saturate_instead_of_overflowing() {
        assert_eq!(
            PageWindow::new(2, 10),
            PageWindow {
                offset: 20,
                keep_count: 30,
            }
        );
        assert_eq!(
            PageWindow::new(usize::MAX, 2),
            PageWindow {
                offset: usize::MAX,
                keep_count: usize::MAX,
            }
        );

        let items: Vec<u32> = (1..=3).collect();
        let (slice, info) = paginate(&items, usize::MAX, usize::MAX);
        assert_eq!(slice, &[1, 2, 3]);
        assert_eq!(info.page, 0);
    }

    #[test]
    fn zero_page_size_disables_paging() {
        let items: Vec<u32> = (1..=25).collect();
        let (slice, info) = paginate(&items, 3, 0);
        assert_eq!(slice.len(), 25);
        assert_eq!(info.page_count, 1);
    }
}
