//! View model types describing one rendered list screen.
//!
//! Built by [`ListState::compute_viewmodel`](crate::app::ListState::compute_viewmodel)
//! and consumed by whatever presentation layer draws the screen. They carry
//! display-ready data only.

use crate::domain::record::RecordId;
use crate::pipeline::{PageInfo, SortDirection};
use serde::Serialize;

/// Everything needed to draw a list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListViewModel {
    pub header: HeaderInfo,

    /// Rows of the current page, in display order.
    pub rows: Vec<RowItem>,

    /// Index of the selected row within `rows`.
    pub selected_index: usize,

    pub page: PageInfo,

    /// Present when there are no rows to show.
    pub empty_state: Option<EmptyState>,

    /// Why the last load failed. Rows, if any, are from an earlier load.
    pub load_error: Option<String>,

    pub search_bar: SearchBarInfo,

    pub sort: Option<SortIndicator>,
}

/// One row of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowItem {
    pub id: RecordId,

    /// Primary text, from the schema's title field.
    pub title: String,

    /// Secondary text, from the schema's subtitle field.
    pub subtitle: String,

    pub is_selected: bool,

    /// Matched ranges of `title` as `(start, end)` char indices, end exclusive.
    pub highlight_ranges: Vec<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderInfo {
    /// E.g. `"Books (3 of 10)"`.
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmptyStateKind {
    Loading,
    Error,
    NoRecords,
    NoMatches,
}

/// Placeholder shown instead of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub kind: EmptyStateKind,
    pub message: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchBarInfo {
    pub query: String,
    /// Number of filters currently narrowing the list.
    pub active_filters: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortIndicator {
    pub key: String,
    pub direction: SortDirection,
}
