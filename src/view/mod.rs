//! Presentation-facing types.
//!
//! - [`viewmodel`]: Display-ready snapshot of a list screen

pub mod viewmodel;

pub use viewmodel::{
    EmptyState, EmptyStateKind, HeaderInfo, ListViewModel, RowItem, SearchBarInfo, SortIndicator,
};
