//! The list pipeline: filter → search → sort, then paginate for display.
//!
//! Every admin screen derives what it shows from two inputs: the authoritative
//! collection and the user's [`Controls`]. [`derive_view`] is a pure function
//! of those inputs, so it can be re-run after every keystroke, filter tap or
//! reconciled mutation without side effects.
//!
//! ```text
//! Collection ──► filter ──► search ──► sort ──► ViewState ──► paginate ──► page
//!                  ▲           ▲         ▲                       ▲
//!                  └───────────┴─── Controls ────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`controls`]: Search query, filters, sort and page
//! - [`filter`]: Categorical predicates (fail closed)
//! - [`search`]: Substring or fuzzy text search and highlight ranges
//! - [`sort`]: Stable, type-aware ordering
//! - [`paginate`]: Fixed-size pages

pub mod controls;
pub mod filter;
pub mod paginate;
pub mod search;
pub mod sort;

pub use controls::{Controls, SortDirection, SortState, FILTER_ALL};
pub use paginate::{paginate, PageInfo, PageWindow};
pub use search::SearchMode;

use crate::domain::record::{Record, RecordId};
use crate::domain::schema::EntitySchema;

/// The derived, displayed ordering and subset of a collection.
///
/// Always a permutation of a subset of the collection it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub records: Vec<Record>,
    /// Size of the collection the view was derived from.
    pub total: usize,
}

impl ViewState {
    /// Number of records that passed filter and search.
    #[must_use]
    pub fn matched(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns one page of the view.
    #[must_use]
    pub fn page(&self, page: usize, page_size: usize) -> (&[Record], PageInfo) {
        paginate(&self.records, page, page_size)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<RecordId> {
        self.records.iter().filter_map(Record::id).collect()
    }
}

/// Derives the view of `collection` under `controls`.
///
/// A sort key the schema does not define leaves the filtered order untouched.
#[must_use]
pub fn derive_view(
    collection: &[Record],
    controls: &Controls,
    schema: &EntitySchema,
    mode: SearchMode,
) -> ViewState {
    let _span = tracing::debug_span!("derive_view",
        kind = %schema.kind,
        total = collection.len(),
        query_len = controls.search_query.len(),
        filters = controls.active_filter_count(),
        sort = ?controls.sort
    )
    .entered();

    let filtered = filter::filter(collection, &controls.active_filters, schema);
    let searched = search::search(filtered, &controls.search_query, &schema.search_fields, mode);

    let ordered = match &controls.sort {
        Some(state) => match schema.sort_field(&state.key) {
            Some(field) => sort::sort(searched, field, state.direction),
            None => {
                tracing::warn!(key = %state.key, "ignoring unknown sort key");
                searched
            }
        },
        None => searched,
    };

    let view = ViewState {
        records: ordered.into_iter().cloned().collect(),
        total: collection.len(),
    };

    tracing::debug!(matched = view.matched(), "view derived");
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityKind;
    use serde_json::json;
    use std::collections::HashSet;

    fn books() -> Vec<Record> {
        serde_json::from_value(json!([
            {"id": 1, "title": "Zeta", "author": "Ann", "category": "scifi", "viewCount": 5},
            {"id": 2, "title": "Alpha", "author": "Bob", "category": "poetry", "viewCount": 9},
            {"id": 3, "title": "Gamma", "author": "Ann", "category": "scifi", "viewCount": 1},
            {"id": 4, "title": "Beta", "author": "Cid", "category": "scifi", "viewCount": 3}
        ]))
        .unwrap()
    }

    fn id_strings(view: &ViewState) -> Vec<String> {
        view.ids().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn composes_filter_search_and_sort() {
        let mut controls = Controls::new()
            .with_filter("category", "scifi")
            .with_sort("viewCount", SortDirection::Descending);
        controls.search_query = "ann".into();

        let view = derive_view(&books(), &controls, &EntityKind::Book.schema(), SearchMode::Substring);
        assert_eq!(id_strings(&view), vec!["1", "3"]);
        assert_eq!(view.total, 4);
        assert_eq!(view.matched(), 2);
    }

    #[test]
    fn default_controls_keep_collection_order() {
        let books = books();
        let view = derive_view(&books, &Controls::new(), &EntityKind::Book.schema(), SearchMode::Substring);
        assert_eq!(view.records, books);
    }

    #[test]
    fn unknown_sort_key_keeps_order() {
        let controls = Controls::new().with_sort("publisher", SortDirection::Ascending);
        let view = derive_view(&books(), &controls, &EntityKind::Book.schema(), SearchMode::Substring);
        assert_eq!(id_strings(&view), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn view_is_a_duplicate_free_subset_of_the_collection() {
        let books = books();
        let schema = EntityKind::Book.schema();
        let queries = ["", "a", "zeta", "ann"];
        let filters = ["all", "scifi", "poetry"];
        for query in queries {
            for category in filters {
                let mut controls = Controls::new()
                    .with_filter("category", category)
                    .with_sort("title", SortDirection::Ascending);
                controls.search_query = query.into();
                let view = derive_view(&books, &controls, &schema, SearchMode::Substring);

                let unique: HashSet<_> = view.ids().into_iter().collect();
                assert_eq!(unique.len(), view.matched());
                assert!(view.records.iter().all(|r| books.contains(r)));
            }
        }
    }

    #[test]
    fn derive_view_is_repeatable() {
        let books = books();
        let controls = Controls::new().with_sort("title", SortDirection::Ascending);
        let schema = EntityKind::Book.schema();
        let first = derive_view(&books, &controls, &schema, SearchMode::Substring);
        let second = derive_view(&books, &controls, &schema, SearchMode::Substring);
        assert_eq!(first, second);
        assert_eq!(id_strings(&first), vec!["2", "4", "3", "1"]);
    }

    #[test]
    fn pages_the_view() {
        let view = derive_view(&books(), &Controls::new(), &EntityKind::Book.schema(), SearchMode::Substring);
        let (page, info) = view.page(1, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(info.page_count, 2);
    }
}
