//! Screen state and view model computation.
//!
//! [`ListState`] is the single owner of everything one admin screen knows:
//! the authoritative collection, the user's controls, the derived view and
//! the load phase. The collection only changes when a fetch is accepted or a
//! confirmed mutation is reconciled; the view is recomputed after either.

use super::actions::FetchToken;
use super::phase::LoadPhase;
use super::reconcile::{reconcile, Mutation, Reconciled};
use crate::domain::error::{FolioError, Result};
use crate::domain::record::{Record, RecordId};
use crate::domain::schema::{EntityKind, EntitySchema};
use crate::pipeline::search::highlight_ranges;
use crate::pipeline::{derive_view, Controls, PageInfo, SearchMode, ViewState};
use crate::view::{
    EmptyState, EmptyStateKind, HeaderInfo, ListViewModel, RowItem, SearchBarInfo, SortIndicator,
};

/// State of one list screen.
#[derive(Debug, Clone)]
pub struct ListState {
    pub kind: EntityKind,
    pub schema: EntitySchema,

    /// Authoritative records as last confirmed by the service.
    pub collection: Vec<Record>,

    pub controls: Controls,

    /// Derived from `collection` and `controls`; never edited directly.
    pub view: ViewState,

    pub phase: LoadPhase,

    /// Selected row within the current page.
    pub selected_index: usize,

    /// Rows per page; zero shows everything on one page.
    pub page_size: usize,

    pub search_mode: SearchMode,

    issued_fetches: u64,
    awaited_fetch: Option<FetchToken>,

    /// Mutations confirmed while `awaited_fetch` is in flight. Replayed onto
    /// its records, which may predate them.
    confirmed_in_flight: Vec<Mutation>,
}

impl ListState {
    #[must_use]
    pub fn new(kind: EntityKind, page_size: usize, search_mode: SearchMode) -> Self {
        Self {
            kind,
            schema: kind.schema(),
            collection: Vec::new(),
            controls: Controls::new(),
            view: ViewState::default(),
            phase: LoadPhase::Idle,
            selected_index: 0,
            page_size,
            search_mode,
            issued_fetches: 0,
            awaited_fetch: None,
            confirmed_in_flight: Vec::new(),
        }
    }

    /// Starts a fetch and returns its token. Any earlier fetch still in
    /// flight becomes stale.
    pub fn begin_fetch(&mut self) -> FetchToken {
        self.issued_fetches += 1;
        let token = FetchToken::new(self.issued_fetches);
        self.awaited_fetch = Some(token);
        self.confirmed_in_flight.clear();
        self.phase = LoadPhase::Loading;
        tracing::debug!(kind = %self.kind, token = token.value(), "fetch started");
        token
    }

    /// Accepts the outcome of the fetch identified by `token`.
    ///
    /// Returns `false` and changes nothing when `token` is not the most
    /// recently issued one. A failed fetch keeps the previous collection.
    /// Mutations confirmed while the fetch was in flight are reapplied to the
    /// fetched records, so a response read before a write cannot undo it.
    pub fn finish_fetch(&mut self, token: FetchToken, result: std::result::Result<Vec<Record>, String>) -> bool {
        if self.awaited_fetch != Some(token) {
            tracing::debug!(
                kind = %self.kind,
                token = token.value(),
                awaited = ?self.awaited_fetch.map(FetchToken::value),
                "discarding stale fetch response"
            );
            return false;
        }
        self.awaited_fetch = None;
        let replay = std::mem::take(&mut self.confirmed_in_flight);

        match result {
            Ok(records) => {
                tracing::debug!(kind = %self.kind, count = records.len(), replayed = replay.len(), "fetch accepted");
                self.collection = records;
                for mutation in &replay {
                    reconcile(&mut self.collection, mutation);
                }
                self.phase = LoadPhase::Ready;
                self.recompute();
            }
            Err(message) => {
                tracing::warn!(kind = %self.kind, error = %message, "fetch failed");
                self.phase = LoadPhase::Error(message);
            }
        }
        true
    }

    /// Re-derives the view and keeps page and selection in bounds.
    pub fn recompute(&mut self) {
        self.view = derive_view(&self.collection, &self.controls, &self.schema, self.search_mode);

        let (rows, info) = self.view.page(self.controls.page, self.page_size);
        self.controls.page = info.page;
        self.selected_index = self.selected_index.min(rows.len().saturating_sub(1));
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.controls.set_search(query);
        self.selected_index = 0;
        self.recompute();
    }

    pub fn set_filter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.controls.set_filter(name, value);
        self.selected_index = 0;
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        self.controls.clear_filters();
        self.selected_index = 0;
        self.recompute();
    }

    /// Sorts by `key`, flipping direction if it is already the active key.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::UnknownSortKey`] when the schema has no such key;
    /// the controls are left unchanged.
    pub fn toggle_sort(&mut self, key: &str) -> Result<()> {
        if self.schema.sort_field(key).is_none() {
            return Err(FolioError::UnknownSortKey(key.to_string()));
        }
        self.controls.toggle_sort(key);
        self.selected_index = 0;
        self.recompute();
        Ok(())
    }

    /// Jumps to `page`, clamped to the last page.
    pub fn set_page(&mut self, page: usize) {
        self.controls.page = page;
        self.selected_index = 0;
        self.recompute();
    }

    #[must_use]
    pub fn current_page(&self) -> (&[Record], PageInfo) {
        self.view.page(self.controls.page, self.page_size)
    }

    #[must_use]
    pub fn selected_record(&self) -> Option<&Record> {
        self.current_page().0.get(self.selected_index)
    }

    /// Whether the collection holds a record with `id`.
    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.collection.iter().any(|record| record.has_id(id))
    }

    #[must_use]
    pub fn find(&self, id: &RecordId) -> Option<&Record> {
        self.collection.iter().find(|record| record.has_id(id))
    }

    /// Moves selection down one row, wrapping to the top of the page.
    pub fn move_selection_down(&mut self) {
        let rows = self.current_page().0.len();
        if rows == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % rows;
    }

    /// Moves selection up one row, wrapping to the bottom of the page.
    pub fn move_selection_up(&mut self) {
        let rows = self.current_page().0.len();
        if rows == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = rows - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Reconciles a confirmed mutation and refreshes the view if it applied.
    pub fn apply_mutation(&mut self, mutation: &Mutation) -> Reconciled {
        if self.awaited_fetch.is_some() {
            self.confirmed_in_flight.push(mutation.clone());
        }
        let outcome = reconcile(&mut self.collection, mutation);
        if outcome == Reconciled::Applied {
            self.recompute();
        }
        outcome
    }

    /// Builds the view model for the current page.
    #[must_use]
    pub fn compute_viewmodel(&self) -> ListViewModel {
        let (page_records, page) = self.current_page();

        let rows: Vec<RowItem> = page_records
            .iter()
            .enumerate()
            .filter_map(|(idx, record)| {
                let id = record.id()?;
                Some(self.compute_row(id, record, idx == self.selected_index))
            })
            .collect();

        ListViewModel {
            header: HeaderInfo {
                title: format!(
                    "{} ({} of {})",
                    self.kind.label(),
                    self.view.matched(),
                    self.collection.len()
                ),
            },
            empty_state: if rows.is_empty() {
                Some(self.compute_empty_state())
            } else {
                None
            },
            selected_index: if rows.is_empty() { 0 } else { self.selected_index },
            load_error: self.phase.error_message().map(str::to_string),
            rows,
            page,
            search_bar: SearchBarInfo {
                query: self.controls.search_query.clone(),
                active_filters: self.controls.active_filter_count(),
            },
            sort: self.controls.sort.as_ref().map(|state| SortIndicator {
                key: state.key.clone(),
                direction: state.direction,
            }),
        }
    }

    fn compute_row(&self, id: RecordId, record: &Record, is_selected: bool) -> RowItem {
        let title = record.text(&self.schema.title_field).into_owned();
        let subtitle = self
            .schema
            .subtitle_field
            .as_deref()
            .map(|field| record.text(field).into_owned())
            .unwrap_or_default();
        let highlight_ranges = highlight_ranges(&title, &self.controls.search_query, self.search_mode);

        RowItem {
            id,
            title,
            subtitle,
            is_selected,
            highlight_ranges,
        }
    }

    fn compute_empty_state(&self) -> EmptyState {
        let label = self.kind.label();
        match &self.phase {
            LoadPhase::Idle | LoadPhase::Loading if self.collection.is_empty() => EmptyState {
                kind: EmptyStateKind::Loading,
                message: format!("Loading {label}"),
                subtitle: String::new(),
            },
            LoadPhase::Error(message) if self.collection.is_empty() => EmptyState {
                kind: EmptyStateKind::Error,
                message: format!("Could not load {label}"),
                subtitle: message.clone(),
            },
            _ if self.collection.is_empty() => EmptyState {
                kind: EmptyStateKind::NoRecords,
                message: format!("No {label} yet"),
                subtitle: "Create one to get started".to_string(),
            },
            _ => EmptyState {
                kind: EmptyStateKind::NoMatches,
                message: "No matches".to_string(),
                subtitle: "Try a different search or clear the filters".to_string(),
            },
        }
    }
}
