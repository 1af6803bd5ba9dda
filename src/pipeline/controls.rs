//! User-adjustable parameters driving view derivation.

use crate::domain::error::FolioError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Filter value that disables a filter dimension.
pub const FILTER_ALL: &str = "all";

/// Sort order of the active sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl FromStr for SortDirection {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(FolioError::Config(format!("unknown sort direction: {other}"))),
        }
    }
}

/// Active sort key and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }
}

/// Search query, filters, sort and page of one list screen.
///
/// Every setter that changes which records are visible or their order resets
/// the page to the first one, so the user never lands on a page past the end
/// of a shrunken result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Controls {
    pub search_query: String,
    pub active_filters: BTreeMap<String, String>,
    pub sort: Option<SortState>,
    pub page: usize,
}

impl Controls {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sort(mut self, key: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(SortState::new(key, direction));
        self
    }

    #[must_use]
    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_filter(name, value);
        self
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.page = 0;
    }

    /// Selects a filter value. Selecting [`FILTER_ALL`] removes the filter.
    pub fn set_filter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if value == FILTER_ALL {
            self.active_filters.remove(&name);
        } else {
            self.active_filters.insert(name, value);
        }
        self.page = 0;
    }

    pub fn clear_filters(&mut self) {
        self.active_filters.clear();
        self.page = 0;
    }

    /// Flips direction if `key` is already active, otherwise activates `key`
    /// ascending.
    pub fn toggle_sort(&mut self, key: &str) {
        self.sort = match self.sort.take() {
            Some(current) if current.key == key => Some(SortState {
                direction: current.direction.flipped(),
                ..current
            }),
            _ => Some(SortState::new(key, SortDirection::Ascending)),
        };
        self.page = 0;
    }

    /// Number of filters that currently narrow the view.
    #[must_use]
    pub fn active_filter_count(&self) -> usize {
        self.active_filters
            .values()
            .filter(|value| value.as_str() != FILTER_ALL)
            .count()
    }
}
