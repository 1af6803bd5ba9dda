//! Folio: the list management engine behind the reading platform's admin
//! screens.
//!
//! Every admin screen (books, users, credit packages) shows a collection
//! fetched from a remote service, narrowed by filters and a search query,
//! ordered by a sortable column and split into pages. Edits go to the service
//! first and are only reflected locally once confirmed.

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Event handling, actions, controller              │
//! │  - Mutation reconciliation                          │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Pipeline      │   │ Services      │   │ View          │
//! │ (pipeline/)   │   │ (service/)    │   │ (view/)       │
//! │ - Filter      │   │ - Trait       │   │ - View model  │
//! │ - Search      │   │ - JSON files  │   │               │
//! │ - Sort, pages │   │ - In-memory   │   │               │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain & Infrastructure                            │
//! │  - Records, schemas, validation, errors (domain/)   │
//! │  - Environment, random source, paths                │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - OpenTelemetry spans exported to a local file     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Screen state, events, actions and the async controller
//! - [`domain`]: Records, entity schemas, validation and errors
//! - [`infrastructure`]: Injected environment and randomness, path helpers
//! - [`pipeline`]: Filter → search → sort → paginate
//! - [`service`]: Remote data service trait and implementations
//! - [`view`]: View model consumed by the presentation layer
//! - [`observability`]: OpenTelemetry tracing to a rotating file
//!
//! # Configuration
//!
//! ```toml
//! data_dir = "~/.local/share/folio"
//! trace_level = "debug"
//! page_size = 25
//! search_mode = "fuzzy"
//! ```
//!
//! # Example
//!
//! ```
//! use folio::app::{ListController, Event};
//! use folio::domain::{EntityKind, Record};
//! use folio::infrastructure::ThreadRandom;
//! use folio::service::MemoryService;
//! use folio::{initialize, Config};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let books: Vec<Record> = serde_json::from_value(json!([
//!     {"id": 1, "title": "Zeta", "author": "Ann"},
//!     {"id": 2, "title": "Alpha", "author": "Bob"},
//! ]))?;
//! let service = MemoryService::new().with_records(EntityKind::Book, books);
//!
//! let state = initialize(&Config::default(), EntityKind::Book);
//! let mut screen = ListController::new(state, service, Arc::new(ThreadRandom));
//! screen.refresh().await?;
//! screen.dispatch(Event::SortTapped("title".into())).await?;
//!
//! let vm = screen.view_model();
//! assert_eq!(vm.header.title, "Books (2 of 2)");
//! assert_eq!(vm.rows[0].title, "Alpha");
//! # Ok::<(), folio::FolioError>(())
//! # }).unwrap();
//! ```

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod pipeline;
pub mod service;
pub mod view;

pub use app::{handle_event, Action, Event, ListController, ListState};
pub use domain::{EntityKind, FolioError, Record, RecordId, Result};
pub use pipeline::SearchMode;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Engine configuration.
///
/// Built from a string map (e.g. key/value settings handed over by a host
/// application) with [`Config::from_map`], or from a TOML file with
/// [`Config::load`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for service documents and trace output.
    ///
    /// A leading `~` is expanded. Default: platform data directory, see
    /// [`infrastructure::default_data_dir`].
    pub data_dir: Option<PathBuf>,

    /// `EnvFilter` directive for exported spans. Default: `"info"`
    pub trace_level: Option<String>,

    /// Rows per page; `0` disables paging. Default: 20
    pub page_size: usize,

    /// `substring` (default) or `fuzzy`.
    pub search_mode: SearchMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            trace_level: None,
            page_size: DEFAULT_PAGE_SIZE,
            search_mode: SearchMode::default(),
        }
    }
}

impl Config {
    /// Parses configuration from a string map, falling back to defaults for
    /// missing or malformed values.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use folio::{Config, SearchMode};
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("page_size".to_string(), "50".to_string());
    /// map.insert("search_mode".to_string(), "fuzzy".to_string());
    /// map.insert("trace_level".to_string(), "debug".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.page_size, 50);
    /// assert_eq!(config.search_mode, SearchMode::Fuzzy);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let page_size = map
            .get("page_size")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let search_mode = map.get("search_mode").map_or_else(SearchMode::default, |s| {
            s.parse().unwrap_or_else(|e| {
                tracing::debug!(value = %s, error = %e, "invalid search mode, using default");
                SearchMode::default()
            })
        });

        Self {
            data_dir: map
                .get("data_dir")
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(infrastructure::expand_home),
            trace_level: map.get("trace_level").cloned(),
            page_size,
            search_mode,
        }
    }

    /// Parses a TOML document. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Config`] if the document is not valid TOML or a
    /// value has the wrong type.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(contents)
            .map_err(|e| FolioError::Config(format!("failed to parse config TOML: {e}")))?;
        config.data_dir = config
            .data_dir
            .map(|dir| dir.to_str().map_or(dir.clone(), infrastructure::expand_home));
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or
    /// [`FolioError::Config`] if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }
}

/// Creates the state for one list screen, ready for its first
/// [`Event::RefreshRequested`].
///
/// Tracing is installed separately with [`observability::init_tracing`].
#[must_use]
pub fn initialize(config: &Config, kind: EntityKind) -> ListState {
    tracing::debug!(kind = %kind, page_size = config.page_size, search_mode = ?config.search_mode, "initializing list screen");
    ListState::new(kind, config.page_size, config.search_mode)
}
