//! Application layer: screen state, events and the action executor.
//!
//! Data flows one way:
//!
//! ```text
//! User input ─► Event ─► handle_event ─► ListState ─► compute_viewmodel
//!                  ▲            │
//!                  │         Actions
//!                  │            ▼
//!                  └──── ListController ──► RemoteDataService
//!                     (completion events)
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effects requested by the handler
//! - [`controller`]: Async executor feeding remote outcomes back as events
//! - [`handler`]: Event processing and state transitions
//! - [`phase`]: Load phase state machine
//! - [`reconcile`]: Applies confirmed mutations to the collection
//! - [`state`]: Screen state and view model computation
//!
//! # Example
//!
//! ```
//! use folio::app::{handle_event, Action, Event, ListState};
//! use folio::domain::EntityKind;
//! use folio::pipeline::SearchMode;
//!
//! let mut state = ListState::new(EntityKind::Book, 20, SearchMode::Substring);
//! let (_render, actions) = handle_event(&mut state, &Event::RefreshRequested)?;
//! assert!(matches!(actions[0], Action::Fetch { .. }));
//! # Ok::<(), folio::FolioError>(())
//! ```

pub mod actions;
pub mod controller;
pub mod handler;
pub mod phase;
pub mod reconcile;
pub mod state;

pub use actions::{
    Action, FetchToken, MutationRequest, Notification, NotificationLevel, ServiceFailure,
};
pub use controller::ListController;
pub use handler::{handle_event, Event, MutationResult};
pub use phase::LoadPhase;
pub use reconcile::{reconcile, Mutation, Reconciled};
pub use state::ListState;
