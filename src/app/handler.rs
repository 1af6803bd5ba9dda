//! Event handling and state transitions for a list screen.
//!
//! [`handle_event`] is pure: it mutates [`ListState`] and returns the
//! [`Action`]s the caller must perform, plus whether the screen needs a
//! redraw. Remote calls never happen here; their outcomes come back as
//! [`Event::FetchCompleted`] and [`Event::MutationCompleted`].
//!
//! # Event Types
//!
//! - **Controls**: `SearchChanged`, `SearchCleared`, `FilterSelected`,
//!   `FiltersCleared`, `SortTapped`, `PageChanged`
//! - **Navigation**: `KeyUp`, `KeyDown`
//! - **Loading**: `RefreshRequested`, `FetchCompleted`
//! - **Mutations**: `FormSubmitted`, `DeleteRequested`, `ToggleRequested`,
//!   `MutationCompleted`

use super::actions::{Action, FetchToken, MutationRequest, Notification, ServiceFailure};
use super::phase::LoadPhase;
use super::reconcile::{Mutation, Reconciled};
use super::state::ListState;
use crate::domain::error::Result;
use crate::domain::record::{value_text, Record, RecordId};
use crate::domain::validation::{validate, FormInput, FormIntent};
use serde_json::Value;

/// Outcome of a remote mutation as reported back to the handler.
pub type MutationResult = std::result::Result<Mutation, ServiceFailure>;

/// Things that happen to a list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The search box text changed.
    SearchChanged(String),
    /// The search box was cleared.
    SearchCleared,
    /// A filter control changed; selecting `"all"` removes the filter.
    FilterSelected { name: String, value: String },
    /// All filters were reset.
    FiltersCleared,
    /// A column header was tapped.
    SortTapped(String),
    /// The pager moved to a zero-based page.
    PageChanged(usize),
    /// Move selection up.
    KeyUp,
    /// Move selection down.
    KeyDown,
    /// Load or reload the collection.
    RefreshRequested,
    /// A fetch finished, successfully or not.
    FetchCompleted {
        token: FetchToken,
        result: std::result::Result<Vec<Record>, ServiceFailure>,
    },
    /// A create (`target: None`) or edit modal was submitted.
    FormSubmitted {
        form: FormInput,
        target: Option<RecordId>,
    },
    /// Delete was confirmed for a row.
    DeleteRequested(RecordId),
    /// Flip a boolean field of one record, e.g. `isActive`.
    ToggleRequested { id: RecordId, field: String },
    /// A remote write finished, successfully or not.
    MutationCompleted {
        request: MutationRequest,
        result: MutationResult,
    },
}

impl Event {
    /// Variant name, for logs. Payloads may hold form contents and stay out.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SearchChanged(_) => "SearchChanged",
            Self::SearchCleared => "SearchCleared",
            Self::FilterSelected { .. } => "FilterSelected",
            Self::FiltersCleared => "FiltersCleared",
            Self::SortTapped(_) => "SortTapped",
            Self::PageChanged(_) => "PageChanged",
            Self::KeyUp => "KeyUp",
            Self::KeyDown => "KeyDown",
            Self::RefreshRequested => "RefreshRequested",
            Self::FetchCompleted { .. } => "FetchCompleted",
            Self::FormSubmitted { .. } => "FormSubmitted",
            Self::DeleteRequested(_) => "DeleteRequested",
            Self::ToggleRequested { .. } => "ToggleRequested",
            Self::MutationCompleted { .. } => "MutationCompleted",
        }
    }
}

/// Processes an event, mutating `state`, and returns `(needs_render, actions)`.
///
/// # Errors
///
/// Returns [`FolioError::UnknownSortKey`](crate::FolioError::UnknownSortKey)
/// when a sort is requested on a key the screen's schema does not define.
pub fn handle_event(state: &mut ListState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", kind = %state.kind, event_type = event.name()).entered();

    match event {
        Event::SearchChanged(query) => {
            state.set_search(query.clone());
            Ok((true, vec![]))
        }
        Event::SearchCleared => {
            if state.controls.search_query.is_empty() {
                return Ok((false, vec![]));
            }
            state.set_search(String::new());
            Ok((true, vec![]))
        }
        Event::FilterSelected { name, value } => {
            state.set_filter(name.clone(), value.clone());
            Ok((true, vec![]))
        }
        Event::FiltersCleared => {
            state.clear_filters();
            Ok((true, vec![]))
        }
        Event::SortTapped(key) => {
            state.toggle_sort(key)?;
            Ok((true, vec![]))
        }
        Event::PageChanged(page) => {
            state.set_page(*page);
            Ok((true, vec![]))
        }
        Event::KeyUp => {
            state.move_selection_up();
            Ok((true, vec![]))
        }
        Event::KeyDown => {
            state.move_selection_down();
            Ok((true, vec![]))
        }
        Event::RefreshRequested => {
            let token = state.begin_fetch();
            Ok((true, vec![Action::Fetch { token }]))
        }
        Event::FetchCompleted { token, result } => {
            let accepted = state.finish_fetch(*token, result.clone().map_err(|failure| failure.to_string()));
            let actions = match result {
                Err(failure) if accepted => {
                    let message = format!("Failed to load {}: {failure}", state.kind.label().to_lowercase());
                    vec![Action::Notify(Notification::error(message))]
                }
                _ => vec![],
            };
            Ok((accepted, actions))
        }
        Event::FormSubmitted { form, target } => Ok(handle_form(state, form, target.as_ref())),
        Event::DeleteRequested(id) => {
            if let Some(refused) = refuse_mutation(state, Some(id), "delete") {
                return Ok(refused);
            }
            let request = MutationRequest::Delete { id: id.clone() };
            Ok((false, vec![Action::Submit { request }]))
        }
        Event::ToggleRequested { id, field } => {
            if let Some(refused) = refuse_mutation(state, Some(id), "update") {
                return Ok(refused);
            }
            let current = state
                .find(id)
                .and_then(|record| record.get(field))
                .is_some_and(is_truthy);
            let request = MutationRequest::SetField {
                id: id.clone(),
                field: field.clone(),
                value: Value::Bool(!current),
            };
            Ok((false, vec![Action::Submit { request }]))
        }
        Event::MutationCompleted { request, result } => Ok(handle_completion(state, request, result)),
    }
}

/// Returns the handler outcome for a mutation request that must not reach
/// the service, or `None` when it may proceed.
///
/// Requests are refused with an error notification until the screen has
/// loaded. Requests for records the screen does not hold are dropped
/// silently.
fn refuse_mutation(state: &ListState, target: Option<&RecordId>, verb: &str) -> Option<(bool, Vec<Action>)> {
    let noun = state.kind.noun().to_lowercase();
    let label = state.kind.label().to_lowercase();
    let reason = match &state.phase {
        LoadPhase::Ready => None,
        LoadPhase::Loading => Some(format!("{label} are still loading")),
        LoadPhase::Idle => Some(format!("{label} have not been loaded")),
        LoadPhase::Error(_) => Some(format!("{label} failed to load; refresh first")),
    };
    if let Some(reason) = reason {
        tracing::debug!(phase = ?state.phase, verb, "refusing mutation request, screen not ready");
        let message = format!("Cannot {verb} {noun}: {reason}");
        return Some((true, vec![Action::Notify(Notification::error(message))]));
    }

    match target {
        Some(id) if !state.contains(id) => {
            tracing::debug!(id = %id, "ignoring mutation request for unknown record");
            Some((false, vec![]))
        }
        _ => None,
    }
}

fn handle_form(state: &ListState, form: &FormInput, target: Option<&RecordId>) -> (bool, Vec<Action>) {
    let verb = if target.is_some() { "update" } else { "create" };
    if let Some(refused) = refuse_mutation(state, target, verb) {
        return refused;
    }

    let intent = if target.is_some() {
        FormIntent::Update
    } else {
        FormIntent::Create
    };

    match validate(state.kind, form, intent) {
        Ok(fields) => {
            let request = match target {
                Some(id) => MutationRequest::Update {
                    id: id.clone(),
                    fields,
                },
                None => MutationRequest::Create { fields },
            };
            (false, vec![Action::Submit { request }])
        }
        Err(e) => {
            tracing::debug!(field = %e.field, "form rejected locally");
            (true, vec![Action::Notify(Notification::error(e.to_string()))])
        }
    }
}

fn handle_completion(
    state: &mut ListState,
    request: &MutationRequest,
    result: &MutationResult,
) -> (bool, Vec<Action>) {
    let noun = state.kind.noun();

    let mutation = match (request, result) {
        (_, Ok(mutation)) => mutation.clone(),
        (MutationRequest::Delete { id }, Err(ServiceFailure::NotFound(_))) => {
            tracing::debug!(id = %id, "record already gone remotely, treating delete as confirmed");
            Mutation::Deleted(id.clone())
        }
        (_, Err(failure)) => {
            tracing::warn!(verb = request.verb(), target = ?request.target(), error = %failure, "mutation failed");
            let message = format!("Failed to {} {}: {failure}", request.verb(), noun.to_lowercase());
            return (true, vec![Action::Notify(Notification::error(message))]);
        }
    };

    if state.apply_mutation(&mutation) == Reconciled::Stale {
        tracing::debug!(target = ?mutation.target(), "confirmed mutation no longer matches the collection");
    }

    let message = match request {
        MutationRequest::Create { .. } => format!("{noun} created"),
        MutationRequest::Update { .. } | MutationRequest::SetField { .. } => format!("{noun} updated"),
        MutationRequest::Delete { .. } => format!("{noun} deleted"),
    };
    (true, vec![Action::Notify(Notification::success(message))])
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        other => matches!(value_text(other).as_ref(), "true" | "1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::actions::NotificationLevel;
    use crate::domain::schema::EntityKind;
    use crate::pipeline::SearchMode;
    use crate::FolioError;
    use serde_json::json;

    fn packages() -> Vec<Record> {
        serde_json::from_value(json!([
            {"id": 4, "name": "Starter", "credits": 10, "price": 1.99, "isActive": true},
            {"id": 5, "name": "Reader", "credits": 50, "price": 7.99, "isActive": true},
            {"id": 6, "name": "Scholar", "credits": 200, "price": 24.99, "isActive": false}
        ]))
        .unwrap()
    }

    fn ready() -> ListState {
        let mut state = ListState::new(EntityKind::CreditPackage, 20, SearchMode::Substring);
        let (_, actions) = handle_event(&mut state, &Event::RefreshRequested).unwrap();
        let Some(Action::Fetch { token }) = actions.first().cloned() else {
            panic!("expected a fetch action");
        };
        handle_event(
            &mut state,
            &Event::FetchCompleted {
                token,
                result: Ok(packages()),
            },
        )
        .unwrap();
        state
    }

    fn form(pairs: &[(&str, &str)]) -> FormInput {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    fn notifications(actions: &[Action]) -> Vec<&Notification> {
        actions
            .iter()
            .filter_map(|action| match action {
                Action::Notify(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn refresh_issues_a_fetch_with_a_fresh_token() {
        let mut state = ListState::new(EntityKind::Book, 20, SearchMode::Substring);
        let (_, first) = handle_event(&mut state, &Event::RefreshRequested).unwrap();
        let (_, second) = handle_event(&mut state, &Event::RefreshRequested).unwrap();
        assert_eq!(first, vec![Action::Fetch { token: FetchToken::new(1) }]);
        assert_eq!(second, vec![Action::Fetch { token: FetchToken::new(2) }]);
    }

    #[test]
    fn stale_fetch_completion_needs_no_render() {
        let mut state = ready();
        handle_event(&mut state, &Event::RefreshRequested).unwrap();
        let (render, _) = handle_event(
            &mut state,
            &Event::FetchCompleted {
                token: FetchToken::new(1),
                result: Ok(Vec::new()),
            },
        )
        .unwrap();
        assert!(!render);
        assert_eq!(state.collection.len(), 3);
    }

    #[test]
    fn sort_on_unknown_key_is_an_error() {
        let mut state = ready();
        let err = handle_event(&mut state, &Event::SortTapped("colour".into())).unwrap_err();
        assert!(matches!(err, FolioError::UnknownSortKey(_)));
    }

    #[test]
    fn invalid_form_is_reported_without_a_remote_call() {
        let mut state = ready();
        let (_, actions) = handle_event(
            &mut state,
            &Event::FormSubmitted {
                form: form(&[("name", "Bulk"), ("credits", "0"), ("price", "9")]),
                target: None,
            },
        )
        .unwrap();

        assert!(!actions.iter().any(|a| matches!(a, Action::Submit { .. })));
        let notes = notifications(&actions);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].is_error());
        assert!(notes[0].message.contains("credits"));
    }

    #[test]
    fn valid_form_submits_a_create_without_client_id() {
        let mut state = ready();
        let (_, actions) = handle_event(
            &mut state,
            &Event::FormSubmitted {
                form: form(&[("id", "99"), ("name", "Bulk"), ("credits", "1000"), ("price", "99.5")]),
                target: None,
            },
        )
        .unwrap();

        let [Action::Submit { request: MutationRequest::Create { fields } }] = actions.as_slice() else {
            panic!("expected a single create, got {actions:?}");
        };
        assert!(!fields.contains_key("id"));
        assert_eq!(fields.get("credits"), Some(&json!(1000)));
    }

    #[test]
    fn toggle_requests_the_negated_value() {
        let mut state = ready();
        let (_, actions) = handle_event(
            &mut state,
            &Event::ToggleRequested {
                id: RecordId::from(6_u64),
                field: "isActive".into(),
            },
        )
        .unwrap();
        assert_eq!(
            actions,
            vec![Action::Submit {
                request: MutationRequest::SetField {
                    id: RecordId::from(6_u64),
                    field: "isActive".into(),
                    value: json!(true),
                }
            }]
        );
    }

    #[test]
    fn mutations_on_unknown_records_are_dropped_silently() {
        let mut state = ready();
        let (render, actions) =
            handle_event(&mut state, &Event::DeleteRequested(RecordId::from(99_u64))).unwrap();
        assert!(!render);
        assert!(actions.is_empty());
    }

    #[test]
    fn mutations_before_loading_are_refused_with_a_message() {
        let mut idle = ListState::new(EntityKind::CreditPackage, 20, SearchMode::Substring);
        let (render, actions) =
            handle_event(&mut idle, &Event::DeleteRequested(RecordId::from(4_u64))).unwrap();
        assert!(render);
        let notes = notifications(&actions);
        assert_eq!(notes.len(), 1);
        assert_eq!(
            notes[0].message,
            "Cannot delete credit package: credit packages have not been loaded"
        );
        assert!(!actions.iter().any(|a| matches!(a, Action::Submit { .. })));
    }

    #[test]
    fn failed_refetch_notifies_and_blocks_edits_until_reloaded() {
        let mut state = ready();
        let (_, actions) = handle_event(&mut state, &Event::RefreshRequested).unwrap();
        let Some(Action::Fetch { token }) = actions.first().cloned() else {
            panic!("expected a fetch action");
        };

        let (render, actions) = handle_event(
            &mut state,
            &Event::FetchCompleted {
                token,
                result: Err(ServiceFailure::Transport("503 Service Unavailable".into())),
            },
        )
        .unwrap();
        assert!(render);
        assert_eq!(
            actions,
            vec![Action::Notify(Notification::error(
                "Failed to load credit packages: 503 Service Unavailable"
            ))]
        );
        assert_eq!(state.collection, packages());

        let (_, actions) = handle_event(
            &mut state,
            &Event::ToggleRequested {
                id: RecordId::from(4_u64),
                field: "isActive".into(),
            },
        )
        .unwrap();
        let notes = notifications(&actions);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].is_error());
        assert!(notes[0].message.starts_with("Cannot update credit package"));

        let (_, actions) = handle_event(
            &mut state,
            &Event::FormSubmitted {
                form: form(&[("name", "Bulk"), ("credits", "10"), ("price", "1")]),
                target: None,
            },
        )
        .unwrap();
        assert!(notifications(&actions)[0].message.starts_with("Cannot create credit package"));
    }

    #[test]
    fn stale_fetch_failure_is_not_announced() {
        let mut state = ready();
        handle_event(&mut state, &Event::RefreshRequested).unwrap();
        let (_, actions) = handle_event(
            &mut state,
            &Event::FetchCompleted {
                token: FetchToken::new(1),
                result: Err(ServiceFailure::Transport("timeout".into())),
            },
        )
        .unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn event_names_leave_payloads_out() {
        let event = Event::FormSubmitted {
            form: form(&[("email", "ann@example.com")]),
            target: None,
        };
        assert_eq!(event.name(), "FormSubmitted");
        assert_eq!(Event::KeyUp.name(), "KeyUp");
    }

    #[test]
    fn failed_toggle_leaves_collection_unchanged_and_notifies() {
        let mut state = ready();
        let request = MutationRequest::SetField {
            id: RecordId::from(5_u64),
            field: "isActive".into(),
            value: json!(false),
        };
        let (_, actions) = handle_event(
            &mut state,
            &Event::MutationCompleted {
                request,
                result: Err(ServiceFailure::Transport("connection reset".into())),
            },
        )
        .unwrap();

        assert_eq!(state.collection, packages());
        let notes = notifications(&actions);
        assert_eq!(notes[0].level, NotificationLevel::Error);
        assert_eq!(notes[0].message, "Failed to update credit package: connection reset");
    }

    #[test]
    fn confirmed_toggle_is_reconciled_and_announced() {
        let mut state = ready();
        let request = MutationRequest::SetField {
            id: RecordId::from(5_u64),
            field: "isActive".into(),
            value: json!(false),
        };
        let mutation = Mutation::FieldSet {
            id: RecordId::from(5_u64),
            field: "isActive".into(),
            value: json!(false),
        };
        let (render, actions) = handle_event(
            &mut state,
            &Event::MutationCompleted {
                request,
                result: Ok(mutation),
            },
        )
        .unwrap();

        assert!(render);
        assert_eq!(state.collection[1].get("isActive"), Some(&json!(false)));
        assert_eq!(notifications(&actions)[0].message, "Credit package updated");
    }

    #[test]
    fn remote_not_found_on_delete_removes_the_record() {
        let mut state = ready();
        let id = RecordId::from(4_u64);
        handle_event(
            &mut state,
            &Event::MutationCompleted {
                request: MutationRequest::Delete { id: id.clone() },
                result: Err(ServiceFailure::NotFound(id.clone())),
            },
        )
        .unwrap();
        assert!(!state.contains(&id));
        assert_eq!(state.compute_viewmodel().header.title, "Credit Packages (2 of 2)");
    }

    #[test]
    fn filter_and_search_events_narrow_the_view() {
        let mut state = ready();
        handle_event(
            &mut state,
            &Event::FilterSelected {
                name: "status".into(),
                value: "active".into(),
            },
        )
        .unwrap();
        assert_eq!(state.view.matched(), 2);

        handle_event(&mut state, &Event::SearchChanged("READ".into())).unwrap();
        assert_eq!(state.view.ids(), vec![RecordId::from(5_u64)]);

        handle_event(&mut state, &Event::SearchCleared).unwrap();
        handle_event(&mut state, &Event::FiltersCleared).unwrap();
        assert_eq!(state.view.matched(), 3);
    }
}
