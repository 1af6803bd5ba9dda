//! Async executor for list screen actions.
//!
//! [`ListController`] owns a [`ListState`] and a [`RemoteDataService`]. It
//! runs events through [`handle_event`], performs the resulting remote calls
//! and feeds each outcome back in as a completion event, collecting the
//! notifications produced along the way.

use super::actions::{Action, MutationRequest, Notification, ServiceFailure};
use super::handler::{handle_event, Event, MutationResult};
use super::reconcile::Mutation;
use super::state::ListState;
use crate::domain::error::Result;
use crate::infrastructure::{hex_token, RandomSource};
use crate::service::RemoteDataService;
use crate::view::ListViewModel;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::Instrument;

/// Drives one list screen against a remote service.
pub struct ListController<S> {
    state: ListState,
    service: S,
    random: Arc<dyn RandomSource>,
    notifications: Vec<Notification>,
}

impl<S: RemoteDataService> ListController<S> {
    pub fn new(state: ListState, service: S, random: Arc<dyn RandomSource>) -> Self {
        Self {
            state,
            service,
            random,
            notifications: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ListState {
        &self.state
    }

    #[must_use]
    pub const fn service(&self) -> &S {
        &self.service
    }

    #[must_use]
    pub fn view_model(&self) -> ListViewModel {
        self.state.compute_viewmodel()
    }

    /// Drains the notifications collected so far, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Loads (or reloads) the collection.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn refresh(&mut self) -> Result<bool> {
        self.dispatch(Event::RefreshRequested).await
    }

    /// Handles `event` and every completion event it leads to, in order.
    ///
    /// Returns whether any step asked for a redraw.
    ///
    /// # Errors
    ///
    /// Returns the handler's error for `event` itself, e.g. an unknown sort
    /// key. Errors while handling follow-up completions are turned into error
    /// notifications instead.
    pub async fn dispatch(&mut self, event: Event) -> Result<bool> {
        let (mut needs_render, actions) = handle_event(&mut self.state, &event)?;
        let mut pending: VecDeque<Action> = actions.into();

        while let Some(action) = pending.pop_front() {
            let Some(completion) = self.execute(action).await else {
                continue;
            };
            match handle_event(&mut self.state, &completion) {
                Ok((render, follow_up)) => {
                    needs_render |= render;
                    pending.extend(follow_up);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "completion event failed");
                    self.notifications.push(Notification::error(e.to_string()));
                }
            }
        }

        Ok(needs_render)
    }

    /// Handles `event` without executing remote calls, returning the actions
    /// for the caller to run with [`perform`](Self::perform).
    ///
    /// # Errors
    ///
    /// Returns the handler's error for `event`.
    pub fn begin(&mut self, event: &Event) -> Result<Vec<Action>> {
        let (_, actions) = handle_event(&mut self.state, event)?;
        Ok(actions)
    }

    /// Performs a remote action and returns its completion event without
    /// applying it. Notifications are queued rather than returned.
    pub async fn perform(&mut self, action: Action) -> Option<Event> {
        self.execute(action).await
    }

    async fn execute(&mut self, action: Action) -> Option<Event> {
        match action {
            Action::Notify(notification) => {
                tracing::debug!(level = ?notification.level, message = %notification.message, "notification");
                self.notifications.push(notification);
                None
            }
            Action::Fetch { token } => {
                let kind = self.state.kind;
                let span = tracing::debug_span!("fetch", kind = %kind, token = token.value());
                let result = Self::handle_service_result("list", self.service.list(kind).instrument(span).await, Ok);
                Some(Event::FetchCompleted { token, result })
            }
            Action::Submit { request } => {
                let request_id = hex_token(self.random.as_ref(), 6);
                let span = tracing::debug_span!("submit",
                    kind = %self.state.kind,
                    request_id = %request_id,
                    verb = request.verb(),
                    target = ?request.target()
                );
                let result = self.submit(&request).instrument(span).await;
                Some(Event::MutationCompleted { request, result })
            }
        }
    }

    async fn submit(&self, request: &MutationRequest) -> MutationResult {
        let kind = self.state.kind;
        match request {
            MutationRequest::Create { fields } => Self::handle_service_result(
                "create",
                self.service.create(kind, fields.clone()).await,
                |record| Ok(Mutation::Created(record)),
            ),
            MutationRequest::Update { id, fields } => Self::handle_service_result(
                "update",
                self.service.update(kind, id, fields.clone()).await,
                |record| Ok(Mutation::Updated(record)),
            ),
            MutationRequest::Delete { id } => Self::handle_service_result(
                "delete",
                self.service.delete(kind, id).await,
                |()| Ok(Mutation::Deleted(id.clone())),
            ),
            MutationRequest::SetField { id, field, value } => Self::handle_service_result(
                "set field",
                self.service.set_field(kind, id, field, value.clone()).await,
                |()| {
                    Ok(Mutation::FieldSet {
                        id: id.clone(),
                        field: field.clone(),
                        value: value.clone(),
                    })
                },
            ),
        }
    }

    fn handle_service_result<T, U, F>(
        operation: &str,
        result: Result<T>,
        on_success: F,
    ) -> std::result::Result<U, ServiceFailure>
    where
        F: FnOnce(T) -> std::result::Result<U, ServiceFailure>,
    {
        match result {
            Ok(value) => {
                tracing::debug!(operation = operation, "service call succeeded");
                on_success(value)
            }
            Err(e) => {
                tracing::debug!(operation = operation, error = %e, "service call failed");
                Err(ServiceFailure::from(e))
            }
        }
    }
}
