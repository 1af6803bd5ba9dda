//! Actions: side effects requested by the event handler.
//!
//! The handler never talks to a service itself. It returns [`Action`]s and the
//! [`ListController`](super::ListController) executes them, feeding the
//! outcome back as a completion event.

use crate::domain::error::{FolioError, ValidationError};
use crate::domain::record::{Fields, RecordId};
use serde_json::Value;
use std::fmt;

/// Identifies one fetch. Tokens increase monotonically per screen; only the
/// response to the most recently issued token is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchToken(u64);

impl FetchToken {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// A remote write the user asked for, not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRequest {
    Create { fields: Fields },
    Update { id: RecordId, fields: Fields },
    Delete { id: RecordId },
    SetField { id: RecordId, field: String, value: Value },
}

impl MutationRequest {
    #[must_use]
    pub const fn target(&self) -> Option<&RecordId> {
        match self {
            Self::Create { .. } => None,
            Self::Update { id, .. } | Self::Delete { id } | Self::SetField { id, .. } => Some(id),
        }
    }

    /// Verb for log lines and notifications.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } | Self::SetField { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Why a remote call failed, in a form that can travel inside events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceFailure {
    Transport(String),
    Rejected(ValidationError),
    NotFound(RecordId),
}

impl From<FolioError> for ServiceFailure {
    fn from(error: FolioError) -> Self {
        match error {
            FolioError::Validation(e) => Self::Rejected(e),
            FolioError::NotFound(id) => Self::NotFound(id),
            FolioError::Transport(message) => Self::Transport(message),
            other => Self::Transport(other.to_string()),
        }
    }
}

impl fmt::Display for ServiceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(message) => f.write_str(message),
            Self::Rejected(e) => write!(f, "rejected: {e}"),
            Self::NotFound(id) => write!(f, "record {id} no longer exists"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A message for the confirmation/alert layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.level, NotificationLevel::Error)
    }
}

/// Side effects produced by [`handle_event`](super::handle_event).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Load the whole collection; the response must carry `token`.
    Fetch { token: FetchToken },
    /// Send a validated mutation to the service.
    Submit { request: MutationRequest },
    Notify(Notification),
}
