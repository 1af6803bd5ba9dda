//! Load phase of a list screen.
//!
//! ```text
//! Idle ──► Loading ──► Ready ──► Loading (refetch)
//!              │         └─────► Ready   (local mutation)
//!              └──────► Error ──► Loading (retry)
//! ```

/// Where a screen is in its fetch lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The collection reflects the latest accepted fetch plus any reconciled
    /// mutations since.
    Ready,
    /// The latest fetch failed with this message.
    Error(String),
}

impl LoadPhase {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}
