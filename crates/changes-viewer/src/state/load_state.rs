//! Loading lifecycle of one comparison.

use crate::model::ComparisonKey;
use crate::traits::FetchError;
use std::fmt;

/// Identifies one issued fetch. Later requests have larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A fetch the host has to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub id: RequestId,
    pub key: ComparisonKey,
}

/// Where the controller is in loading the current comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// No usable comparison endpoints.
    #[default]
    Idle,
    /// Waiting for the result of this request.
    Loading(RequestId),
    /// Records and stats are available.
    Ready,
    /// The last fetch failed.
    Error(FetchError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading(_))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready)
    }

    /// Get the error if in error state.
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            LoadState::Error(e) => Some(e),
            _ => None,
        }
    }
}
