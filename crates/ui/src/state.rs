use services::{ErrorKind, ServiceError};

/// A failure as shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// Input problem, shown inline with the backend-independent message.
    Validation(String),
    /// Not signed in, session expired, or not allowed.
    Auth,
    /// Network or backend failure; the screen offers a refresh.
    Transport,
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message) => message,
            Self::Auth => "Your session has expired or you do not have access. Please sign in again.",
            Self::Transport => "Something went wrong. Please try again.",
        }
    }

    #[must_use]
    pub fn can_retry(&self) -> bool {
        matches!(self, Self::Transport)
    }
}

impl From<&ServiceError> for ViewError {
    fn from(err: &ServiceError) -> Self {
        match err.kind() {
            ErrorKind::Validation => Self::Validation(err.to_string()),
            ErrorKind::Auth => Self::Auth,
            ErrorKind::Transport => Self::Transport,
        }
    }
}

impl From<ServiceError> for ViewError {
    fn from(err: ServiceError) -> Self {
        Self::from(&err)
    }
}

/// Title and detail for an empty list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyState {
    pub title: &'static str,
    pub detail: &'static str,
}

pub(crate) const SEARCH_MISS: &str = "Try adjusting your search";

/// Lifecycle of a screen's data.
///
/// `Empty` is a successful load with nothing to show; it is never used for
/// failures.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Empty,
    Ready(T),
    Error(ViewError),
}

impl<T> ViewState<T> {
    /// Map a load result, treating values for which `is_empty` holds as `Empty`.
    pub fn from_result(result: Result<T, ServiceError>, is_empty: impl FnOnce(&T) -> bool) -> Self {
        match result {
            Ok(value) if is_empty(&value) => Self::Empty,
            Ok(value) => Self::Ready(value),
            Err(err) => {
                tracing::warn!(error = %err, "view load failed");
                Self::Error(ViewError::from(&err))
            }
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&ViewError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
        match self {
            Self::Idle => ViewState::Idle,
            Self::Loading => ViewState::Loading,
            Self::Empty => ViewState::Empty,
            Self::Ready(value) => ViewState::Ready(f(value)),
            Self::Error(err) => ViewState::Error(err),
        }
    }
}
