//! Shared error types for the services crate.

use thiserror::Error;

use gateway::GatewayError;
use skilltrack_core::ValidationError;
use skilltrack_core::model::{CheckoffRequestError, EnrollmentError};

/// How a failure should be presented. None of these are retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; nothing was sent.
    Validation,
    /// Missing or rejected credentials, or insufficient role.
    Auth,
    /// Network, status or body failure.
    Transport,
}

/// Errors emitted by every service in this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ServiceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Gateway(err) if err.is_auth() => ErrorKind::Auth,
            Self::Gateway(_) => ErrorKind::Transport,
        }
    }
}

impl From<CheckoffRequestError> for ServiceError {
    fn from(err: CheckoffRequestError) -> Self {
        Self::Validation(err.into())
    }
}

impl From<EnrollmentError> for ServiceError {
    fn from(err: EnrollmentError) -> Self {
        Self::Validation(err.into())
    }
}
