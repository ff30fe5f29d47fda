use thiserror::Error;

/// Errors surfaced by gateway implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("not signed in")]
    MissingToken,

    #[error("session expired")]
    Unauthorized,

    #[error("request failed with status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl GatewayError {
    /// True for failures that signing in again would fix, or that a role
    /// change would (403).
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::MissingToken | Self::Unauthorized | Self::HttpStatus { status: 403, .. }
        )
    }

    pub(crate) fn status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: message.into(),
        }
    }
}

/// Errors reading gateway settings from the environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}
