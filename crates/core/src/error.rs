use thiserror::Error;

use crate::model::{CheckoffRequestError, EnrollmentError, ParseIdError};

/// Input rejected before any request is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error(transparent)]
    Checkoff(#[from] CheckoffRequestError),
    #[error(transparent)]
    Enrollment(#[from] EnrollmentError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}
