//! Errors returned by validators and the forum service

use thiserror::Error;

use crate::domain::{RepositoryError, TransitionError, ValidationError};

#[derive(Debug, Error)]
pub enum ForumError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ForumError {
    /// Returns the business-rule violation, if this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            ForumError::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true for caller mistakes (rule or transition violations)
    ///
    /// Storage failures are the only errors that are not the caller's fault.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, ForumError::Repository(_))
    }
}

pub type ForumResult<T> = Result<T, ForumError>;
