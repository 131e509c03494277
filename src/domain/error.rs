//! Business-rule violations raised by the domain and the validator chains

use thiserror::Error;

use super::topic::TopicState;

/// A named business-rule violation
///
/// "Does not exist" and "exists but fails a precondition" are separate
/// variants so callers can tell them apart without parsing messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("topic does not exist")]
    TopicNotFound,

    #[error("topic is not open (state: {0})")]
    TopicNotOpen(TopicState),

    #[error("topic is deleted and can no longer be modified")]
    TopicDeleted,

    #[error("topic is closed, cannot add new solutions")]
    TopicClosedForSolutions,

    #[error("user does not exist")]
    UserNotFound,

    #[error("user is not enabled")]
    UserDisabled,

    #[error("course does not exist")]
    CourseNotFound,

    #[error("answer does not exist")]
    AnswerNotFound,

    #[error("answer is deleted and can no longer be modified")]
    AnswerDeleted,

    #[error("{0} must not be blank")]
    BlankField(&'static str),

    #[error("year must be a positive number, got {0}")]
    InvalidYear(i32),
}

/// A rejected topic state change
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot move topic from {from} to {to}")]
    NotAllowed { from: TopicState, to: TopicState },
}

/// Rejects empty or whitespace-only text
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::BlankField(field))
    } else {
        Ok(())
    }
}
