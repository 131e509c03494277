//! Answer domain model
//!
//! Answers are replies to a topic. One of them may be flagged as the
//! accepted solution; whether that flag may be set depends on the topic's
//! state and is enforced by the update validator chain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{require_text, ValidationError};
use super::id::{AnswerId, TopicId, UserId};

/// Request to post an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAnswer {
    pub message: String,
    pub user_id: UserId,
    pub topic_id: TopicId,
}

/// Partial update of an answer; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_solution: Option<bool>,
}

impl AnswerUpdate {
    /// Returns true if the update asks to mark the answer as the solution
    pub fn marks_solution(&self) -> bool {
        self.is_solution == Some(true)
    }
}

/// An update addressed to a stored answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerEdit {
    pub answer_id: AnswerId,
    pub update: AnswerUpdate,
}

/// An answer to a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Unique identifier
    pub id: AnswerId,

    pub message: String,

    /// Author
    pub user_id: UserId,

    /// Topic this answer belongs to
    pub topic_id: TopicId,

    /// Accepted solution flag
    #[serde(default)]
    pub is_solution: bool,

    /// Soft-delete flag
    #[serde(default)]
    pub is_deleted: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Answer {
    /// Creates an answer from a request that already passed validation
    pub fn create(id: AnswerId, request: NewAnswer) -> Result<Self, ValidationError> {
        require_text("message", &request.message)?;

        let now = Utc::now();
        Ok(Self {
            id,
            message: request.message,
            user_id: request.user_id,
            topic_id: request.topic_id,
            is_solution: false,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies the provided fields and bumps the last-update timestamp
    pub fn update(&mut self, update: &AnswerUpdate) -> Result<(), ValidationError> {
        if self.is_deleted {
            return Err(ValidationError::AnswerDeleted);
        }
        if let Some(message) = &update.message {
            require_text("message", message)?;
            self.message = message.clone();
        }
        if let Some(is_solution) = update.is_solution {
            self.is_solution = is_solution;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Marks the answer deleted; the record itself is kept
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
        self.updated_at = Utc::now();
    }
}
