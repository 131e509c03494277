//! Collaborator contracts for persistence
//!
//! The domain never loads related entities behind the caller's back: every
//! reference is an id, and resolving it is an explicit call on one of these
//! traits. Storage adapters live in [`crate::storage`].

use thiserror::Error;

use super::answer::Answer;
use super::id::{AnswerId, CourseId, TopicId, UserId};
use super::topic::Topic;
use super::user::{Course, User};

/// Failure inside a storage adapter
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for RepositoryError {
    fn from(err: anyhow::Error) -> Self {
        RepositoryError::Storage(format!("{:#}", err))
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

pub trait TopicRepository {
    fn find_by_id(&self, id: TopicId) -> RepoResult<Option<Topic>>;

    fn exists_by_id(&self, id: TopicId) -> RepoResult<bool> {
        Ok(self.find_by_id(id)?.is_some())
    }

    /// Inserts or replaces the topic with the same id
    fn save(&self, topic: &Topic) -> RepoResult<()>;

    /// Returns an id no stored topic uses yet
    fn next_id(&self) -> RepoResult<TopicId>;

    fn find_all(&self) -> RepoResult<Vec<Topic>>;
}

pub trait AnswerRepository {
    fn find_by_id(&self, id: AnswerId) -> RepoResult<Option<Answer>>;

    /// Inserts or replaces the answer with the same id
    fn save(&self, answer: &Answer) -> RepoResult<()>;

    fn next_id(&self) -> RepoResult<AnswerId>;

    /// Answers posted to a topic, oldest first
    fn find_by_topic(&self, topic_id: TopicId) -> RepoResult<Vec<Answer>>;
}

pub trait UserRepository {
    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    fn exists_by_id(&self, id: UserId) -> RepoResult<bool> {
        Ok(self.find_by_id(id)?.is_some())
    }

    fn save(&self, user: &User) -> RepoResult<()>;

    fn next_id(&self) -> RepoResult<UserId>;

    fn find_all(&self) -> RepoResult<Vec<User>>;
}

pub trait CourseRepository {
    fn find_by_id(&self, id: CourseId) -> RepoResult<Option<Course>>;

    fn save(&self, course: &Course) -> RepoResult<()>;

    fn next_id(&self) -> RepoResult<CourseId>;

    fn find_all(&self) -> RepoResult<Vec<Course>>;
}
