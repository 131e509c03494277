//! Rule implementations for the validator chains

use crate::domain::{
    AnswerEdit, AnswerId, AnswerRepository, CourseId, CourseRepository, NewAnswer, NewTopic, TopicEdit,
    TopicPolicy, TopicRepository, TopicState, UserId, UserRepository, ValidationError,
};
use crate::error::ForumResult;

use super::Validator;

/// Requests that name the user performing them
pub trait Authored {
    fn author(&self) -> UserId;
}

impl Authored for NewAnswer {
    fn author(&self) -> UserId {
        self.user_id
    }
}

impl Authored for NewTopic {
    fn author(&self) -> UserId {
        self.user_id
    }
}

/// Requests that may point at a course
pub trait CourseRef {
    /// The referenced course, or `None` when the request leaves it alone
    fn course(&self) -> Option<CourseId>;
}

impl CourseRef for NewTopic {
    fn course(&self) -> Option<CourseId> {
        Some(self.course_id)
    }
}

impl CourseRef for TopicEdit {
    fn course(&self) -> Option<CourseId> {
        self.update.course_id
    }
}

/// The target topic must exist and be taking answers
///
/// Deleted topics never take answers. Closed topics take plain answers only
/// when [`TopicPolicy::accept_answers_on_closed`] is set; solution marking on
/// closed topics is guarded separately by [`SolutionRequiresOpenTopic`].
/// Earlier forum versions refused every answer on a closed topic, which is
/// what [`TopicPolicy::strict`] restores.
pub struct TopicAcceptsAnswers<'a> {
    topics: &'a dyn TopicRepository,
    policy: TopicPolicy,
}

impl<'a> TopicAcceptsAnswers<'a> {
    pub fn new(topics: &'a dyn TopicRepository, policy: TopicPolicy) -> Self {
        Self { topics, policy }
    }
}

impl Validator<NewAnswer> for TopicAcceptsAnswers<'_> {
    fn name(&self) -> &'static str {
        "topic-accepts-answers"
    }

    fn validate(&self, request: &NewAnswer) -> ForumResult<()> {
        let topic = self
            .topics
            .find_by_id(request.topic_id)?
            .ok_or(ValidationError::TopicNotFound)?;

        let accepted = match topic.state {
            TopicState::Open => true,
            TopicState::Closed => self.policy.accept_answers_on_closed,
            TopicState::Deleted => false,
        };

        if accepted {
            Ok(())
        } else {
            Err(ValidationError::TopicNotOpen(topic.state).into())
        }
    }
}

/// The author must exist and be enabled
pub struct UserIsEnabled<'a> {
    users: &'a dyn UserRepository,
}

impl<'a> UserIsEnabled<'a> {
    pub fn new(users: &'a dyn UserRepository) -> Self {
        Self { users }
    }
}

impl<R: Authored> Validator<R> for UserIsEnabled<'_> {
    fn name(&self) -> &'static str {
        "user-is-enabled"
    }

    fn validate(&self, request: &R) -> ForumResult<()> {
        let user = self
            .users
            .find_by_id(request.author())?
            .ok_or(ValidationError::UserNotFound)?;

        if user.is_enabled() {
            Ok(())
        } else {
            Err(ValidationError::UserDisabled.into())
        }
    }
}

/// A referenced course must exist; requests without one pass
pub struct CourseExists<'a> {
    courses: &'a dyn CourseRepository,
}

impl<'a> CourseExists<'a> {
    pub fn new(courses: &'a dyn CourseRepository) -> Self {
        Self { courses }
    }
}

impl<R: CourseRef> Validator<R> for CourseExists<'_> {
    fn name(&self) -> &'static str {
        "course-exists"
    }

    fn validate(&self, request: &R) -> ForumResult<()> {
        let Some(course_id) = request.course() else {
            return Ok(());
        };

        match self.courses.find_by_id(course_id)? {
            Some(_) => Ok(()),
            None => Err(ValidationError::CourseNotFound.into()),
        }
    }
}

/// Requests addressed to a stored answer
pub trait AnswerRef {
    fn answer(&self) -> AnswerId;
}

impl AnswerRef for AnswerEdit {
    fn answer(&self) -> AnswerId {
        self.answer_id
    }
}

impl AnswerRef for AnswerId {
    fn answer(&self) -> AnswerId {
        *self
    }
}

/// The answer must exist, not be soft-deleted, and sit on a live topic
///
/// A deleted topic freezes its answers along with its own content.
pub struct AnswerIsLive<'a> {
    answers: &'a dyn AnswerRepository,
    topics: &'a dyn TopicRepository,
}

impl<'a> AnswerIsLive<'a> {
    pub fn new(answers: &'a dyn AnswerRepository, topics: &'a dyn TopicRepository) -> Self {
        Self { answers, topics }
    }
}

impl<R: AnswerRef> Validator<R> for AnswerIsLive<'_> {
    fn name(&self) -> &'static str {
        "answer-is-live"
    }

    fn validate(&self, request: &R) -> ForumResult<()> {
        let answer = self
            .answers
            .find_by_id(request.answer())?
            .ok_or(ValidationError::AnswerNotFound)?;
        if answer.is_deleted {
            return Err(ValidationError::AnswerDeleted.into());
        }

        let topic = self
            .topics
            .find_by_id(answer.topic_id)?
            .ok_or(ValidationError::TopicNotFound)?;
        if topic.is_deleted() {
            Err(ValidationError::TopicDeleted.into())
        } else {
            Ok(())
        }
    }
}

/// Marking a solution requires the answer's topic to still be open
///
/// Only edits that set `is_solution = true` are checked; message
/// corrections on a closed topic go through.
pub struct SolutionRequiresOpenTopic<'a> {
    answers: &'a dyn AnswerRepository,
    topics: &'a dyn TopicRepository,
}

impl<'a> SolutionRequiresOpenTopic<'a> {
    pub fn new(answers: &'a dyn AnswerRepository, topics: &'a dyn TopicRepository) -> Self {
        Self { answers, topics }
    }
}

impl Validator<AnswerEdit> for SolutionRequiresOpenTopic<'_> {
    fn name(&self) -> &'static str {
        "solution-requires-open-topic"
    }

    fn validate(&self, request: &AnswerEdit) -> ForumResult<()> {
        if !request.update.marks_solution() {
            return Ok(());
        }

        let answer = self
            .answers
            .find_by_id(request.answer_id)?
            .ok_or(ValidationError::AnswerNotFound)?;
        let topic = self
            .topics
            .find_by_id(answer.topic_id)?
            .ok_or(ValidationError::TopicNotFound)?;

        match topic.state {
            TopicState::Open => Ok(()),
            TopicState::Closed => Err(ValidationError::TopicClosedForSolutions.into()),
            TopicState::Deleted => Err(ValidationError::TopicNotOpen(topic.state).into()),
        }
    }
}
