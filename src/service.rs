//! Forum service
//!
//! Owns the validator chains and is the single entry point for mutating
//! topics and answers. Every mutation follows the same shape: run the
//! operation's chain, load the aggregate, apply the aggregate's own method,
//! save.

use tracing::info;

use crate::domain::{
    Answer, AnswerEdit, AnswerId, AnswerRepository, AnswerUpdate, Category, Course,
    CourseRepository, NewAnswer, NewTopic, Topic, TopicEdit, TopicId, TopicPolicy,
    TopicRepository, TopicState, TopicUpdate, User, UserId, UserRepository, ValidationError,
};
use crate::error::ForumResult;
use crate::validation::{
    AnswerIsLive, CourseExists, SolutionRequiresOpenTopic, TopicAcceptsAnswers, UserIsEnabled,
    ValidatorChain,
};

/// The repositories a [`ForumService`] works against
#[derive(Clone, Copy)]
pub struct Repositories<'a> {
    pub topics: &'a dyn TopicRepository,
    pub answers: &'a dyn AnswerRepository,
    pub users: &'a dyn UserRepository,
    pub courses: &'a dyn CourseRepository,
}

impl<'a> Repositories<'a> {
    /// Uses one store for every repository
    pub fn single<S>(store: &'a S) -> Self
    where
        S: TopicRepository + AnswerRepository + UserRepository + CourseRepository,
    {
        Self {
            topics: store,
            answers: store,
            users: store,
            courses: store,
        }
    }
}

pub struct ForumService<'a> {
    repos: Repositories<'a>,
    policy: TopicPolicy,
}

impl<'a> ForumService<'a> {
    pub fn new(repos: Repositories<'a>, policy: TopicPolicy) -> Self {
        Self { repos, policy }
    }

    pub fn policy(&self) -> &TopicPolicy {
        &self.policy
    }

    // -------------------------------------------------------------------
    // Chains
    // -------------------------------------------------------------------

    /// Rules checked before a topic is opened
    pub fn topic_creation_chain(&self) -> ValidatorChain<'a, NewTopic> {
        ValidatorChain::new()
            .with(UserIsEnabled::new(self.repos.users))
            .with(CourseExists::new(self.repos.courses))
    }

    /// Rules checked before a topic's content is edited
    pub fn topic_edit_chain(&self) -> ValidatorChain<'a, TopicEdit> {
        ValidatorChain::new().with(CourseExists::new(self.repos.courses))
    }

    /// Rules checked before an answer is posted
    pub fn answer_creation_chain(&self) -> ValidatorChain<'a, NewAnswer> {
        ValidatorChain::new()
            .with(TopicAcceptsAnswers::new(self.repos.topics, self.policy))
            .with(UserIsEnabled::new(self.repos.users))
    }

    /// Rules checked before an answer is edited
    pub fn answer_update_chain(&self) -> ValidatorChain<'a, AnswerEdit> {
        ValidatorChain::new()
            .with(AnswerIsLive::new(self.repos.answers, self.repos.topics))
            .with(SolutionRequiresOpenTopic::new(
                self.repos.answers,
                self.repos.topics,
            ))
    }

    /// Rules checked before an answer is soft-deleted
    pub fn answer_deletion_chain(&self) -> ValidatorChain<'a, AnswerId> {
        ValidatorChain::new().with(AnswerIsLive::new(self.repos.answers, self.repos.topics))
    }

    // -------------------------------------------------------------------
    // Topics
    // -------------------------------------------------------------------

    pub fn create_topic(&self, request: NewTopic) -> ForumResult<Topic> {
        self.topic_creation_chain().validate(&request)?;

        let id = self.repos.topics.next_id()?;
        let topic = Topic::create(id, request)?;
        self.repos.topics.save(&topic)?;

        info!(topic = %topic.id, user = %topic.user_id, "topic created");
        Ok(topic)
    }

    /// Applies a partial content update; a provided course is validated
    pub fn update_topic(&self, id: TopicId, update: TopicUpdate) -> ForumResult<Topic> {
        let edit = TopicEdit {
            topic_id: id,
            update,
        };
        self.topic_edit_chain().validate(&edit)?;

        let mut topic = self.topic(id)?;
        match edit.update.course_id {
            Some(course_id) => topic.update_content_and_course(&edit.update, Some(course_id))?,
            None => topic.update_content(&edit.update)?,
        }
        self.repos.topics.save(&topic)?;

        info!(topic = %topic.id, "topic updated");
        Ok(topic)
    }

    /// Moves a topic through the transition table
    pub fn change_topic_state(&self, id: TopicId, state: TopicState) -> ForumResult<Topic> {
        let mut topic = self.topic(id)?;
        let from = topic.state;
        topic.transition(state, &self.policy)?;
        self.repos.topics.save(&topic)?;

        info!(topic = %topic.id, %from, to = %state, "topic state changed");
        Ok(topic)
    }

    pub fn close_topic(&self, id: TopicId) -> ForumResult<Topic> {
        self.change_topic_state(id, TopicState::Closed)
    }

    pub fn reopen_topic(&self, id: TopicId) -> ForumResult<Topic> {
        self.change_topic_state(id, TopicState::Open)
    }

    /// Soft-deletes a topic; the record and its answers are kept
    pub fn delete_topic(&self, id: TopicId) -> ForumResult<Topic> {
        self.change_topic_state(id, TopicState::Deleted)
    }

    pub fn topic(&self, id: TopicId) -> ForumResult<Topic> {
        Ok(self
            .repos
            .topics
            .find_by_id(id)?
            .ok_or(ValidationError::TopicNotFound)?)
    }

    pub fn topics(&self) -> ForumResult<Vec<Topic>> {
        Ok(self.repos.topics.find_all()?)
    }

    // -------------------------------------------------------------------
    // Answers
    // -------------------------------------------------------------------

    pub fn create_answer(&self, request: NewAnswer) -> ForumResult<Answer> {
        self.answer_creation_chain().validate(&request)?;

        let id = self.repos.answers.next_id()?;
        let answer = Answer::create(id, request)?;
        self.repos.answers.save(&answer)?;

        info!(answer = %answer.id, topic = %answer.topic_id, "answer created");
        Ok(answer)
    }

    pub fn update_answer(&self, id: AnswerId, update: AnswerUpdate) -> ForumResult<Answer> {
        let edit = AnswerEdit {
            answer_id: id,
            update,
        };
        self.answer_update_chain().validate(&edit)?;

        let mut answer = self.answer(id)?;
        answer.update(&edit.update)?;
        self.repos.answers.save(&answer)?;

        info!(answer = %answer.id, solution = answer.is_solution, "answer updated");
        Ok(answer)
    }

    /// Soft-deletes an answer
    pub fn delete_answer(&self, id: AnswerId) -> ForumResult<Answer> {
        self.answer_deletion_chain().validate(&id)?;

        let mut answer = self.answer(id)?;
        answer.soft_delete();
        self.repos.answers.save(&answer)?;

        info!(answer = %answer.id, "answer deleted");
        Ok(answer)
    }

    pub fn answer(&self, id: AnswerId) -> ForumResult<Answer> {
        Ok(self
            .repos
            .answers
            .find_by_id(id)?
            .ok_or(ValidationError::AnswerNotFound)?)
    }

    /// Answers posted to an existing topic, deleted ones included
    pub fn answers_for(&self, topic_id: TopicId) -> ForumResult<Vec<Answer>> {
        if !self.repos.topics.exists_by_id(topic_id)? {
            return Err(ValidationError::TopicNotFound.into());
        }
        Ok(self.repos.answers.find_by_topic(topic_id)?)
    }

    // -------------------------------------------------------------------
    // Users and courses
    // -------------------------------------------------------------------

    pub fn register_user(&self, username: &str) -> ForumResult<User> {
        let user = User::new(self.repos.users.next_id()?, username)?;
        self.repos.users.save(&user)?;

        info!(user = %user.id, "user registered");
        Ok(user)
    }

    pub fn set_user_enabled(&self, id: UserId, enabled: bool) -> ForumResult<User> {
        let mut user = self
            .repos
            .users
            .find_by_id(id)?
            .ok_or(ValidationError::UserNotFound)?;
        user.set_enabled(enabled);
        self.repos.users.save(&user)?;

        info!(user = %user.id, enabled, "user updated");
        Ok(user)
    }

    pub fn users(&self) -> ForumResult<Vec<User>> {
        Ok(self.repos.users.find_all()?)
    }

    pub fn register_course(&self, name: &str, category: Category) -> ForumResult<Course> {
        let course = Course::new(self.repos.courses.next_id()?, name, category)?;
        self.repos.courses.save(&course)?;

        info!(course = %course.id, "course registered");
        Ok(course)
    }

    pub fn courses(&self) -> ForumResult<Vec<Course>> {
        Ok(self.repos.courses.find_all()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CourseId, TransitionError};
    use crate::error::ForumError;
    use crate::storage::MemoryStore;

    /// Store with users 1 (enabled), 2 (enabled), 3 (disabled) and course 1
    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        {
            let service = ForumService::new(Repositories::single(&store), TopicPolicy::default());
            service.register_user("ada").unwrap();
            service.register_user("grace").unwrap();
            let mallory = service.register_user("mallory").unwrap();
            service.set_user_enabled(mallory.id, false).unwrap();
            service
                .register_course("Rust 101", Category::Programming)
                .unwrap();
        }
        store
    }

    fn service(store: &MemoryStore) -> ForumService<'_> {
        ForumService::new(Repositories::single(store), TopicPolicy::default())
    }

    fn new_topic() -> NewTopic {
        NewTopic {
            title: "Why does X fail".to_string(),
            message: "It fails on every run".to_string(),
            year: 2024,
            user_id: UserId::new(1),
            course_id: CourseId::new(1),
        }
    }

    fn new_answer(topic_id: TopicId, user: u64, message: &str) -> NewAnswer {
        NewAnswer {
            message: message.to_string(),
            user_id: UserId::new(user),
            topic_id,
        }
    }

    fn mark_solution(flag: Option<bool>) -> AnswerUpdate {
        AnswerUpdate {
            message: None,
            is_solution: flag,
        }
    }

    fn validation(err: ForumError) -> ValidationError {
        match err {
            ForumError::Validation(err) => err,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    fn pause() {
        std::thread::sleep(std::time::Duration::from_millis(10));
    }

    #[test]
    fn chains_are_assembled_in_order() {
        let store = seeded();
        let service = service(&store);

        assert_eq!(
            service.answer_creation_chain().rule_names(),
            vec!["topic-accepts-answers", "user-is-enabled"]
        );
        assert_eq!(
            service.answer_update_chain().rule_names(),
            vec!["answer-is-live", "solution-requires-open-topic"]
        );
        assert_eq!(
            service.topic_creation_chain().rule_names(),
            vec!["user-is-enabled", "course-exists"]
        );
        assert_eq!(
            service.answer_deletion_chain().rule_names(),
            vec!["answer-is-live"]
        );
    }

    #[test]
    fn end_to_end_lifecycle() {
        let store = seeded();
        let service = service(&store);

        let topic = service.create_topic(new_topic()).unwrap();
        assert_eq!(topic.state, TopicState::Open);

        let first = service
            .create_answer(new_answer(topic.id, 2, "Try Y"))
            .unwrap();
        assert!(!first.is_solution);

        let first = service
            .update_answer(first.id, mark_solution(Some(true)))
            .unwrap();
        assert!(first.is_solution);

        service.close_topic(topic.id).unwrap();

        let second = service
            .create_answer(new_answer(topic.id, 2, "Another idea"))
            .unwrap();
        assert!(!second.is_solution);

        let err = service
            .update_answer(second.id, mark_solution(Some(true)))
            .unwrap_err();
        assert_eq!(validation(err), ValidationError::TopicClosedForSolutions);

        let stored = service.answer(second.id).unwrap();
        assert!(!stored.is_solution);
    }

    #[test]
    fn missing_topic_creates_no_answer() {
        let store = seeded();
        let service = service(&store);

        let err = service
            .create_answer(new_answer(TopicId::new(42), 1, "Hello"))
            .unwrap_err();

        assert_eq!(validation(err), ValidationError::TopicNotFound);
        assert_eq!(AnswerRepository::next_id(&store).unwrap(), AnswerId::new(1));
    }

    #[test]
    fn strict_policy_requires_open_topic() {
        let store = seeded();
        let service = ForumService::new(Repositories::single(&store), TopicPolicy::strict());

        let closed = service.create_topic(new_topic()).unwrap();
        service.close_topic(closed.id).unwrap();
        let deleted = service.create_topic(new_topic()).unwrap();
        service.delete_topic(deleted.id).unwrap();

        for (id, state) in [
            (closed.id, TopicState::Closed),
            (deleted.id, TopicState::Deleted),
        ] {
            let err = service
                .create_answer(new_answer(id, 1, "Hello"))
                .unwrap_err();
            assert_eq!(validation(err), ValidationError::TopicNotOpen(state));
        }
    }

    #[test]
    fn answer_requires_existing_enabled_user() {
        let store = seeded();
        let service = service(&store);
        let topic = service.create_topic(new_topic()).unwrap();

        let err = service
            .create_answer(new_answer(topic.id, 99, "Hello"))
            .unwrap_err();
        assert_eq!(validation(err), ValidationError::UserNotFound);

        let err = service
            .create_answer(new_answer(topic.id, 3, "Hello"))
            .unwrap_err();
        assert_eq!(validation(err), ValidationError::UserDisabled);
    }

    #[test]
    fn topic_checks_run_before_user_checks() {
        let store = seeded();
        let service = service(&store);

        let err = service
            .create_answer(new_answer(TopicId::new(7), 99, "Hello"))
            .unwrap_err();
        assert_eq!(validation(err), ValidationError::TopicNotFound);
    }

    #[test]
    fn non_solution_edits_pass_on_closed_topic() {
        let store = seeded();
        let service = service(&store);
        let topic = service.create_topic(new_topic()).unwrap();
        let answer = service
            .create_answer(new_answer(topic.id, 1, "Try Y"))
            .unwrap();
        service.close_topic(topic.id).unwrap();

        service
            .update_answer(answer.id, mark_solution(Some(false)))
            .unwrap();
        let fixed = service
            .update_answer(
                answer.id,
                AnswerUpdate {
                    message: Some("Try Y, then restart".to_string()),
                    is_solution: None,
                },
            )
            .unwrap();
        assert_eq!(fixed.message, "Try Y, then restart");
    }

    #[test]
    fn empty_answer_update_advances_timestamp() {
        let store = seeded();
        let service = service(&store);
        let topic = service.create_topic(new_topic()).unwrap();
        let answer = service
            .create_answer(new_answer(topic.id, 1, "Try Y"))
            .unwrap();

        pause();
        let updated = service
            .update_answer(answer.id, AnswerUpdate::default())
            .unwrap();

        assert_eq!(updated.message, answer.message);
        assert_eq!(updated.is_solution, answer.is_solution);
        assert!(updated.updated_at > answer.updated_at);
    }

    #[test]
    fn topic_creation_checks_author_and_course() {
        let store = seeded();
        let service = service(&store);

        let mut request = new_topic();
        request.user_id = UserId::new(3);
        assert_eq!(
            validation(service.create_topic(request).unwrap_err()),
            ValidationError::UserDisabled
        );

        let mut request = new_topic();
        request.course_id = CourseId::new(8);
        assert_eq!(
            validation(service.create_topic(request).unwrap_err()),
            ValidationError::CourseNotFound
        );

        let mut request = new_topic();
        request.title = " ".to_string();
        assert_eq!(
            validation(service.create_topic(request).unwrap_err()),
            ValidationError::BlankField("title")
        );
        assert!(service.topics().unwrap().is_empty());
    }

    #[test]
    fn update_topic_moves_course_only_when_valid() {
        let store = seeded();
        let service = service(&store);
        let topic = service.create_topic(new_topic()).unwrap();
        let other = service
            .register_course("Async Rust", Category::Backend)
            .unwrap();

        let err = service
            .update_topic(
                topic.id,
                TopicUpdate {
                    course_id: Some(CourseId::new(77)),
                    ..TopicUpdate::default()
                },
            )
            .unwrap_err();
        assert_eq!(validation(err), ValidationError::CourseNotFound);

        let moved = service
            .update_topic(
                topic.id,
                TopicUpdate {
                    title: Some("Why does X fail on Linux".to_string()),
                    message: None,
                    course_id: Some(other.id),
                },
            )
            .unwrap();
        assert_eq!(moved.course_id, other.id);
        assert_eq!(moved.title, "Why does X fail on Linux");
        assert_eq!(moved.message, topic.message);
    }

    #[test]
    fn deleted_topic_is_kept_but_frozen() {
        let store = seeded();
        let service = service(&store);
        let topic = service.create_topic(new_topic()).unwrap();

        pause();
        let deleted = service.delete_topic(topic.id).unwrap();
        assert_eq!(deleted.title, topic.title);
        assert_eq!(deleted.message, topic.message);
        assert!(deleted.updated_at > topic.updated_at);

        let err = service
            .update_topic(
                topic.id,
                TopicUpdate {
                    title: Some("Revived".to_string()),
                    ..TopicUpdate::default()
                },
            )
            .unwrap_err();
        assert_eq!(validation(err), ValidationError::TopicDeleted);

        let err = service.close_topic(topic.id).unwrap_err();
        assert!(matches!(
            err,
            ForumError::Transition(TransitionError::NotAllowed {
                from: TopicState::Deleted,
                to: TopicState::Closed,
            })
        ));
    }

    #[test]
    fn deleted_topic_freezes_its_answers() {
        let store = seeded();
        let service = service(&store);
        let topic = service.create_topic(new_topic()).unwrap();
        let answer = service
            .create_answer(new_answer(topic.id, 2, "Try Y"))
            .unwrap();
        service
            .update_answer(answer.id, mark_solution(Some(true)))
            .unwrap();
        service.delete_topic(topic.id).unwrap();

        let err = service
            .update_answer(
                answer.id,
                AnswerUpdate {
                    message: Some("rewritten".to_string()),
                    is_solution: Some(false),
                },
            )
            .unwrap_err();
        assert_eq!(validation(err), ValidationError::TopicDeleted);

        let err = service.delete_answer(answer.id).unwrap_err();
        assert_eq!(validation(err), ValidationError::TopicDeleted);

        let stored = service.answer(answer.id).unwrap();
        assert_eq!(stored.message, "Try Y");
        assert!(stored.is_solution);
        assert!(!stored.is_deleted);
    }

    #[test]
    fn reopen_follows_policy() {
        let store = seeded();
        let strict = service(&store);
        let topic = strict.create_topic(new_topic()).unwrap();
        strict.close_topic(topic.id).unwrap();

        assert!(matches!(
            strict.reopen_topic(topic.id),
            Err(ForumError::Transition(_))
        ));

        let lenient = ForumService::new(
            Repositories::single(&store),
            TopicPolicy {
                allow_reopen: true,
                ..TopicPolicy::default()
            },
        );
        let reopened = lenient.reopen_topic(topic.id).unwrap();
        assert_eq!(reopened.state, TopicState::Open);
    }

    #[test]
    fn deleted_answers_reject_edits() {
        let store = seeded();
        let service = service(&store);
        let topic = service.create_topic(new_topic()).unwrap();
        let answer = service
            .create_answer(new_answer(topic.id, 1, "Try Y"))
            .unwrap();

        let deleted = service.delete_answer(answer.id).unwrap();
        assert!(deleted.is_deleted);
        assert_eq!(deleted.message, "Try Y");

        let err = service
            .update_answer(answer.id, AnswerUpdate::default())
            .unwrap_err();
        assert_eq!(validation(err), ValidationError::AnswerDeleted);

        let err = service.delete_answer(answer.id).unwrap_err();
        assert_eq!(validation(err), ValidationError::AnswerDeleted);
    }

    #[test]
    fn answers_listed_per_topic() {
        let store = seeded();
        let service = service(&store);
        let first = service.create_topic(new_topic()).unwrap();
        let second = service.create_topic(new_topic()).unwrap();

        service
            .create_answer(new_answer(first.id, 1, "One"))
            .unwrap();
        service
            .create_answer(new_answer(second.id, 1, "Two"))
            .unwrap();
        service
            .create_answer(new_answer(first.id, 2, "Three"))
            .unwrap();

        let messages: Vec<_> = service
            .answers_for(first.id)
            .unwrap()
            .into_iter()
            .map(|a| a.message)
            .collect();
        assert_eq!(messages, vec!["One", "Three"]);

        let err = service.answers_for(TopicId::new(50)).unwrap_err();
        assert_eq!(validation(err), ValidationError::TopicNotFound);
    }
}
