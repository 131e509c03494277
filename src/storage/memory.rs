//! In-memory repositories
//!
//! Backs all four repository traits with ordered maps. Used by tests and by
//! callers embedding the forum core without a project directory.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::domain::repository::RepoResult;
use crate::domain::RepositoryError;
use crate::domain::{
    Answer, AnswerId, AnswerRepository, Course, CourseId, CourseRepository, Topic, TopicId,
    TopicRepository, User, UserId, UserRepository,
};

/// Single-threaded store holding every entity kind
#[derive(Debug, Default)]
pub struct MemoryStore {
    topics: RefCell<BTreeMap<TopicId, Topic>>,
    answers: RefCell<BTreeMap<AnswerId, Answer>>,
    users: RefCell<BTreeMap<UserId, User>>,
    courses: RefCell<BTreeMap<CourseId, Course>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Smallest id above every key in the map, starting at 1
fn next_key<K: Copy + Ord, V>(
    map: &BTreeMap<K, V>,
    first: K,
    next: impl Fn(K) -> Option<K>,
) -> RepoResult<K> {
    match map.keys().next_back() {
        None => Ok(first),
        Some(last) => next(*last)
            .ok_or_else(|| RepositoryError::Storage("id space exhausted".to_string())),
    }
}

impl TopicRepository for MemoryStore {
    fn find_by_id(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        Ok(self.topics.borrow().get(&id).cloned())
    }

    fn save(&self, topic: &Topic) -> RepoResult<()> {
        self.topics.borrow_mut().insert(topic.id, topic.clone());
        Ok(())
    }

    fn next_id(&self) -> RepoResult<TopicId> {
        next_key(&self.topics.borrow(), TopicId::new(1), TopicId::next)
    }

    fn find_all(&self) -> RepoResult<Vec<Topic>> {
        Ok(self.topics.borrow().values().cloned().collect())
    }
}

impl AnswerRepository for MemoryStore {
    fn find_by_id(&self, id: AnswerId) -> RepoResult<Option<Answer>> {
        Ok(self.answers.borrow().get(&id).cloned())
    }

    fn save(&self, answer: &Answer) -> RepoResult<()> {
        self.answers.borrow_mut().insert(answer.id, answer.clone());
        Ok(())
    }

    fn next_id(&self) -> RepoResult<AnswerId> {
        next_key(&self.answers.borrow(), AnswerId::new(1), AnswerId::next)
    }

    fn find_by_topic(&self, topic_id: TopicId) -> RepoResult<Vec<Answer>> {
        Ok(self
            .answers
            .borrow()
            .values()
            .filter(|answer| answer.topic_id == topic_id)
            .cloned()
            .collect())
    }
}

impl UserRepository for MemoryStore {
    fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.users.borrow().get(&id).cloned())
    }

    fn save(&self, user: &User) -> RepoResult<()> {
        self.users.borrow_mut().insert(user.id, user.clone());
        Ok(())
    }

    fn next_id(&self) -> RepoResult<UserId> {
        next_key(&self.users.borrow(), UserId::new(1), UserId::next)
    }

    fn find_all(&self) -> RepoResult<Vec<User>> {
        Ok(self.users.borrow().values().cloned().collect())
    }
}

impl CourseRepository for MemoryStore {
    fn find_by_id(&self, id: CourseId) -> RepoResult<Option<Course>> {
        Ok(self.courses.borrow().get(&id).cloned())
    }

    fn save(&self, course: &Course) -> RepoResult<()> {
        self.courses.borrow_mut().insert(course.id, course.clone());
        Ok(())
    }

    fn next_id(&self) -> RepoResult<CourseId> {
        next_key(&self.courses.borrow(), CourseId::new(1), CourseId::next)
    }

    fn find_all(&self) -> RepoResult<Vec<Course>> {
        Ok(self.courses.borrow().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_follow_the_largest() {
        let store = MemoryStore::new();
        assert_eq!(UserRepository::next_id(&store).unwrap(), UserId::new(1));

        UserRepository::save(&store, &User::new(UserId::new(5), "ada").unwrap()).unwrap();
        assert_eq!(UserRepository::next_id(&store).unwrap(), UserId::new(6));
    }

    #[test]
    fn exhausted_id_space_is_an_error() {
        let store = MemoryStore::new();
        UserRepository::save(&store, &User::new(UserId::new(u64::MAX), "ada").unwrap()).unwrap();

        let err = UserRepository::next_id(&store).unwrap_err();
        assert!(err.to_string().contains("id space exhausted"));
    }

    #[test]
    fn save_replaces_existing_record() {
        let store = MemoryStore::new();
        let mut user = User::new(UserId::new(1), "ada").unwrap();
        UserRepository::save(&store, &user).unwrap();

        user.set_enabled(false);
        UserRepository::save(&store, &user).unwrap();

        let users = UserRepository::find_all(&store).unwrap();
        assert_eq!(users.len(), 1);
        assert!(!users[0].is_enabled());
        assert!(UserRepository::exists_by_id(&store, UserId::new(1)).unwrap());
        assert!(!UserRepository::exists_by_id(&store, UserId::new(2)).unwrap());
    }
}
