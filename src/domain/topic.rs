//! Topic domain model
//!
//! A topic is a discussion thread tied to a course and a year. Its state
//! moves `open -> closed -> deleted`, with `deleted` reachable from either
//! live state and never left again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{require_text, TransitionError, ValidationError};
use super::id::{CourseId, TopicId, UserId};

/// Lifecycle state of a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TopicState {
    /// Accepting answers and solutions
    #[default]
    Open,

    /// No new solutions; plain answers depend on [`TopicPolicy`]
    Closed,

    /// Soft-deleted; absorbing
    Deleted,
}

impl TopicState {
    /// Returns true if the topic accepts answers and solutions
    pub fn is_open(&self) -> bool {
        matches!(self, TopicState::Open)
    }

    /// Returns true once the topic has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        matches!(self, TopicState::Deleted)
    }

    /// Returns all valid state values
    pub fn all() -> &'static [TopicState] {
        &[TopicState::Open, TopicState::Closed, TopicState::Deleted]
    }

    /// Returns true if `self -> next` is in the transition table
    ///
    /// | from   | to      | allowed                      |
    /// |--------|---------|------------------------------|
    /// | open   | closed  | yes                          |
    /// | open   | deleted | yes                          |
    /// | closed | deleted | yes                          |
    /// | closed | open    | only with `allow_reopen`     |
    ///
    /// Everything else, self-transitions included, is rejected.
    pub fn can_transition_to(&self, next: TopicState, policy: &TopicPolicy) -> bool {
        use TopicState::*;

        match (*self, next) {
            (Open, Closed) | (Open, Deleted) | (Closed, Deleted) => true,
            (Closed, Open) => policy.allow_reopen,
            _ => false,
        }
    }
}

impl std::fmt::Display for TopicState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopicState::Open => write!(f, "open"),
            TopicState::Closed => write!(f, "closed"),
            TopicState::Deleted => write!(f, "deleted"),
        }
    }
}

impl std::str::FromStr for TopicState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(TopicState::Open),
            "closed" => Ok(TopicState::Closed),
            "deleted" => Ok(TopicState::Deleted),
            _ => Err(format!("Unknown topic state: {}", s)),
        }
    }
}

/// Policy knobs for the topic lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPolicy {
    /// Permit `closed -> open`
    pub allow_reopen: bool,

    /// Accept plain (non-solution) answers on closed topics
    pub accept_answers_on_closed: bool,
}

impl Default for TopicPolicy {
    fn default() -> Self {
        Self {
            allow_reopen: false,
            accept_answers_on_closed: true,
        }
    }
}

impl TopicPolicy {
    /// Closed topics reject every new answer
    pub fn strict() -> Self {
        Self {
            allow_reopen: false,
            accept_answers_on_closed: false,
        }
    }
}

/// Request to open a new topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTopic {
    pub title: String,
    pub message: String,
    pub year: i32,
    pub user_id: UserId,
    pub course_id: CourseId,
}

/// Partial update of a topic's content; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<CourseId>,
}

impl TopicUpdate {
    /// Returns true if no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.message.is_none() && self.course_id.is_none()
    }
}

/// A content update addressed to a stored topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicEdit {
    pub topic_id: TopicId,
    pub update: TopicUpdate,
}

/// A discussion topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Unique identifier
    pub id: TopicId,

    pub title: String,

    pub message: String,

    /// Course year the topic belongs to
    pub year: i32,

    /// Current lifecycle state
    pub state: TopicState,

    /// Author
    pub user_id: UserId,

    pub course_id: CourseId,

    /// When the topic was created
    pub created_at: DateTime<Utc>,

    /// When the topic was last updated
    pub updated_at: DateTime<Utc>,
}

impl Topic {
    /// Creates an open topic from a request
    pub fn create(id: TopicId, request: NewTopic) -> Result<Self, ValidationError> {
        require_text("title", &request.title)?;
        require_text("message", &request.message)?;
        if request.year <= 0 {
            return Err(ValidationError::InvalidYear(request.year));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            title: request.title,
            message: request.message,
            year: request.year,
            state: TopicState::Open,
            user_id: request.user_id,
            course_id: request.course_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies the provided content fields and, if given, a new course
    ///
    /// The last-update timestamp moves even when nothing else changes.
    pub fn update_content_and_course(
        &mut self,
        update: &TopicUpdate,
        course_id: Option<CourseId>,
    ) -> Result<(), ValidationError> {
        self.ensure_not_deleted()?;
        if let Some(title) = &update.title {
            require_text("title", title)?;
        }
        if let Some(message) = &update.message {
            require_text("message", message)?;
        }

        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(message) = &update.message {
            self.message = message.clone();
        }
        if let Some(course_id) = course_id {
            self.course_id = course_id;
        }
        self.touch();
        Ok(())
    }

    /// Applies the provided title and message, keeping the course
    ///
    /// `update.course_id` is ignored here.
    pub fn update_content(&mut self, update: &TopicUpdate) -> Result<(), ValidationError> {
        self.update_content_and_course(update, None)
    }

    /// Moves the topic to `next` if the transition table allows it
    pub fn transition(
        &mut self,
        next: TopicState,
        policy: &TopicPolicy,
    ) -> Result<(), TransitionError> {
        if !self.state.can_transition_to(next, policy) {
            return Err(TransitionError::NotAllowed {
                from: self.state,
                to: next,
            });
        }

        self.state = next;
        self.touch();
        Ok(())
    }

    /// Optional-state variant of [`Topic::transition`]; `None` is a no-op
    pub fn set_state(
        &mut self,
        next: Option<TopicState>,
        policy: &TopicPolicy,
    ) -> Result<(), TransitionError> {
        match next {
            Some(state) => self.transition(state, policy),
            None => Ok(()),
        }
    }

    /// Soft-deletes the topic
    pub fn soft_delete(&mut self) -> Result<(), TransitionError> {
        self.transition(TopicState::Deleted, &TopicPolicy::default())
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn is_deleted(&self) -> bool {
        self.state.is_deleted()
    }

    fn ensure_not_deleted(&self) -> Result<(), ValidationError> {
        if self.is_deleted() {
            Err(ValidationError::TopicDeleted)
        } else {
            Ok(())
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request() -> NewTopic {
        NewTopic {
            title: "Why does X fail".to_string(),
            message: "It panics on startup".to_string(),
            year: 2024,
            user_id: UserId::new(1),
            course_id: CourseId::new(1),
        }
    }

    fn make_topic() -> Topic {
        Topic::create(TopicId::new(1), request()).unwrap()
    }

    fn pause() {
        std::thread::sleep(std::time::Duration::from_millis(10));
    }

    #[test]
    fn new_topic_is_open_with_equal_timestamps() {
        let topic = make_topic();
        assert_eq!(topic.state, TopicState::Open);
        assert_eq!(topic.created_at, topic.updated_at);
        assert_eq!(topic.year, 2024);
    }

    #[test]
    fn create_rejects_blank_title_and_message() {
        let mut req = request();
        req.title = "  ".to_string();
        assert_eq!(
            Topic::create(TopicId::new(1), req).unwrap_err(),
            ValidationError::BlankField("title")
        );

        let mut req = request();
        req.message = String::new();
        assert_eq!(
            Topic::create(TopicId::new(1), req).unwrap_err(),
            ValidationError::BlankField("message")
        );
    }

    #[test]
    fn create_rejects_non_positive_year() {
        let mut req = request();
        req.year = 0;
        assert_eq!(
            Topic::create(TopicId::new(1), req).unwrap_err(),
            ValidationError::InvalidYear(0)
        );
    }

    #[test]
    fn update_applies_each_field_to_its_own_attribute() {
        let mut topic = make_topic();
        let update = TopicUpdate {
            title: None,
            message: Some("Fixed by upgrading".to_string()),
            course_id: None,
        };

        topic.update_content(&update).unwrap();

        assert_eq!(topic.title, "Why does X fail");
        assert_eq!(topic.message, "Fixed by upgrading");
        assert_eq!(topic.state, TopicState::Open);
    }

    #[test]
    fn update_with_course_moves_topic() {
        let mut topic = make_topic();
        topic
            .update_content_and_course(&TopicUpdate::default(), Some(CourseId::new(9)))
            .unwrap();
        assert_eq!(topic.course_id, CourseId::new(9));
    }

    #[test]
    fn empty_update_only_touches_timestamp() {
        let mut topic = make_topic();
        let before = topic.clone();

        pause();
        topic.update_content(&TopicUpdate::default()).unwrap();

        assert_eq!(topic.title, before.title);
        assert_eq!(topic.message, before.message);
        assert_eq!(topic.course_id, before.course_id);
        assert!(topic.updated_at > before.updated_at);
    }

    #[test]
    fn update_rejects_blank_replacement_without_partial_apply() {
        let mut topic = make_topic();
        let update = TopicUpdate {
            title: Some("New title".to_string()),
            message: Some(" ".to_string()),
            course_id: None,
        };

        assert_eq!(
            topic.update_content(&update),
            Err(ValidationError::BlankField("message"))
        );
        assert_eq!(topic.title, "Why does X fail");
    }

    #[test]
    fn deleted_topic_rejects_updates() {
        let mut topic = make_topic();
        topic.soft_delete().unwrap();

        let update = TopicUpdate {
            title: Some("Sneaky edit".to_string()),
            ..TopicUpdate::default()
        };
        assert_eq!(topic.update_content(&update), Err(ValidationError::TopicDeleted));
    }

    #[test]
    fn soft_delete_is_non_destructive() {
        let mut topic = make_topic();
        let before = topic.clone();

        pause();
        topic.soft_delete().unwrap();

        assert_eq!(topic.id, before.id);
        assert_eq!(topic.title, before.title);
        assert_eq!(topic.message, before.message);
        assert_eq!(topic.state, TopicState::Deleted);
        assert!(topic.updated_at > before.updated_at);
    }

    #[test]
    fn deleted_is_absorbing() {
        let mut topic = make_topic();
        topic.soft_delete().unwrap();

        let lenient = TopicPolicy {
            allow_reopen: true,
            accept_answers_on_closed: true,
        };
        for state in TopicState::all() {
            assert!(topic.transition(*state, &lenient).is_err());
        }
        assert!(topic.soft_delete().is_err());
    }

    #[test]
    fn reopen_requires_policy() {
        let mut topic = make_topic();
        let policy = TopicPolicy::default();
        topic.transition(TopicState::Closed, &policy).unwrap();

        assert_eq!(
            topic.transition(TopicState::Open, &policy),
            Err(TransitionError::NotAllowed {
                from: TopicState::Closed,
                to: TopicState::Open,
            })
        );

        let reopen = TopicPolicy {
            allow_reopen: true,
            ..policy
        };
        topic.transition(TopicState::Open, &reopen).unwrap();
        assert!(topic.is_open());
    }

    #[test]
    fn set_state_none_is_noop() {
        let mut topic = make_topic();
        let before = topic.clone();

        pause();
        topic.set_state(None, &TopicPolicy::default()).unwrap();

        assert_eq!(topic, before);
    }

    #[test]
    fn state_from_string() {
        assert_eq!("open".parse::<TopicState>().unwrap(), TopicState::Open);
        assert_eq!("CLOSED".parse::<TopicState>().unwrap(), TopicState::Closed);
        assert_eq!("Deleted".parse::<TopicState>().unwrap(), TopicState::Deleted);
        assert!("archived".parse::<TopicState>().is_err());
    }

    #[test]
    fn unknown_state_is_rejected_on_load() {
        let mut json = serde_json::to_value(make_topic()).unwrap();
        json["state"] = serde_json::json!("archived");
        assert!(serde_json::from_value::<Topic>(json).is_err());
    }

    fn any_state() -> impl Strategy<Value = TopicState> {
        prop_oneof![
            Just(TopicState::Open),
            Just(TopicState::Closed),
            Just(TopicState::Deleted),
        ]
    }

    proptest! {
        #[test]
        fn transitions_never_leave_deleted(
            steps in proptest::collection::vec(any_state(), 0..12),
            allow_reopen in any::<bool>(),
        ) {
            let policy = TopicPolicy { allow_reopen, accept_answers_on_closed: true };
            let mut topic = make_topic();
            let mut seen_deleted = false;

            for next in steps {
                let before = topic.state;
                let result = topic.transition(next, &policy);

                prop_assert_eq!(result.is_ok(), before.can_transition_to(next, &policy));
                if result.is_err() {
                    prop_assert_eq!(topic.state, before);
                }
                if seen_deleted {
                    prop_assert_eq!(topic.state, TopicState::Deleted);
                }
                seen_deleted |= topic.is_deleted();
            }
        }

        #[test]
        fn partial_update_touches_only_provided_fields(
            title in proptest::option::of("[a-z]{1,12}"),
            message in proptest::option::of("[a-z]{1,12}"),
        ) {
            let mut topic = make_topic();
            let before = topic.clone();
            let update = TopicUpdate { title: title.clone(), message: message.clone(), course_id: None };

            topic.update_content(&update).unwrap();

            prop_assert_eq!(&topic.title, title.as_ref().unwrap_or(&before.title));
            prop_assert_eq!(&topic.message, message.as_ref().unwrap_or(&before.message));
            prop_assert_eq!(topic.course_id, before.course_id);
            prop_assert_eq!(topic.state, before.state);
            prop_assert!(topic.updated_at >= before.updated_at);
        }
    }
}
