//! Domain models for the forum
//!
//! Contains the topic and answer lifecycles without any I/O concerns.
//! Persistence is reached only through the traits in [`repository`].

mod id;
mod error;
mod topic;
mod answer;
mod user;
pub mod repository;

pub use id::{AnswerId, CourseId, IdError, TopicId, UserId};
pub use error::{TransitionError, ValidationError};
pub use topic::{NewTopic, Topic, TopicEdit, TopicPolicy, TopicState, TopicUpdate};
pub use answer::{Answer, AnswerEdit, AnswerUpdate, NewAnswer};
pub use user::{Category, Course, User};
pub use repository::{
    AnswerRepository, CourseRepository, RepositoryError, TopicRepository, UserRepository,
};
